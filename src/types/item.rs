//! The canonical item representation.

use super::material::{EnchantmentType, Material, MaterialInfo};
use super::meta::{ItemMeta, Tags};
use super::{BlockSnapshot, ItemStack};
use crate::error::{AliasError, Result};
use crate::platform::Platform;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

bitflags! {
    /// Which parts of an item were explicitly specified.
    ///
    /// An item with a flag set is a "specific" item: a subject missing that
    /// part cannot be considered the same item.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ItemFlags: u8 {
        const CHANGED_DURABILITY = 0b01;
        const CHANGED_TAGS = 0b10;
    }
}

/// Block state values of a block-capable item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockValues {
    pub states: BTreeMap<String, String>,
    /// Whether these are the material's default states rather than explicit
    /// ones.
    pub is_default: bool,
}

impl BlockValues {
    pub fn default_state() -> Self {
        Self {
            states: BTreeMap::new(),
            is_default: true,
        }
    }

    pub fn explicit(states: BTreeMap<String, String>) -> Self {
        Self {
            states,
            is_default: false,
        }
    }
}

/// One concrete item variant: a material plus durability, metadata and block
/// state.
///
/// Items created from alias definitions are shared by identity between the
/// match index and the alias selectors, see
/// [`AliasRegistry`](crate::registry::AliasRegistry).
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalItem {
    pub(crate) material: Material,
    pub(crate) block_values: Option<BlockValues>,
    pub(crate) item_form: bool,
    pub(crate) is_anything: bool,
    pub(crate) is_alias: bool,
    pub(crate) plain: bool,
    pub(crate) flags: ItemFlags,
    pub(crate) durability: u16,
    pub(crate) meta: ItemMeta,
}

impl CanonicalItem {
    /// A plain item of the given material with nothing specified.
    pub fn new(material: Material, info: &MaterialInfo) -> Self {
        Self {
            material,
            block_values: info.block.then(BlockValues::default_state),
            item_form: false,
            is_anything: false,
            is_alias: false,
            plain: false,
            flags: ItemFlags::empty(),
            durability: 0,
            meta: ItemMeta::default(),
        }
    }

    /// Build an item from alias data.
    ///
    /// A numeric `Damage` tag becomes the durability, clamped into range. Any
    /// other tags become item metadata. Block states only count as explicit
    /// when some are given, and are ignored for materials that are not blocks.
    pub fn from_alias(
        material: Material,
        info: &MaterialInfo,
        mut tags: Tags,
        states: BTreeMap<String, String>,
    ) -> Self {
        let mut item = Self::new(material, info);

        if let Some(damage) = tags.get("Damage").and_then(Value::as_f64) {
            item.durability = damage.clamp(0.0, f64::from(u16::MAX)) as u16;
            item.flags |= ItemFlags::CHANGED_DURABILITY;
            tags.remove("Damage");
        }
        if !tags.is_empty() {
            item.meta = ItemMeta::from_tags(&tags);
            item.flags |= ItemFlags::CHANGED_TAGS;
        }

        if info.block && !states.is_empty() {
            item.block_values = Some(BlockValues::explicit(states));
        }

        item.is_alias = true;
        item
    }

    /// Build an item from a held item stack.
    pub fn from_stack(stack: &ItemStack, info: &MaterialInfo) -> Self {
        let mut item = Self::new(stack.material, info);
        item.item_form = true;
        item.durability = stack.damage;
        item.meta = ItemMeta::from_tags(&stack.tags);
        // Real items always have their tags and durability decided.
        item.flags |= ItemFlags::CHANGED_TAGS;
        if info.max_durability != 0 {
            item.flags |= ItemFlags::CHANGED_DURABILITY;
        }
        item
    }

    /// Build an item from a placed block.
    pub fn from_block(block: &BlockSnapshot, info: &MaterialInfo) -> Self {
        let mut item = Self::new(block.material, info);
        item.block_values = Some(BlockValues::explicit(block.states.clone()));
        item
    }

    /// The wildcard item, which matches everything.
    pub fn anything() -> Self {
        Self {
            material: Material(u32::MAX),
            block_values: None,
            item_form: false,
            is_anything: true,
            is_alias: false,
            plain: false,
            flags: ItemFlags::empty(),
            durability: 0,
            meta: ItemMeta::default(),
        }
    }

    pub fn material(&self) -> Material {
        self.material
    }

    pub fn block_values(&self) -> Option<&BlockValues> {
        self.block_values.as_ref()
    }

    pub fn flags(&self) -> ItemFlags {
        self.flags
    }

    pub fn durability(&self) -> u16 {
        self.durability
    }

    pub fn meta(&self) -> &ItemMeta {
        &self.meta
    }

    pub fn is_anything(&self) -> bool {
        self.is_anything
    }

    pub fn is_item_form(&self) -> bool {
        self.item_form
    }

    pub fn is_block(&self) -> bool {
        self.block_values.is_some()
    }

    pub fn is_plain(&self) -> bool {
        self.plain
    }

    /// Whether this item can represent an alias: either it was created from
    /// one or it carries nothing beyond its material.
    pub fn is_alias(&self) -> bool {
        self.is_alias || self.is_default()
    }

    /// Whether this is the bare default variant of its material.
    ///
    /// Block values that are the material's defaults count as no block state.
    pub fn is_default(&self) -> bool {
        self.flags.is_empty() && self.block_values.as_ref().map_or(true, |b| b.is_default)
    }

    /// Mark this item as "plain": it only matches items without any data.
    pub fn set_plain(&mut self, plain: bool) {
        self.plain = plain;
    }

    /// Plain matching: same material, and at least one side plain with the
    /// other plain or an alias.
    pub fn match_plain(&self, other: &CanonicalItem) -> bool {
        self.material == other.material
            && ((self.plain && (other.plain || other.is_alias()))
                || (self.is_alias() && other.plain))
    }

    pub fn set_item_form(&mut self, item_form: bool) {
        self.item_form = item_form;
    }

    /// Replace the metadata. The item stops being an alias item.
    pub fn set_meta(&mut self, meta: ItemMeta) {
        self.meta = meta;
        self.is_alias = false;
        self.flags |= ItemFlags::CHANGED_TAGS;
    }

    /// Merge metadata into the current one.
    pub fn apply_meta(&mut self, meta: &ItemMeta) {
        let mut merged = self.meta.clone();
        merged.apply(meta);
        self.set_meta(merged);
    }

    pub fn set_durability(&mut self, durability: u16) {
        self.durability = durability;
        self.flags |= ItemFlags::CHANGED_DURABILITY;
    }

    pub fn add_enchantments(&mut self, enchantments: &[EnchantmentType]) {
        let mut meta = self.meta.clone();
        for ench in enchantments {
            meta.enchantments.insert(ench.enchantment.clone(), ench.level());
        }
        self.set_meta(meta);
    }

    /// Copy without display name or durability, as used for base types.
    pub fn alias_copy(&self) -> Self {
        let mut copy = Self {
            material: self.material,
            block_values: self.block_values.clone(),
            item_form: self.item_form,
            is_anything: self.is_anything,
            is_alias: false,
            plain: false,
            flags: ItemFlags::empty(),
            durability: 0,
            meta: ItemMeta::default(),
        };
        let mut meta = self.meta.clone();
        meta.display_name = None;
        if !meta.is_empty() {
            copy.set_meta(meta);
        }
        copy
    }

    /// Tags of this item including durability.
    pub fn tags(&self) -> Tags {
        let mut tags = self.meta.to_tags();
        if self.flags.contains(ItemFlags::CHANGED_DURABILITY) {
            tags.insert("Damage".to_string(), Value::from(self.durability));
        }
        tags
    }

    /// Serializable copy of this item.
    pub fn snapshot(&self, platform: &dyn Platform) -> ItemSnapshot {
        let material = if self.is_anything {
            "*".to_string()
        } else {
            platform
                .material_info(self.material)
                .map(|info| info.id.clone())
                .unwrap_or_default()
        };
        ItemSnapshot {
            material,
            flags: self.flags.bits(),
            damage: self.durability,
            tags: self.meta.to_tags(),
            block_states: self.block_values.as_ref().map(|b| b.states.clone()),
            default_states: self.block_values.as_ref().map_or(false, |b| b.is_default),
            item_form: self.item_form,
            alias: self.is_alias,
            plain: self.plain,
        }
    }
}

/// Serializable form of a [`CanonicalItem`], for storage and transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    /// Namespaced material id, or `*` for the wildcard.
    pub material: String,
    #[serde(default)]
    pub flags: u8,
    #[serde(default)]
    pub damage: u16,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_states: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub default_states: bool,
    #[serde(default)]
    pub item_form: bool,
    #[serde(default)]
    pub alias: bool,
    #[serde(default)]
    pub plain: bool,
}

impl ItemSnapshot {
    /// Rebuild the item against a platform.
    pub fn restore(&self, platform: &dyn Platform) -> Result<CanonicalItem> {
        if self.material == "*" {
            return Ok(CanonicalItem::anything());
        }
        let material = platform
            .material(&self.material)
            .ok_or_else(|| AliasError::UnknownMaterial(self.material.clone()))?;

        Ok(CanonicalItem {
            material,
            block_values: self.block_states.clone().map(|states| BlockValues {
                states,
                is_default: self.default_states,
            }),
            item_form: self.item_form,
            is_anything: false,
            is_alias: self.alias,
            plain: self.plain,
            flags: ItemFlags::from_bits_truncate(self.flags),
            durability: self.damage,
            meta: ItemMeta::from_tags(&self.tags),
        })
    }
}
