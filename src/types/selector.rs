//! Item selectors: the result of resolving a name.

use super::item::{CanonicalItem, ItemSnapshot};
use super::material::EnchantmentType;
use super::meta::ItemMeta;
use crate::error::Result;
use crate::matching::MatchEngine;
use crate::platform::Platform;
use crate::types::MatchQuality;
use serde::{Deserialize, Serialize};

/// A set of item variants with an amount and an "all" flag.
///
/// `amount` is -1 when no amount was written. The item-form and block-form
/// sub-selectors are computed on demand and cached until the next
/// modification.
#[derive(Debug, Clone)]
pub struct ItemSelector {
    types: Vec<CanonicalItem>,
    amount: i32,
    all: bool,
    global_meta: Option<ItemMeta>,
    item: Option<Box<ItemSelector>>,
    block: Option<Box<ItemSelector>>,
}

impl Default for ItemSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ItemSelector {
    fn eq(&self, other: &Self) -> bool {
        self.types == other.types && self.amount == other.amount && self.all == other.all
    }
}

impl ItemSelector {
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            amount: -1,
            all: false,
            global_meta: None,
            item: None,
            block: None,
        }
    }

    pub fn from_item(item: CanonicalItem) -> Self {
        let mut selector = Self::new();
        selector.add(item);
        selector
    }

    /// The selector for `*`: every item.
    pub fn everything() -> Self {
        let mut selector = Self::from_item(CanonicalItem::anything());
        selector.all = true;
        selector
    }

    pub fn types(&self) -> &[CanonicalItem] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Amount, with 1 when unspecified.
    pub fn amount(&self) -> u32 {
        if self.amount < 0 {
            1
        } else {
            self.amount as u32
        }
    }

    /// Raw amount, -1 when unspecified.
    pub fn internal_amount(&self) -> i32 {
        self.amount
    }

    pub fn set_amount(&mut self, amount: i32) {
        self.amount = amount;
        if let Some(item) = &mut self.item {
            item.amount = amount;
        }
        if let Some(block) = &mut self.block {
            block.amount = amount;
        }
    }

    pub fn is_all(&self) -> bool {
        self.all
    }

    pub fn set_all(&mut self, all: bool) {
        self.all = all;
    }

    pub fn add(&mut self, item: CanonicalItem) {
        self.types.push(item);
        self.modified();
    }

    pub fn add_all(&mut self, items: impl IntoIterator<Item = CanonicalItem>) {
        self.types.extend(items);
        self.modified();
    }

    pub fn remove(&mut self, index: usize) -> CanonicalItem {
        let item = self.types.remove(index);
        self.modified();
        item
    }

    pub fn retain(&mut self, keep: impl FnMut(&CanonicalItem) -> bool) {
        self.types.retain(keep);
        self.modified();
    }

    /// Drop cached sub-selectors.
    fn modified(&mut self) {
        self.item = None;
        self.block = None;
    }

    /// Only the variants that exist as items.
    pub fn item_form(&mut self) -> &ItemSelector {
        let item = match self.item.take() {
            Some(item) => item,
            None => {
                let mut item = self.filtered(|_| true);
                for t in &mut item.types {
                    t.set_item_form(true);
                }
                Box::new(item)
            }
        };
        &**self.item.insert(item)
    }

    /// Only the variants that can be placed as blocks.
    pub fn block_form(&mut self) -> &ItemSelector {
        let block = match self.block.take() {
            Some(block) => block,
            None => Box::new(self.filtered(CanonicalItem::is_block)),
        };
        &**self.block.insert(block)
    }

    fn filtered(&self, keep: impl Fn(&CanonicalItem) -> bool) -> ItemSelector {
        let mut selector = Self::new();
        selector.types = self.types.iter().filter(|t| keep(t)).cloned().collect();
        selector.amount = self.amount;
        selector.all = self.all;
        selector.global_meta = self.global_meta.clone();
        selector
    }

    /// Metadata shared by all variants, if any was set.
    pub fn item_meta(&self) -> ItemMeta {
        self.global_meta
            .clone()
            .or_else(|| self.types.first().map(|t| t.meta().clone()))
            .unwrap_or_default()
    }

    /// Apply metadata to every variant.
    pub fn set_item_meta(&mut self, meta: ItemMeta) {
        for t in &mut self.types {
            t.apply_meta(&meta);
        }
        self.global_meta = Some(meta);
        self.modified();
    }

    pub fn set_durability(&mut self, durability: u16) {
        for t in &mut self.types {
            t.set_durability(durability);
        }
        self.modified();
    }

    pub fn add_enchantments(&mut self, enchantments: &[EnchantmentType]) {
        let mut meta = self.item_meta();
        for ench in enchantments {
            meta.enchantments.insert(ench.enchantment.clone(), ench.level());
        }
        self.set_item_meta(meta);
    }

    /// Whether every variant has all the given enchantments at exactly the
    /// given level, or any level when none was written.
    pub fn has_enchantments(&self, enchantments: &[EnchantmentType]) -> bool {
        !self.types.is_empty()
            && self.types.iter().all(|t| {
                enchantments.iter().all(|e| match t.meta().enchantments.get(&e.enchantment) {
                    Some(level) => e.level.map_or(true, |wanted| wanted == *level),
                    None => false,
                })
            })
    }

    pub fn remove_enchantments(&mut self, enchantments: &[EnchantmentType]) {
        for t in &mut self.types {
            let mut meta = t.meta().clone();
            for ench in enchantments {
                meta.enchantments.remove(&ench.enchantment);
            }
            t.set_meta(meta);
        }
        if let Some(global) = &mut self.global_meta {
            for ench in enchantments {
                global.enchantments.remove(&ench.enchantment);
            }
        }
        self.modified();
    }

    pub fn clear_enchantments(&mut self) {
        for t in &mut self.types {
            let mut meta = t.meta().clone();
            meta.enchantments.clear();
            t.set_meta(meta);
        }
        if let Some(global) = &mut self.global_meta {
            global.enchantments.clear();
        }
        self.modified();
    }

    /// Whether `item` is one of this selector's variants.
    pub fn is_of_type(&self, item: &CanonicalItem, engine: &MatchEngine<'_>) -> bool {
        self.types.iter().any(|t| engine.same_item(t, item))
    }

    /// Whether every variant of `other` is covered by a variant of this one.
    pub fn is_supertype_of(&self, other: &ItemSelector, engine: &MatchEngine<'_>) -> bool {
        if self.types.iter().any(CanonicalItem::is_anything) {
            return true;
        }
        other.types.iter().all(|o| {
            self.types
                .iter()
                .any(|t| engine.compare(o, t).is_at_least(MatchQuality::SameItem))
        })
    }

    /// Variants shared by both selectors, keeping the more specific of each
    /// matching pair.
    pub fn intersection(&self, other: &ItemSelector, engine: &MatchEngine<'_>) -> ItemSelector {
        let mut result = ItemSelector::new();
        for a in &self.types {
            for b in &other.types {
                if engine.compare(a, b).is_at_least(MatchQuality::SameItem) {
                    result.types.push(a.clone());
                } else if engine.compare(b, a).is_at_least(MatchQuality::SameItem) {
                    result.types.push(b.clone());
                }
            }
        }
        result
    }

    /// Copy with display names and durability removed from every variant.
    pub fn base_type(&self) -> ItemSelector {
        let mut base = ItemSelector::new();
        base.types = self.types.iter().map(CanonicalItem::alias_copy).collect();
        base
    }

    pub fn snapshot(&self, platform: &dyn Platform) -> SelectorSnapshot {
        SelectorSnapshot {
            items: self.types.iter().map(|t| t.snapshot(platform)).collect(),
            amount: self.amount,
            all: self.all,
        }
    }
}

/// Serializable form of an [`ItemSelector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorSnapshot {
    pub items: Vec<ItemSnapshot>,
    #[serde(default = "unspecified_amount")]
    pub amount: i32,
    #[serde(default)]
    pub all: bool,
}

fn unspecified_amount() -> i32 {
    -1
}

impl SelectorSnapshot {
    pub fn restore(&self, platform: &dyn Platform) -> Result<ItemSelector> {
        let mut selector = ItemSelector::new();
        for item in &self.items {
            selector.types.push(item.restore(platform)?);
        }
        selector.amount = self.amount;
        selector.all = self.all;
        Ok(selector)
    }
}
