//! Shared types used throughout the library.

mod item;
mod material;
mod meta;
mod quality;
mod selector;
mod version;

pub use item::{BlockValues, CanonicalItem, ItemFlags, ItemSnapshot};
pub use material::{namespaced, Enchantment, EnchantmentType, EntityRef, Material, MaterialInfo};
pub use meta::{ItemMeta, MetaKind, Tags};
pub use quality::MatchQuality;
pub use selector::{ItemSelector, SelectorSnapshot};
pub use version::Version;

use std::collections::BTreeMap;

/// A held item, as handed over by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemStack {
    pub material: Material,
    pub amount: u32,
    /// Damage taken, 0 for undamaged or non-damageable items.
    pub damage: u16,
    pub tags: Tags,
}

impl ItemStack {
    pub fn new(material: Material) -> Self {
        Self {
            material,
            amount: 1,
            damage: 0,
            tags: Tags::new(),
        }
    }

    pub fn with_damage(mut self, damage: u16) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.tags.insert(key.into(), value);
        self
    }
}

/// A placed block with its state properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSnapshot {
    pub material: Material,
    /// Block properties, e.g., {"facing": "north"}
    pub states: BTreeMap<String, String>,
}

impl BlockSnapshot {
    pub fn new(material: Material) -> Self {
        Self {
            material,
            states: BTreeMap::new(),
        }
    }

    pub fn with_state(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.states.insert(key.into(), value.into());
        self
    }
}
