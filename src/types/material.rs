//! Material and enchantment identifiers supplied by the host platform.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque material identifier.
///
/// The wrapped value is the material's position in the platform's material
/// table, which gives materials a stable total order for bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Material(pub u32);

impl Material {
    pub fn ordinal(self) -> usize {
        self.0 as usize
    }
}

/// Static information about one material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialInfo {
    /// Namespaced id, e.g. "minecraft:oak_boat".
    pub id: String,
    /// Whether the material can be placed as a block.
    #[serde(default)]
    pub block: bool,
    /// Maximum durability; zero for items without durability.
    #[serde(default)]
    pub max_durability: u16,
}

impl MaterialInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: namespaced(&id.into()),
            block: false,
            max_durability: 0,
        }
    }

    pub fn block(mut self) -> Self {
        self.block = true;
        self
    }

    pub fn with_durability(mut self, max_durability: u16) -> Self {
        self.max_durability = max_durability;
        self
    }

    /// Get the id without namespace (e.g., "oak_boat").
    pub fn key(&self) -> &str {
        self.id.split_once(':').map(|(_, key)| key).unwrap_or(&self.id)
    }
}

/// Enchantment identifier, e.g. "minecraft:sharpness".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Enchantment(pub String);

impl Enchantment {
    pub fn new(id: &str) -> Self {
        Self(namespaced(id))
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Enchantment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An enchantment with an optional level, as written in item names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnchantmentType {
    pub enchantment: Enchantment,
    /// `None` when no level was written.
    pub level: Option<u32>,
}

impl EnchantmentType {
    /// Effective level; an unspecified level means 1.
    pub fn level(&self) -> u32 {
        self.level.unwrap_or(1)
    }
}

/// Reference to an entity type related to an alias (e.g. the mob of a spawn
/// egg). Resolution of the name is up to the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRef(pub String);

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Add the "minecraft" namespace to an id that has none.
pub fn namespaced(id: &str) -> String {
    if id.contains(':') {
        id.to_string()
    } else {
        format!("minecraft:{}", id)
    }
}
