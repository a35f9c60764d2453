//! # Item Aliases
//!
//! A Rust library for resolving natural-language Minecraft item and block
//! names ("oak boat", "every diamond sword", "red wool") to canonical item
//! data, and for finding the best name for an item.
//!
//! ## Overview
//!
//! Alias files define names with a small pattern grammar (`[optional]`,
//! `(a|b)`, `{variation group}`, `¦` plurals and `@` genders). Loading
//! expands every name, builds canonical items and indexes them by material.
//! Lookups go both ways: name to [`ItemSelector`], and item to the alias
//! that describes it best according to a graded [`MatchQuality`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use item_aliases::{load_platform, Aliases};
//! use std::sync::Arc;
//!
//! // Load the host's material and enchantment tables
//! let platform = Arc::new(load_platform("platform.json")?);
//!
//! // Create the service and load alias files
//! let aliases = Aliases::new(platform);
//! let diagnostics = aliases.load_alias_file("aliases/boats.sk")?;
//!
//! // Resolve a name
//! let boats = aliases.resolve_name("3 oak boats").unwrap();
//! assert_eq!(boats.amount(), 3);
//! ```
//!
//! ## Host Integration
//!
//! The library never hard-codes Minecraft content. Implement the
//! [`Platform`] trait over the host's registries, or describe them as JSON
//! and use [`PlatformData`]:
//!
//! ```ignore
//! use item_aliases::{CanonicalItem, ItemStack, Platform};
//!
//! let material = platform.material("minecraft:oak_boat").unwrap();
//! let held = CanonicalItem::from_stack(&ItemStack::new(material), platform.material_info(material).unwrap());
//! println!("{}", aliases.material_name(&held, false));
//! ```

pub mod error;
pub mod types;
pub mod platform;
pub mod matching;
pub mod parser;
pub mod registry;
pub mod aliases;

// Re-export main types for convenience
pub use error::{AliasError, ParseError, Result};
pub use types::{
    BlockSnapshot, CanonicalItem, Enchantment, EnchantmentType, EntityRef, ItemMeta, ItemSelector,
    ItemSnapshot, ItemStack, Material, MaterialInfo, MatchQuality, SelectorSnapshot, Version,
};
pub use platform::{Platform, PlatformData};
pub use matching::MatchEngine;
pub use parser::{AliasParser, Conditions, Diagnostic, Diagnostics, Gender, Severity};
pub use registry::{AliasData, AliasName, AliasRegistry, MatchIndex};
pub use aliases::{AliasLoader, Aliases, LoaderConfig, ResolutionContext};

/// Load a platform table from a JSON file.
pub fn load_platform<P: AsRef<std::path::Path>>(path: P) -> Result<PlatformData> {
    PlatformData::from_path(path)
}

/// Load a platform table from JSON text (for WASM compatibility).
pub fn load_platform_from_str(json: &str) -> Result<PlatformData> {
    PlatformData::from_json(json)
}

#[cfg(feature = "wasm")]
pub mod wasm;
