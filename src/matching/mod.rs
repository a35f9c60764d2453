//! Graded comparison of two items.
//!
//! [`MatchEngine::compare`] answers "how well does `subject` match
//! `pattern`?". The comparison is deliberately asymmetric: data the subject
//! carries and the pattern does not mention only lowers the result to
//! [`MatchQuality::SameItem`], while data the pattern asks for and the subject
//! lacks lowers it to [`MatchQuality::SameMaterial`] or worse.

mod meta;

pub use meta::compare_metas;

use crate::platform::Platform;
use crate::types::{CanonicalItem, ItemFlags, MatchQuality};

/// Compares items using the platform's rules.
#[derive(Clone, Copy)]
pub struct MatchEngine<'a> {
    platform: &'a dyn Platform,
}

impl<'a> MatchEngine<'a> {
    pub fn new(platform: &'a dyn Platform) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> &'a dyn Platform {
        self.platform
    }

    /// How well `subject` matches `pattern`.
    pub fn compare(&self, subject: &CanonicalItem, pattern: &CanonicalItem) -> MatchQuality {
        if subject.is_anything() || pattern.is_anything() {
            return MatchQuality::Exact;
        }
        if subject.material() != pattern.material() {
            return MatchQuality::Different;
        }

        let legacy = self.platform.legacy_data_values();
        if !legacy {
            // Held items have no block state, so a pattern asking for one
            // can only share the material.
            let pattern_states = pattern.block_values().map_or(false, |b| !b.is_default);
            if subject.is_item_form() && pattern_states {
                return MatchQuality::SameMaterial;
            }
        } else if !subject.flags().is_empty() && subject.durability() != pattern.durability() {
            // Legacy data values tell materials apart (white vs red wool).
            return MatchQuality::Different;
        }

        let mut quality = match (subject.block_values(), pattern.block_values()) {
            (Some(ours), Some(theirs)) => self.platform.compare_block_states(ours, theirs),
            (None, None) => MatchQuality::Exact,
            _ => MatchQuality::SameMaterial,
        };

        if subject.durability() != pattern.durability() {
            quality = if pattern.flags().contains(ItemFlags::CHANGED_DURABILITY) {
                MatchQuality::SameMaterial
            } else {
                MatchQuality::SameItem
            };
        }

        if quality.is_at_least(MatchQuality::SameItem) {
            let meta_quality = compare_metas(subject.meta(), pattern.meta(), legacy);
            if meta_quality == MatchQuality::SameMaterial
                && !pattern.flags().contains(ItemFlags::CHANGED_TAGS)
            {
                // The pattern does not care about metadata; the comparison
                // only ruled out an exact match.
                quality = MatchQuality::SameItem;
            } else if quality.is_better(meta_quality) {
                quality = meta_quality;
            }
        }

        quality
    }

    /// Whether two items are the same item, checking from the alias side.
    pub fn same_item(&self, a: &CanonicalItem, b: &CanonicalItem) -> bool {
        let quality = if a.is_alias() {
            self.compare(b, a)
        } else {
            self.compare(a, b)
        };
        quality.is_at_least(MatchQuality::SameItem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformData;
    use crate::types::{ItemMeta, ItemStack, MaterialInfo, Tags, Version};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn platform() -> PlatformData {
        PlatformData::new(Version::new(1, 20, 4))
            .with_material(MaterialInfo::new("oak_stairs").block())
            .with_material(MaterialInfo::new("diamond_sword").with_durability(1561))
            .with_material(MaterialInfo::new("oak_boat"))
            .with_material(MaterialInfo::new("potion"))
    }

    fn alias(platform: &PlatformData, id: &str, tags: serde_json::Value) -> CanonicalItem {
        alias_with_states(platform, id, tags, &[])
    }

    fn alias_with_states(
        platform: &PlatformData,
        id: &str,
        tags: serde_json::Value,
        states: &[(&str, &str)],
    ) -> CanonicalItem {
        let material = platform.material(id).unwrap();
        let tags: Tags = serde_json::from_value(tags).unwrap();
        let states: BTreeMap<String, String> = states
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CanonicalItem::from_alias(material, platform.material_info(material).unwrap(), tags, states)
    }

    #[test]
    fn test_wildcard_and_material() {
        let platform = platform();
        let engine = MatchEngine::new(&platform);
        let sword = alias(&platform, "diamond_sword", json!({}));
        let boat = alias(&platform, "oak_boat", json!({}));

        assert_eq!(engine.compare(&sword, &CanonicalItem::anything()), MatchQuality::Exact);
        assert_eq!(engine.compare(&CanonicalItem::anything(), &boat), MatchQuality::Exact);
        assert_eq!(engine.compare(&sword, &boat), MatchQuality::Different);
        assert_eq!(engine.compare(&sword, &sword), MatchQuality::Exact);
    }

    #[test]
    fn test_durability_asymmetry() {
        let platform = platform();
        let engine = MatchEngine::new(&platform);
        let plain = alias(&platform, "diamond_sword", json!({}));
        let damaged = alias(&platform, "diamond_sword", json!({ "Damage": 10 }));

        // Pattern does not ask for durability: extra data on the subject.
        assert_eq!(engine.compare(&damaged, &plain), MatchQuality::SameItem);
        // Pattern asks for durability the subject lacks.
        assert_eq!(engine.compare(&plain, &damaged), MatchQuality::SameMaterial);
    }

    #[test]
    fn test_meta_asymmetry() {
        let platform = platform();
        let engine = MatchEngine::new(&platform);
        let plain = alias(&platform, "diamond_sword", json!({}));
        let named = alias(&platform, "diamond_sword", json!({ "display": { "Name": "Blade" } }));

        assert_eq!(engine.compare(&named, &plain), MatchQuality::SameItem);
        assert_eq!(engine.compare(&plain, &named), MatchQuality::SameMaterial);
    }

    #[test]
    fn test_meta_promotion_without_tag_flag() {
        let platform = platform();
        let engine = MatchEngine::new(&platform);
        let sword = platform.material("diamond_sword").unwrap();
        let info = platform.material_info(sword).unwrap();

        let mut subject = CanonicalItem::new(sword, info);
        let mut meta = ItemMeta::default();
        meta.lore = Some(vec!["a".to_string()]);
        subject.set_meta(meta);

        // A pattern with different lore but no tag flag only rules out EXACT.
        let mut pattern = CanonicalItem::new(sword, info);
        pattern.meta.lore = Some(vec!["b".to_string()]);
        assert_eq!(engine.compare(&subject, &pattern), MatchQuality::SameItem);

        pattern.flags |= ItemFlags::CHANGED_TAGS;
        assert_eq!(engine.compare(&subject, &pattern), MatchQuality::SameMaterial);
    }

    #[test]
    fn test_required_durability_blocks_meta_promotion() {
        let platform = platform();
        let engine = MatchEngine::new(&platform);
        let sword = platform.material("diamond_sword").unwrap();
        let info = platform.material_info(sword).unwrap();

        let mut subject = CanonicalItem::new(sword, info);
        let mut meta = ItemMeta::default();
        meta.lore = Some(vec!["a".to_string()]);
        subject.set_meta(meta);

        // Lore alone would be promoted to SAME_ITEM, but the durability the
        // pattern asks for is missing, so metadata is never consulted.
        let mut pattern = alias(&platform, "diamond_sword", json!({ "Damage": 10 }));
        pattern.meta.lore = Some(vec!["b".to_string()]);
        assert!(!pattern.flags().contains(ItemFlags::CHANGED_TAGS));
        assert_eq!(engine.compare(&subject, &pattern), MatchQuality::SameMaterial);
    }

    #[test]
    fn test_unrequested_durability_raises_state_mismatch() {
        let platform = platform();
        let engine = MatchEngine::new(&platform);
        let north = alias_with_states(&platform, "oak_stairs", json!({}), &[("facing", "north")]);
        let damaged_north = alias_with_states(&platform, "oak_stairs", json!({ "Damage": 1 }), &[("facing", "north")]);
        let north_top = alias_with_states(
            &platform,
            "oak_stairs",
            json!({}),
            &[("facing", "north"), ("half", "top")],
        );

        // States alone leave SAME_MATERIAL; a durability the pattern does not
        // ask for resets the result to SAME_ITEM.
        assert_eq!(engine.compare(&north, &north_top), MatchQuality::SameMaterial);
        assert_eq!(engine.compare(&damaged_north, &north_top), MatchQuality::SameItem);
    }

    #[test]
    fn test_block_states() {
        let platform = platform();
        let engine = MatchEngine::new(&platform);
        let any_stairs = alias(&platform, "oak_stairs", json!({}));
        let north = alias_with_states(&platform, "oak_stairs", json!({}), &[("facing", "north")]);
        let north_top = alias_with_states(
            &platform,
            "oak_stairs",
            json!({}),
            &[("facing", "north"), ("half", "top")],
        );

        assert_eq!(engine.compare(&north, &north), MatchQuality::Exact);
        assert_eq!(engine.compare(&north_top, &north), MatchQuality::SameItem);
        assert_eq!(engine.compare(&north, &north_top), MatchQuality::SameMaterial);
        assert_eq!(engine.compare(&north, &any_stairs), MatchQuality::SameItem);
    }

    #[test]
    fn test_held_item_against_block_state_pattern() {
        let platform = platform();
        let engine = MatchEngine::new(&platform);
        let stairs = platform.material("oak_stairs").unwrap();
        let held = CanonicalItem::from_stack(&ItemStack::new(stairs), platform.material_info(stairs).unwrap());
        let north = alias_with_states(&platform, "oak_stairs", json!({}), &[("facing", "north")]);
        let any_stairs = alias(&platform, "oak_stairs", json!({}));

        assert_eq!(engine.compare(&held, &north), MatchQuality::SameMaterial);
        assert_eq!(engine.compare(&held, &any_stairs), MatchQuality::Exact);
    }

    #[test]
    fn test_legacy_damage_is_different() {
        let platform = platform().with_legacy_data_values(true);
        let engine = MatchEngine::new(&platform);
        let plain = alias(&platform, "diamond_sword", json!({}));
        let damaged = alias(&platform, "diamond_sword", json!({ "Damage": 3 }));

        assert_eq!(engine.compare(&damaged, &plain), MatchQuality::Different);
        assert_eq!(engine.compare(&plain, &damaged), MatchQuality::SameMaterial);
    }

    #[test]
    fn test_missing_subtype_is_different() {
        let platform = platform();
        let engine = MatchEngine::new(&platform);
        let water = alias(&platform, "potion", json!({}));
        let healing = alias(&platform, "potion", json!({ "Potion": "minecraft:healing" }));

        assert_eq!(engine.compare(&water, &healing), MatchQuality::Different);
        assert_eq!(engine.compare(&healing, &water), MatchQuality::SameItem);
    }

    #[test]
    fn test_same_item() {
        let platform = platform();
        let engine = MatchEngine::new(&platform);
        let boat = alias(&platform, "oak_boat", json!({}));
        let chest_boat = alias(&platform, "oak_boat", json!({ "Items": [] }));

        assert!(engine.same_item(&boat, &boat));
        assert!(!engine.same_item(&chest_boat, &boat));
    }
}
