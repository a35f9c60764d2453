//! Field-by-field metadata comparison.

use crate::types::{ItemMeta, MatchQuality, MetaKind};
use serde_json::Value;
use std::collections::BTreeSet;

/// Compare the metadata of `first` (subject) against `second` (pattern).
///
/// The result is never better than the worst field. Returns
/// [`MatchQuality::Different`] only when the pattern is of a metadata kind the
/// subject is not.
pub fn compare_metas(first: &ItemMeta, second: &ItemMeta, legacy: bool) -> MatchQuality {
    let mut quality = MatchQuality::Exact;

    lower(&mut quality, &first.display_name, &second.display_name, Option::is_some);
    lower(&mut quality, &first.lore, &second.lore, Option::is_some);
    lower(&mut quality, &first.enchantments, &second.enchantments, |e| !e.is_empty());
    lower(&mut quality, &first.hide_flags, &second.hide_flags, |f| *f != 0);

    let keys: BTreeSet<&String> = first.extra.keys().chain(second.extra.keys()).collect();
    for key in keys {
        lower(&mut quality, &first.extra.get(key), &second.extra.get(key), Option::is_some);
    }

    match (&first.kind, &second.kind) {
        (
            MetaKind::Potion {
                potion: ours,
                custom_effects: our_effects,
            },
            MetaKind::Potion {
                potion: theirs,
                custom_effects: their_effects,
            },
        ) => {
            if ours != theirs || our_effects != their_effects {
                return MatchQuality::SameMaterial;
            }
            quality
        }
        (_, MetaKind::Potion { .. }) => MatchQuality::Different,
        // Spawn eggs have their own material per mob on modern versions.
        (MetaKind::SpawnEgg(ours), MetaKind::SpawnEgg(theirs)) if legacy => {
            if ours != theirs {
                return MatchQuality::SameMaterial;
            }
            quality
        }
        (_, MetaKind::SpawnEgg(_)) if legacy => MatchQuality::Different,
        (MetaKind::Skull(ours), MetaKind::Skull(theirs)) => {
            if ours != theirs {
                return MatchQuality::SameMaterial;
            }
            quality
        }
        (_, MetaKind::Skull(_)) => MatchQuality::Different,
        (MetaKind::Container(ours), MetaKind::Container(theirs)) => {
            compare_contents(quality, ours, theirs)
        }
        (_, MetaKind::Container(_)) => MatchQuality::Different,
        (ours, theirs) => {
            lower(&mut quality, ours, theirs, |k| *k != MetaKind::Plain);
            quality
        }
    }
}

/// An empty pattern inventory accepts any contents.
fn compare_contents(quality: MatchQuality, ours: &[Value], theirs: &[Value]) -> MatchQuality {
    if ours == theirs {
        quality
    } else if theirs.is_empty() {
        worst(quality, MatchQuality::SameItem)
    } else {
        MatchQuality::SameMaterial
    }
}

/// Lower `quality` if the field differs: to SAME_ITEM when only the subject
/// sets it, to SAME_MATERIAL otherwise. Never raises it.
fn lower<T: PartialEq>(quality: &mut MatchQuality, ours: &T, theirs: &T, is_set: impl Fn(&T) -> bool) {
    if ours == theirs {
        return;
    }
    let new_quality = if is_set(ours) && !is_set(theirs) {
        MatchQuality::SameItem
    } else {
        MatchQuality::SameMaterial
    };
    *quality = worst(*quality, new_quality);
}

fn worst(a: MatchQuality, b: MatchQuality) -> MatchQuality {
    a.max(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Enchantment;
    use serde_json::json;

    fn named(name: &str) -> ItemMeta {
        ItemMeta {
            display_name: Some(name.to_string()),
            ..ItemMeta::default()
        }
    }

    #[test]
    fn test_equal_metas() {
        assert_eq!(
            compare_metas(&named("A"), &named("A"), false),
            MatchQuality::Exact
        );
        assert_eq!(
            compare_metas(&ItemMeta::default(), &ItemMeta::default(), false),
            MatchQuality::Exact
        );
    }

    #[test]
    fn test_extra_subject_field() {
        assert_eq!(
            compare_metas(&named("A"), &ItemMeta::default(), false),
            MatchQuality::SameItem
        );
    }

    #[test]
    fn test_mismatched_pattern_field() {
        assert_eq!(
            compare_metas(&named("A"), &named("B"), false),
            MatchQuality::SameMaterial
        );
        assert_eq!(
            compare_metas(&ItemMeta::default(), &named("B"), false),
            MatchQuality::SameMaterial
        );
    }

    #[test]
    fn test_never_upgrades() {
        let mut subject = named("A");
        subject.enchantments.insert(Enchantment::new("sharpness"), 1);
        let mut pattern = named("B");
        pattern.enchantments.clear();
        // Name mismatch already gives SAME_MATERIAL; the extra enchantment
        // must not raise it back to SAME_ITEM.
        assert_eq!(
            compare_metas(&subject, &pattern, false),
            MatchQuality::SameMaterial
        );
    }

    #[test]
    fn test_extra_tags_by_key() {
        let mut subject = ItemMeta::default();
        subject.extra.insert("CustomModelData".to_string(), json!(1));
        let mut pattern = ItemMeta::default();

        assert_eq!(compare_metas(&subject, &pattern, false), MatchQuality::SameItem);

        pattern.extra.insert("CustomModelData".to_string(), json!(2));
        assert_eq!(compare_metas(&subject, &pattern, false), MatchQuality::SameMaterial);
    }

    #[test]
    fn test_skull_owner() {
        let ours = ItemMeta {
            kind: MetaKind::Skull(Some(json!("Notch"))),
            ..ItemMeta::default()
        };
        let theirs = ItemMeta {
            kind: MetaKind::Skull(Some(json!("jeb_"))),
            ..ItemMeta::default()
        };
        assert_eq!(compare_metas(&ours, &theirs, false), MatchQuality::SameMaterial);
        assert_eq!(compare_metas(&ItemMeta::default(), &theirs, false), MatchQuality::Different);
    }

    #[test]
    fn test_spawn_egg_only_on_legacy() {
        let pig = ItemMeta {
            kind: MetaKind::SpawnEgg(Some("minecraft:pig".to_string())),
            ..ItemMeta::default()
        };
        assert_eq!(compare_metas(&ItemMeta::default(), &pig, true), MatchQuality::Different);
        assert_eq!(compare_metas(&ItemMeta::default(), &pig, false), MatchQuality::SameMaterial);
        assert_eq!(compare_metas(&pig, &ItemMeta::default(), false), MatchQuality::SameItem);
    }

    #[test]
    fn test_container_contents() {
        let empty = ItemMeta {
            kind: MetaKind::Container(Vec::new()),
            ..ItemMeta::default()
        };
        let filled = ItemMeta {
            kind: MetaKind::Container(vec![json!({ "id": "minecraft:stone" })]),
            ..ItemMeta::default()
        };

        assert_eq!(compare_metas(&filled, &empty, false), MatchQuality::SameItem);
        assert_eq!(compare_metas(&empty, &filled, false), MatchQuality::SameMaterial);
        assert_eq!(compare_metas(&ItemMeta::default(), &empty, false), MatchQuality::Different);
    }
}
