//! Variations: named `{group}` fragments shared between aliases.
//!
//! A variation group such as `{wood type}` maps keys ("oak", "spruce") to
//! fragments carrying an optional id, tags and block states. An alias name
//! that references groups is expanded into the Cartesian product of their
//! entries, and each product entry is merged into the alias' own data.

use super::names::fix_name;
use super::tags::{parse_block_states, parse_tags};
use crate::error::ParseError;
use crate::types::Tags;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};

/// Key that binds an entry to the empty name of a group.
pub const DEFAULT_KEY: &str = "{default}";

/// One fragment of alias data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Variation {
    pub id: Option<String>,
    /// Byte position of the `-` placeholder in `id`, where an id from a
    /// group gets spliced in.
    pub insert_point: Option<usize>,
    pub tags: Tags,
    pub states: BTreeMap<String, String>,
}

impl Variation {
    /// Parse `id[states] {tags}`. Every part is optional; an id of `-` means
    /// no id.
    pub fn parse(raw: &str) -> Result<Variation, ParseError> {
        let item = raw.trim();
        let (id, tags) = match item.find('{') {
            None => (item, Tags::new()),
            Some(0) => return Err(ParseError::MissingTagId(item.to_string())),
            Some(idx) => (item[..idx].trim_end(), parse_tags(&item[idx..])?),
        };

        let (type_name, states) = match id.find('[') {
            None => (id, BTreeMap::new()),
            Some(0) => return Err(ParseError::MissingStateId(id.to_string())),
            Some(idx) => {
                let inner = id[idx + 1..].strip_suffix(']').ok_or(ParseError::NotEnoughBrackets {
                    offset: id[..idx].chars().count(),
                    bracket: '[',
                })?;
                (&id[..idx], parse_block_states(inner)?)
            }
        };

        let id = match type_name.trim() {
            "" | "-" => None,
            name => Some(name.to_string()),
        };
        let insert_point = id.as_ref().and_then(|id| id.find('-'));

        Ok(Variation {
            id,
            insert_point,
            tags,
            states,
        })
    }

    /// Whether this variation changes nothing.
    pub fn is_useless(&self) -> bool {
        self.id.is_none() && self.tags.is_empty() && self.states.is_empty()
    }

    /// Splice `inserted` into this variation's id at its insertion point.
    ///
    /// A trailing `-` on `inserted` is dropped first. Without an insertion
    /// point, or without an own id, `inserted` replaces the id.
    pub fn insert_id(&self, inserted: Option<&str>) -> Option<String> {
        let inserted = match inserted {
            Some(inserted) => inserted.strip_suffix('-').unwrap_or(inserted),
            None => return self.id.clone(),
        };
        let id = match &self.id {
            Some(id) => id,
            None => return Some(inserted.to_string()),
        };
        match self.insert_point {
            Some(point) => Some(format!("{}{}{}", &id[..point], inserted, &id[point + 1..])),
            None => Some(inserted.to_string()),
        }
    }

    /// Merge `other` into this variation. On tag or state collisions, this
    /// variation wins.
    pub fn merge(&self, other: &Variation) -> Variation {
        let mut tags = other.tags.clone();
        tags.extend(self.tags.clone());
        let mut states = other.states.clone();
        states.extend(self.states.clone());

        Variation {
            id: self.insert_id(other.id.as_deref()),
            insert_point: None,
            tags,
            states,
        }
    }

    /// Layer `other` over this one: its id, insertion point, tags and states
    /// replace what is here.
    fn absorb(&mut self, other: &Variation) {
        if other.id.is_some() {
            self.id = other.id.clone();
        }
        if other.insert_point.is_some() {
            self.insert_point = other.insert_point;
        }
        self.tags
            .extend(other.tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.states
            .extend(other.states.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

/// Ordered entries of one variation group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariationGroup {
    keys: Vec<String>,
    values: Vec<Variation>,
}

impl VariationGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. `{default}` is stored under the empty key.
    pub fn push(&mut self, key: &str, variation: Variation) {
        let key = if key == DEFAULT_KEY { "" } else { key };
        self.keys.push(key.to_string());
        self.values.push(variation);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn entry(&self, index: usize) -> (&str, &Variation) {
        (&self.keys[index], &self.values[index])
    }

    pub fn get(&self, key: &str) -> Option<&Variation> {
        self.keys
            .iter()
            .position(|k| k == key)
            .map(|i| &self.values[i])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

/// Where variation groups are looked up by their braced name.
pub trait VariationSource {
    fn variation_group(&self, name: &str) -> Option<&VariationGroup>;
}

impl VariationSource for HashMap<String, VariationGroup> {
    fn variation_group(&self, name: &str) -> Option<&VariationGroup> {
        self.get(name)
    }
}

enum Slot<'a> {
    Text(&'a str),
    Group(&'a VariationGroup),
}

/// Expand the `{group}` references in `name`.
///
/// Returns every expanded name with its merged variation, in enumeration
/// order: the leftmost group changes fastest. Unknown groups are reported and
/// left out of the name.
pub fn expand_variations<'a>(
    name: &'a str,
    source: &'a dyn VariationSource,
    errors: &mut Vec<ParseError>,
) -> IndexMap<String, Variation> {
    let mut slots = Vec::new();
    let mut group_start: Option<usize> = None;
    let mut text_start = 0;

    for (i, c) in name.char_indices() {
        match c {
            '{' => group_start = Some(i),
            '}' => match group_start.take() {
                Some(start) => {
                    slots.push(Slot::Text(&name[text_start..start]));
                    let group_name = &name[start..=i];
                    match source.variation_group(group_name) {
                        Some(group) => slots.push(Slot::Group(group)),
                        None => errors.push(ParseError::UnknownVariation(group_name.to_string())),
                    }
                    text_start = i + 1;
                }
                None => errors.push(ParseError::TooManyBrackets {
                    offset: name[..i].chars().count(),
                    bracket: '}',
                }),
            },
            _ => {}
        }
    }
    if let Some(start) = group_start {
        errors.push(ParseError::NotEnoughBrackets {
            offset: name[..start].chars().count(),
            bracket: '{',
        });
    }
    slots.push(Slot::Text(&name[text_start..]));

    let mut variations = IndexMap::new();

    if !slots.iter().any(|s| matches!(s, Slot::Group(_))) {
        let text: String = slots
            .iter()
            .filter_map(|s| match s {
                Slot::Text(t) => Some(*t),
                Slot::Group(_) => None,
            })
            .collect();
        variations.insert(fix_name(&text), Variation::default());
        return variations;
    }
    if slots.iter().any(|s| matches!(s, Slot::Group(g) if g.is_empty())) {
        return variations;
    }

    let mut counters = vec![0usize; slots.len()];
    loop {
        let mut expanded = String::new();
        let mut merged = Variation::default();
        let mut incremented = 0;

        for (i, slot) in slots.iter().enumerate() {
            match slot {
                Slot::Text(text) => {
                    expanded.push_str(text);
                    if i == incremented {
                        incremented += 1;
                    }
                }
                Slot::Group(group) => {
                    let (key, variation) = group.entry(counters[i]);
                    expanded.push_str(key);
                    merged.absorb(variation);
                    if i == incremented {
                        counters[i] += 1;
                        if counters[i] == group.len() {
                            counters[i] = 0;
                            incremented += 1;
                        }
                    }
                }
            }
        }

        variations.insert(fix_name(&expanded), merged);
        if incremented == slots.len() {
            break;
        }
    }

    variations
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn group(entries: &[(&str, &str)]) -> VariationGroup {
        let mut group = VariationGroup::new();
        for (key, raw) in entries {
            group.push(key, Variation::parse(raw).unwrap());
        }
        group
    }

    #[test]
    fn test_parse_full() {
        let var = Variation::parse("minecraft:oak_stairs[facing=north] {display: {Name: x}}").unwrap();
        assert_eq!(var.id.as_deref(), Some("minecraft:oak_stairs"));
        assert_eq!(var.states.get("facing").map(String::as_str), Some("north"));
        assert!(var.tags.contains_key("display"));
        assert_eq!(var.insert_point, None);
    }

    #[test]
    fn test_parse_placeholders() {
        let var = Variation::parse("minecraft:-_planks").unwrap();
        assert_eq!(var.insert_point, Some(10));

        let var = Variation::parse("- {Damage: 1}").unwrap();
        assert_eq!(var.id, None);
        assert_eq!(var.tags.get("Damage"), Some(&json!(1)));

        let var = Variation::parse("-[waterlogged=true]").unwrap();
        assert_eq!(var.id, None);
        assert_eq!(var.states.len(), 1);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Variation::parse("{Damage: 1}"),
            Err(ParseError::MissingTagId(_))
        ));
        assert!(matches!(
            Variation::parse("[facing=north]"),
            Err(ParseError::MissingStateId(_))
        ));
        assert!(matches!(
            Variation::parse("stairs[facing=north"),
            Err(ParseError::NotEnoughBrackets { bracket: '[', .. })
        ));
        assert!(matches!(
            Variation::parse("stairs[facing]"),
            Err(ParseError::MalformedState(_))
        ));
    }

    #[test]
    fn test_merge_precedence() {
        let a = Variation {
            id: Some("a-b".to_string()),
            insert_point: Some(1),
            tags: serde_json::from_value(json!({ "x": 1 })).unwrap(),
            states: BTreeMap::new(),
        };
        let c = Variation {
            id: Some("c".to_string()),
            insert_point: None,
            tags: serde_json::from_value(json!({ "x": 2, "y": 3 })).unwrap(),
            states: BTreeMap::new(),
        };

        let merged = a.merge(&c);
        assert_eq!(merged.id.as_deref(), Some("acb"));
        assert_eq!(merged.tags.get("x"), Some(&json!(1)));
        assert_eq!(merged.tags.get("y"), Some(&json!(3)));
    }

    #[test]
    fn test_insert_id() {
        let planks = Variation::parse("minecraft:-planks").unwrap();
        assert_eq!(planks.insert_id(Some("oak_-")).as_deref(), Some("minecraft:oak_planks"));
        assert_eq!(planks.insert_id(None).as_deref(), Some("minecraft:-planks"));

        let empty = Variation::default();
        assert_eq!(empty.insert_id(Some("stone")).as_deref(), Some("stone"));
    }

    #[test]
    fn test_default_key() {
        let group = group(&[("{default}", "-"), ("mossy", "-")]);
        assert_eq!(group.keys().collect::<Vec<_>>(), vec!["", "mossy"]);
    }

    #[test]
    fn test_plain_name() {
        let groups = HashMap::new();
        let mut errors = Vec::new();
        let expanded = expand_variations("  oak   boat ¦s", &groups, &mut errors);
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded.get("oak boat¦s"), Some(&Variation::default()));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_product_size() {
        let mut groups = HashMap::new();
        groups.insert(
            "{wood}".to_string(),
            group(&[("oak", "minecraft:oak_-"), ("spruce", "minecraft:spruce_-"), ("birch", "minecraft:birch_-")]),
        );
        groups.insert(
            "{color}".to_string(),
            group(&[("red", "- {Color: 1}"), ("blue", "- {Color: 2}")]),
        );

        let mut errors = Vec::new();
        let expanded = expand_variations("{color} {wood} chair", &groups, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(expanded.len(), 6);

        let names: Vec<&str> = expanded.keys().map(String::as_str).collect();
        assert_eq!(names[0], "red oak chair");
        assert_eq!(names[1], "blue oak chair");
        assert_eq!(names[2], "red spruce chair");

        let blue_birch = &expanded["blue birch chair"];
        assert_eq!(blue_birch.id.as_deref(), Some("minecraft:birch_-"));
        assert_eq!(blue_birch.tags.get("Color"), Some(&json!(2)));
    }

    #[test]
    fn test_later_slot_wins() {
        let mut groups = HashMap::new();
        groups.insert("{a}".to_string(), group(&[("x", "first {K: 1}")]));
        groups.insert("{b}".to_string(), group(&[("y", "second {K: 2}")]));

        let mut errors = Vec::new();
        let expanded = expand_variations("{a} {b}", &groups, &mut errors);
        let var = &expanded["x y"];
        assert_eq!(var.id.as_deref(), Some("second"));
        assert_eq!(var.tags.get("K"), Some(&json!(2)));
    }

    #[test]
    fn test_default_entry_collapses_name() {
        let mut groups = HashMap::new();
        groups.insert(
            "{mossy}".to_string(),
            group(&[("{default}", "-"), ("mossy", "minecraft:mossy_-")]),
        );

        let mut errors = Vec::new();
        let expanded = expand_variations("{mossy} cobblestone", &groups, &mut errors);
        let names: Vec<&str> = expanded.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["cobblestone", "mossy cobblestone"]);
    }

    #[test]
    fn test_unknown_group() {
        let groups = HashMap::new();
        let mut errors = Vec::new();
        let expanded = expand_variations("{nope} boat", &groups, &mut errors);
        assert_eq!(errors, vec![ParseError::UnknownVariation("{nope}".to_string())]);
        assert_eq!(expanded.keys().collect::<Vec<_>>(), vec!["boat"]);
    }
}
