//! Structured item metadata decoded from alias tags.
//!
//! Tags arrive as a generic JSON-like map (the same shape Minecraft uses for
//! item NBT). The fields that take part in matching are pulled out into typed
//! fields; everything else is kept in [`ItemMeta::extra`] and compared key by
//! key.

use super::material::Enchantment;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Generic tag map, as parsed from alias data.
pub type Tags = Map<String, Value>;

/// Id and level of one `Enchantments` entry. A missing level means 1.
fn enchantment_entry(entry: &Value) -> Option<(Enchantment, u32)> {
    let id = entry.get("id")?.as_str()?;
    let level = match entry.get("lvl") {
        None => 1,
        Some(lvl) => u32::try_from(lvl.as_i64()?).ok()?,
    };
    Some((Enchantment::new(id), level))
}

/// Type-specific metadata. At most one kind applies to an item.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MetaKind {
    #[default]
    Plain,
    /// Potion base type and custom effects.
    Potion {
        potion: Option<String>,
        custom_effects: Option<Value>,
    },
    /// Spawn egg with the entity it spawns.
    SpawnEgg(Option<String>),
    /// Player head with its owner.
    Skull(Option<Value>),
    /// Item that carries an inventory (chests, chest boats, shulker boxes).
    Container(Vec<Value>),
}

/// Item metadata compared field by field by the match engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemMeta {
    pub display_name: Option<String>,
    pub lore: Option<Vec<String>>,
    pub enchantments: BTreeMap<Enchantment, u32>,
    /// Hidden tooltip parts, as the `HideFlags` bit mask.
    pub hide_flags: u32,
    pub kind: MetaKind,
    /// Tags without a dedicated field.
    pub extra: BTreeMap<String, Value>,
}

impl ItemMeta {
    /// Decode metadata from a tag map.
    pub fn from_tags(tags: &Tags) -> Self {
        let mut meta = ItemMeta::default();
        let mut potion: Option<String> = None;
        let mut custom_effects: Option<Value> = None;

        for (key, value) in tags {
            match key.as_str() {
                "display" => match value {
                    Value::Object(display) => {
                        let mut rest = Map::new();
                        for (k, v) in display {
                            match (k.as_str(), v) {
                                ("Name", Value::String(name)) => {
                                    meta.display_name = Some(name.clone())
                                }
                                ("Lore", Value::Array(lines)) => {
                                    meta.lore = Some(lines.iter().map(value_to_text).collect())
                                }
                                _ => {
                                    rest.insert(k.clone(), v.clone());
                                }
                            }
                        }
                        if !rest.is_empty() {
                            meta.extra.insert(key.clone(), Value::Object(rest));
                        }
                    }
                    other => {
                        meta.extra.insert(key.clone(), other.clone());
                    }
                },
                "Enchantments" => match value {
                    Value::Array(entries) => {
                        for entry in entries {
                            match enchantment_entry(entry) {
                                Some((enchantment, level)) => {
                                    meta.enchantments.insert(enchantment, level);
                                }
                                None => log::warn!("Ignoring malformed enchantment entry {}", entry),
                            }
                        }
                    }
                    other => {
                        meta.extra.insert(key.clone(), other.clone());
                    }
                },
                "HideFlags" => match value.as_u64().and_then(|flags| u32::try_from(flags).ok()) {
                    Some(flags) => meta.hide_flags = flags,
                    None => {
                        meta.extra.insert(key.clone(), value.clone());
                    }
                },
                "Potion" => potion = Some(value_to_text(value)),
                "CustomPotionEffects" => custom_effects = Some(value.clone()),
                "EntityTag" => {
                    let id = value.get("id").and_then(Value::as_str).map(str::to_string);
                    meta.kind = MetaKind::SpawnEgg(id);
                    // The tag may carry more than the id; keep it comparable.
                    if value.as_object().map(|o| o.len() > 1).unwrap_or(false) {
                        meta.extra.insert(key.clone(), value.clone());
                    }
                }
                "SkullOwner" => meta.kind = MetaKind::Skull(Some(value.clone())),
                "Items" => match value {
                    Value::Array(items) => meta.kind = MetaKind::Container(items.clone()),
                    other => {
                        meta.extra.insert(key.clone(), other.clone());
                    }
                },
                _ => {
                    meta.extra.insert(key.clone(), value.clone());
                }
            }
        }

        if potion.is_some() || custom_effects.is_some() {
            meta.kind = MetaKind::Potion {
                potion,
                custom_effects,
            };
        }

        meta
    }

    /// Encode this metadata back into a tag map.
    pub fn to_tags(&self) -> Tags {
        let mut tags: Tags = self
            .extra
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        if self.display_name.is_some() || self.lore.is_some() {
            let mut display = match tags.remove("display") {
                Some(Value::Object(existing)) => existing,
                _ => Map::new(),
            };
            if let Some(name) = &self.display_name {
                display.insert("Name".to_string(), Value::String(name.clone()));
            }
            if let Some(lore) = &self.lore {
                display.insert("Lore".to_string(), json!(lore));
            }
            tags.insert("display".to_string(), Value::Object(display));
        }

        if !self.enchantments.is_empty() {
            let entries: Vec<Value> = self
                .enchantments
                .iter()
                .map(|(ench, level)| json!({ "id": ench.id(), "lvl": level }))
                .collect();
            tags.insert("Enchantments".to_string(), Value::Array(entries));
        }

        if self.hide_flags != 0 {
            tags.insert("HideFlags".to_string(), json!(self.hide_flags));
        }

        match &self.kind {
            MetaKind::Plain => {}
            MetaKind::Potion {
                potion,
                custom_effects,
            } => {
                if let Some(potion) = potion {
                    tags.insert("Potion".to_string(), Value::String(potion.clone()));
                }
                if let Some(effects) = custom_effects {
                    tags.insert("CustomPotionEffects".to_string(), effects.clone());
                }
            }
            MetaKind::SpawnEgg(entity) => {
                let mut entity_tag = match tags.remove("EntityTag") {
                    Some(Value::Object(existing)) => existing,
                    _ => Map::new(),
                };
                if let Some(entity) = entity {
                    entity_tag.insert("id".to_string(), Value::String(entity.clone()));
                }
                tags.insert("EntityTag".to_string(), Value::Object(entity_tag));
            }
            MetaKind::Skull(owner) => {
                if let Some(owner) = owner {
                    tags.insert("SkullOwner".to_string(), owner.clone());
                }
            }
            MetaKind::Container(items) => {
                tags.insert("Items".to_string(), Value::Array(items.clone()));
            }
        }

        tags
    }

    /// Whether nothing at all is set.
    pub fn is_empty(&self) -> bool {
        *self == ItemMeta::default()
    }

    /// Copy lore, display name, enchantments and flags from `other` when set
    /// there.
    pub fn apply(&mut self, other: &ItemMeta) {
        if other.lore.is_some() {
            self.lore = other.lore.clone();
        }
        if other.display_name.is_some() {
            self.display_name = other.display_name.clone();
        }
        for (ench, level) in &other.enchantments {
            self.enchantments.insert(ench.clone(), *level);
        }
        self.hide_flags |= other.hide_flags;
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
