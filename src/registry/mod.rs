//! Alias registry: names, variation groups and registered items.
//!
//! A registry maps alias names to selectors of canonical items and indexes
//! those items by material. Script-local registries have a parent (the
//! global registry snapshot they were created against) and fall back to it
//! for every lookup.

mod index;

pub use index::{AliasData, Match, MatchIndex, MaterialBucket};

use crate::error::ParseError;
use crate::matching::MatchEngine;
use crate::parser::{Gender, VariationGroup, VariationSource};
use crate::platform::Platform;
use crate::types::{CanonicalItem, EntityRef, ItemSelector, Material, Tags};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

const GLOBAL_CAPACITY: usize = 10_000;
const SCRIPT_CAPACITY: usize = 10;

/// Reserved block state key naming the entity an alias relates to.
pub const RELATED_ENTITY_STATE: &str = "relatedEntity";

/// Singular and plural form of an alias name, with its gender.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AliasName {
    pub singular: String,
    pub plural: String,
    pub gender: Gender,
}

impl AliasName {
    pub fn new(singular: impl Into<String>, plural: impl Into<String>, gender: Gender) -> Self {
        Self {
            singular: singular.into(),
            plural: plural.into(),
            gender,
        }
    }

    pub fn form(&self, plural: bool) -> &str {
        if plural {
            &self.plural
        } else {
            &self.singular
        }
    }
}

impl fmt::Display for AliasName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.singular)
    }
}

/// Handle of a selector in a registry's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectorId(usize);

/// Alias names, variation groups and the match index of one scope.
#[derive(Clone)]
pub struct AliasRegistry {
    parent: Option<Arc<AliasRegistry>>,
    platform: Arc<dyn Platform>,
    names: HashMap<String, SelectorId>,
    selectors: Vec<Vec<Arc<CanonicalItem>>>,
    groups: HashMap<String, VariationGroup>,
    index: MatchIndex,
    materials: BTreeSet<Material>,
}

impl fmt::Debug for AliasRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AliasRegistry")
            .field("has_parent", &self.parent.is_some())
            .field("names", &self.names.len())
            .field("selectors", &self.selectors.len())
            .field("groups", &self.groups.len())
            .field("items", &self.index.len())
            .finish()
    }
}

impl AliasRegistry {
    /// Create an empty top-level registry.
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self::with_capacity(None, platform, GLOBAL_CAPACITY)
    }

    /// Create an empty script-local registry deferring to `parent`.
    pub fn with_parent(parent: Arc<AliasRegistry>) -> Self {
        let platform = parent.platform.clone();
        Self::with_capacity(Some(parent), platform, SCRIPT_CAPACITY)
    }

    fn with_capacity(parent: Option<Arc<AliasRegistry>>, platform: Arc<dyn Platform>, capacity: usize) -> Self {
        Self {
            parent,
            platform,
            names: HashMap::with_capacity(capacity),
            selectors: Vec::with_capacity(capacity),
            groups: HashMap::new(),
            index: MatchIndex::new(),
            materials: BTreeSet::new(),
        }
    }

    pub fn platform(&self) -> &dyn Platform {
        &*self.platform
    }

    pub fn platform_arc(&self) -> Arc<dyn Platform> {
        self.platform.clone()
    }

    pub fn engine(&self) -> MatchEngine<'_> {
        MatchEngine::new(&*self.platform)
    }

    pub fn parent(&self) -> Option<&Arc<AliasRegistry>> {
        self.parent.as_ref()
    }

    pub fn index(&self) -> &MatchIndex {
        &self.index
    }

    /// Register one alias.
    ///
    /// `id` is either the name of an existing alias, whose items are reused,
    /// or a material id. A new item is deduplicated against the index: an
    /// exact duplicate of an already registered item reuses that item.
    pub fn add_alias(
        &mut self,
        name: &AliasName,
        id: &str,
        tags: Tags,
        mut states: BTreeMap<String, String>,
    ) -> Result<(), ParseError> {
        let items = match self.alias_items(id) {
            Some(items) => items.to_vec(),
            None => {
                let material = self
                    .platform
                    .material(id)
                    .ok_or_else(|| ParseError::InvalidMinecraftId(id.to_string()))?;
                let info = self
                    .platform
                    .material_info(material)
                    .ok_or_else(|| ParseError::InvalidMinecraftId(id.to_string()))?;
                self.materials.insert(material);

                let related_entity = states.remove(RELATED_ENTITY_STATE).map(EntityRef);
                if !info.block && !states.is_empty() {
                    return Err(ParseError::StatesOnItem(id.to_string()));
                }
                let item = CanonicalItem::from_alias(material, info, tags, states);

                let existing = {
                    let engine = MatchEngine::new(&*self.platform);
                    self.index.exact_match(&item, &engine).map(|data| data.item.clone())
                };
                match existing {
                    Some(shared) => vec![shared],
                    None => {
                        let item = Arc::new(item);
                        self.index.add(AliasData {
                            item: item.clone(),
                            name: name.clone(),
                            minecraft_id: id.to_string(),
                            related_entity,
                        });
                        vec![item]
                    }
                }
            }
        };

        let singular = name.singular.to_lowercase();
        let plural = name.plural.to_lowercase();
        let selector = match self.names.get(&singular).or_else(|| self.names.get(&plural)) {
            Some(id) => *id,
            None => {
                let id = SelectorId(self.selectors.len());
                self.selectors.push(Vec::new());
                id
            }
        };
        self.names.insert(singular, selector);
        self.names.insert(plural, selector);
        self.selectors[selector.0].extend(items);
        Ok(())
    }

    /// Items of an alias, checking this registry then its parents.
    pub fn alias_items(&self, name: &str) -> Option<&[Arc<CanonicalItem>]> {
        match self.names.get(&name.to_lowercase()) {
            Some(id) => Some(&self.selectors[id.0]),
            None => self.parent.as_ref()?.alias_items(name),
        }
    }

    /// Selector for an alias name, checking this registry then its parents.
    pub fn lookup(&self, name: &str) -> Option<ItemSelector> {
        let items = self.alias_items(name)?;
        let mut selector = ItemSelector::new();
        selector.add_all(items.iter().map(|item| (**item).clone()));
        Some(selector)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.alias_items(name).is_some()
    }

    pub fn add_variation_group(&mut self, name: impl Into<String>, group: VariationGroup) {
        self.groups.insert(name.into(), group);
    }

    /// Alias data best describing `item`, checking this registry then its
    /// parents.
    pub fn alias_data(&self, item: &CanonicalItem) -> Option<&AliasData> {
        let found = self.index.match_alias(item, &self.engine());
        match found.data {
            Some(data) => Some(data),
            None => self.parent.as_ref()?.alias_data(item),
        }
    }

    /// How well the best alias of this registry matches `item`.
    pub fn match_alias(&self, item: &CanonicalItem) -> Match<'_> {
        self.index.match_alias(item, &self.engine())
    }

    pub fn material_name(&self, item: &CanonicalItem) -> Option<&AliasName> {
        self.alias_data(item).map(|data| &data.name)
    }

    pub fn minecraft_id(&self, item: &CanonicalItem) -> Option<&str> {
        self.alias_data(item).map(|data| data.minecraft_id.as_str())
    }

    pub fn related_entity(&self, item: &CanonicalItem) -> Option<&EntityRef> {
        self.alias_data(item)?.related_entity.as_ref()
    }

    /// Whether any alias of this registry or its parents uses `material`.
    pub fn has_material(&self, material: Material) -> bool {
        self.materials.contains(&material)
            || self.parent.as_ref().map_or(false, |p| p.has_material(material))
    }

    /// Number of names registered here, singular and plural counted apart.
    pub fn alias_count(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.names.clear();
        self.selectors.clear();
        self.groups.clear();
        self.index.clear();
        self.materials.clear();
    }
}

impl VariationSource for AliasRegistry {
    fn variation_group(&self, name: &str) -> Option<&VariationGroup> {
        match self.groups.get(name) {
            Some(group) => Some(group),
            None => self.parent.as_ref()?.variation_group(name),
        }
    }
}
