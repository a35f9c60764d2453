//! Per-material index of registered alias items.

use super::AliasName;
use crate::matching::MatchEngine;
use crate::types::{CanonicalItem, EntityRef, Material, MatchQuality};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One registered item with the alias that introduced it.
#[derive(Debug, Clone)]
pub struct AliasData {
    pub item: Arc<CanonicalItem>,
    pub name: AliasName,
    /// Raw id from the alias definition, lowercased.
    pub minecraft_id: String,
    pub related_entity: Option<EntityRef>,
}

/// Registered items of one material.
#[derive(Debug, Clone, Default)]
pub struct MaterialBucket {
    default_item: Option<AliasData>,
    alternatives: Vec<AliasData>,
}

impl MaterialBucket {
    pub fn default_item(&self) -> Option<&AliasData> {
        self.default_item.as_ref()
    }

    pub fn alternatives(&self) -> &[AliasData] {
        &self.alternatives
    }

    pub fn is_empty(&self) -> bool {
        self.default_item.is_none() && self.alternatives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AliasData> {
        self.default_item.iter().chain(self.alternatives.iter())
    }
}

/// Result of an index lookup.
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    pub quality: MatchQuality,
    pub data: Option<&'a AliasData>,
}

impl<'a> Match<'a> {
    fn none() -> Self {
        Self {
            quality: MatchQuality::Different,
            data: None,
        }
    }
}

/// Buckets of alias data keyed by material.
#[derive(Debug, Clone, Default)]
pub struct MatchIndex {
    buckets: BTreeMap<Material, MaterialBucket>,
}

impl MatchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add alias data. The default variant of a material replaces any earlier
    /// default; everything else is appended in registration order.
    pub fn add(&mut self, data: AliasData) {
        let bucket = self.buckets.entry(data.item.material()).or_default();
        if data.item.is_default() {
            bucket.default_item = Some(data);
        } else {
            bucket.alternatives.push(data);
        }
    }

    pub fn bucket(&self, material: Material) -> Option<&MaterialBucket> {
        self.buckets.get(&material)
    }

    /// Find the alias that best describes `item`.
    ///
    /// Alternatives win over the default only when they match better than
    /// [`MatchQuality::SameMaterial`]. Among alternatives of equal quality the
    /// first registered wins.
    pub fn match_alias(&self, item: &CanonicalItem, engine: &MatchEngine<'_>) -> Match<'_> {
        let bucket = match self.buckets.get(&item.material()) {
            Some(bucket) if !bucket.is_empty() => bucket,
            _ => return Match::none(),
        };

        let mut best = Match::none();
        for data in &bucket.alternatives {
            let quality = engine.compare(item, &data.item);
            if quality.is_better(best.quality) {
                best = Match {
                    quality,
                    data: Some(data),
                };
            }
        }

        if best.quality.is_better(MatchQuality::SameMaterial) {
            return best;
        }
        if let Some(default) = &bucket.default_item {
            return Match {
                quality: engine.compare(item, &default.item),
                data: Some(default),
            };
        }
        match best.data {
            Some(data) => Match {
                quality: MatchQuality::SameMaterial,
                data: Some(data),
            },
            None => Match::none(),
        }
    }

    /// Find registered alias data that is an exact match for `item`, the
    /// default variant included.
    pub fn exact_match(&self, item: &CanonicalItem, engine: &MatchEngine<'_>) -> Option<&AliasData> {
        self.buckets
            .get(&item.material())?
            .iter()
            .find(|data| engine.compare(item, &data.item) == MatchQuality::Exact)
    }

    pub fn len(&self) -> usize {
        self.buckets
            .values()
            .map(|b| b.alternatives.len() + usize::from(b.default_item.is_some()))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(MaterialBucket::is_empty)
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}
