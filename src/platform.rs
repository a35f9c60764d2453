//! Host platform capabilities.
//!
//! The alias system never hard-codes Minecraft content. Materials,
//! enchantments, the running version and the block state comparator all come
//! from a [`Platform`]. [`PlatformData`] is a table-driven implementation that
//! can be loaded from JSON.

use crate::error::Result;
use crate::types::{namespaced, BlockValues, Enchantment, Material, MaterialInfo, MatchQuality, Version};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Capabilities the alias system needs from the host.
pub trait Platform: Send + Sync {
    /// Look up a material by id, with or without namespace.
    fn material(&self, id: &str) -> Option<Material>;

    /// Static information about a material.
    fn material_info(&self, material: Material) -> Option<&MaterialInfo>;

    /// Iterate over all known materials.
    fn materials(&self) -> Box<dyn Iterator<Item = Material> + '_>;

    /// Look up an enchantment by its user-facing name or id.
    fn enchantment(&self, name: &str) -> Option<Enchantment>;

    /// Running Minecraft version.
    fn version(&self) -> &Version;

    /// Whether items carry legacy data values (pre-1.13) instead of block
    /// states.
    fn legacy_data_values(&self) -> bool {
        false
    }

    /// Compare block states of a subject against a pattern.
    ///
    /// The default implementation returns [`MatchQuality::Exact`] for equal
    /// states, [`MatchQuality::SameItem`] when every state the pattern names
    /// has the same value on the subject and [`MatchQuality::SameMaterial`]
    /// otherwise.
    fn compare_block_states(&self, subject: &BlockValues, pattern: &BlockValues) -> MatchQuality {
        if subject.states == pattern.states {
            return MatchQuality::Exact;
        }
        let covered = pattern
            .states
            .iter()
            .all(|(key, value)| subject.states.get(key) == Some(value));
        if covered {
            MatchQuality::SameItem
        } else {
            MatchQuality::SameMaterial
        }
    }

    /// Whether a material can be placed as a block.
    fn is_block(&self, material: Material) -> bool {
        self.material_info(material).map_or(false, |info| info.block)
    }
}

/// Enchantment entry of a platform table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnchantmentInfo {
    pub id: String,
    /// Extra user-facing names. The id key with spaces is always accepted.
    #[serde(default)]
    pub names: Vec<String>,
}

/// Table-driven [`Platform`] implementation.
///
/// Material order in the table defines [`Material`] values.
///
/// ```json
/// {
///   "version": "1.20.4",
///   "materials": [{ "id": "minecraft:stone", "block": true }],
///   "enchantments": [{ "id": "minecraft:sharpness" }]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "PlatformTable", into = "PlatformTable")]
pub struct PlatformData {
    version: Version,
    legacy_data_values: bool,
    materials: Vec<MaterialInfo>,
    enchantments: Vec<EnchantmentInfo>,
    material_ids: HashMap<String, Material>,
    enchantment_names: HashMap<String, Enchantment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PlatformTable {
    version: Version,
    #[serde(default)]
    legacy_data_values: bool,
    #[serde(default)]
    materials: Vec<MaterialInfo>,
    #[serde(default)]
    enchantments: Vec<EnchantmentInfo>,
}

impl From<PlatformTable> for PlatformData {
    fn from(table: PlatformTable) -> Self {
        let mut data = PlatformData::new(table.version);
        data.legacy_data_values = table.legacy_data_values;
        for info in table.materials {
            data.push_material(info);
        }
        for info in table.enchantments {
            data.push_enchantment(info);
        }
        data
    }
}

impl From<PlatformData> for PlatformTable {
    fn from(data: PlatformData) -> Self {
        Self {
            version: data.version,
            legacy_data_values: data.legacy_data_values,
            materials: data.materials,
            enchantments: data.enchantments,
        }
    }
}

impl PlatformData {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            legacy_data_values: false,
            materials: Vec::new(),
            enchantments: Vec::new(),
            material_ids: HashMap::new(),
            enchantment_names: HashMap::new(),
        }
    }

    /// Load a platform table from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_material(mut self, info: MaterialInfo) -> Self {
        self.push_material(info);
        self
    }

    /// Add an enchantment, reachable by its id, its key with spaces, and
    /// `names`.
    pub fn with_enchantment(mut self, id: &str, names: &[&str]) -> Self {
        self.push_enchantment(EnchantmentInfo {
            id: namespaced(id),
            names: names.iter().map(|n| n.to_string()).collect(),
        });
        self
    }

    pub fn with_legacy_data_values(mut self, legacy: bool) -> Self {
        self.legacy_data_values = legacy;
        self
    }

    fn push_material(&mut self, mut info: MaterialInfo) {
        info.id = namespaced(&info.id);
        if self.material_ids.contains_key(&info.id) {
            log::warn!("Duplicate material '{}' in platform table", info.id);
            return;
        }
        let material = Material(self.materials.len() as u32);
        self.material_ids.insert(info.id.clone(), material);
        self.materials.push(info);
    }

    fn push_enchantment(&mut self, mut info: EnchantmentInfo) {
        info.id = namespaced(&info.id);
        let enchantment = Enchantment::new(&info.id);
        let key = info.id.split_once(':').map(|(_, k)| k).unwrap_or(&info.id);
        self.enchantment_names
            .insert(info.id.clone(), enchantment.clone());
        self.enchantment_names
            .insert(key.replace('_', " "), enchantment.clone());
        for name in &info.names {
            self.enchantment_names
                .insert(name.to_lowercase(), enchantment.clone());
        }
        self.enchantments.push(info);
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}

impl Platform for PlatformData {
    fn material(&self, id: &str) -> Option<Material> {
        self.material_ids.get(&namespaced(&id.to_lowercase())).copied()
    }

    fn material_info(&self, material: Material) -> Option<&MaterialInfo> {
        self.materials.get(material.ordinal())
    }

    fn materials(&self) -> Box<dyn Iterator<Item = Material> + '_> {
        Box::new((0..self.materials.len() as u32).map(Material))
    }

    fn enchantment(&self, name: &str) -> Option<Enchantment> {
        let name = name.trim().to_lowercase();
        self.enchantment_names
            .get(&name)
            .or_else(|| self.enchantment_names.get(&namespaced(&name.replace(' ', "_"))))
            .cloned()
    }

    fn version(&self) -> &Version {
        &self.version
    }

    fn legacy_data_values(&self) -> bool {
        self.legacy_data_values
    }
}
