//! The alias service: the published global registry, its configuration and
//! the conditions alias files are evaluated against.
//!
//! Readers take a snapshot of the global registry and resolve against it;
//! loads build a new registry and swap it in. A reader holding a snapshot
//! keeps seeing it unchanged while a reload runs.

mod loader;
mod resolve;

pub use loader::AliasLoader;
pub use resolve::ResolutionContext;

use crate::error::Result;
use crate::parser::{Conditions, Diagnostics, Gender, SectionNode};
use crate::platform::Platform;
use crate::registry::AliasRegistry;
use crate::types::{CanonicalItem, EntityRef, ItemSelector};
use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where aliases are loaded from on [`Aliases::reload`].
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Load the bundled alias archive.
    pub load_default_aliases: bool,
    /// Give every material without an alias a name derived from its key.
    pub load_missing_aliases: bool,
    /// Directory of user alias files, loaded after the defaults.
    pub user_aliases_dir: Option<PathBuf>,
    /// Bundled alias archive (ZIP or directory).
    pub default_archive: Option<PathBuf>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            load_default_aliases: true,
            load_missing_aliases: true,
            user_aliases_dir: None,
            default_archive: None,
        }
    }
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_aliases(mut self, enabled: bool) -> Self {
        self.load_default_aliases = enabled;
        self
    }

    pub fn with_missing_aliases(mut self, enabled: bool) -> Self {
        self.load_missing_aliases = enabled;
        self
    }

    pub fn with_user_aliases_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_aliases_dir = Some(dir.into());
        self
    }

    pub fn with_default_archive(mut self, archive: impl Into<PathBuf>) -> Self {
        self.default_archive = Some(archive.into());
        self
    }
}

/// Global alias service.
pub struct Aliases {
    platform: Arc<dyn Platform>,
    global: ArcSwap<AliasRegistry>,
    conditions: Conditions,
    config: LoaderConfig,
}

impl Aliases {
    /// An empty service. The `minecraft version` condition checks against
    /// the platform's version.
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        let conditions = Conditions::with_version(platform.version().clone());
        Self {
            global: ArcSwap::from_pointee(AliasRegistry::new(platform.clone())),
            platform,
            conditions,
            config: LoaderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn platform(&self) -> &dyn Platform {
        &*self.platform
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// Register a section condition for subsequent loads.
    pub fn register_condition<F>(&mut self, keyword: impl Into<String>, condition: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.conditions.register(keyword, condition);
    }

    /// Current global registry.
    pub fn snapshot(&self) -> Arc<AliasRegistry> {
        self.global.load_full()
    }

    /// A fresh script-local registry over the current global snapshot.
    pub fn script_registry(&self) -> AliasRegistry {
        AliasRegistry::with_parent(self.snapshot())
    }

    /// Load alias text into a script-local registry.
    pub fn load_script_text(&self, registry: AliasRegistry, text: &str) -> (AliasRegistry, Diagnostics) {
        let mut loader = AliasLoader::new(registry, self.conditions.clone());
        loader.load_text(None, text);
        loader.finish()
    }

    /// Add to the global registry. The current registry is copied, extended
    /// and published; nothing is published when `load` fails.
    ///
    /// Publication is a compare-and-swap: when another load published first,
    /// `load` runs again over the newer registry.
    fn update<F>(&self, mut load: F) -> Result<Diagnostics>
    where
        F: FnMut(&mut AliasLoader) -> Result<()>,
    {
        loop {
            let current = self.global.load_full();
            let mut loader = AliasLoader::new(AliasRegistry::clone(&current), self.conditions.clone());
            load(&mut loader)?;
            let (registry, diagnostics) = loader.finish();

            let previous = self.global.compare_and_swap(&current, Arc::new(registry));
            if Arc::ptr_eq(&previous, &current) {
                return Ok(diagnostics);
            }
            log::debug!("Global aliases changed during load, retrying");
        }
    }

    pub fn load_alias_file<P: AsRef<Path>>(&self, path: P) -> Result<Diagnostics> {
        self.update(|loader| loader.load_file(path.as_ref()))
    }

    pub fn load_alias_directory<P: AsRef<Path>>(&self, dir: P) -> Result<Diagnostics> {
        self.update(|loader| loader.load_directory(dir.as_ref()))
    }

    pub fn load_alias_archive(&self, data: &[u8]) -> Result<Diagnostics> {
        self.update(|loader| loader.load_archive_bytes(data))
    }

    pub fn load_alias_section(&self, section: &SectionNode) -> Diagnostics {
        self.update(|loader| {
            loader.load_section(section);
            Ok(())
        })
        .unwrap_or_default()
    }

    pub fn load_alias_text(&self, text: &str) -> Diagnostics {
        self.update(|loader| {
            loader.load_text(None, text);
            Ok(())
        })
        .unwrap_or_default()
    }

    /// Drop every alias. Loads that finish after this start over from the
    /// empty registry.
    pub fn clear(&self) {
        self.global.store(Arc::new(AliasRegistry::new(self.platform.clone())));
    }

    /// Rebuild the global registry from the configured sources and publish
    /// it. On error the previous registry stays published.
    ///
    /// The rebuilt registry replaces the published one wholesale, including
    /// aliases added by loads since the last reload.
    pub fn reload(&self) -> Result<Diagnostics> {
        let mut loader = AliasLoader::new(AliasRegistry::new(self.platform.clone()), self.conditions.clone());

        if self.config.load_default_aliases {
            if let Some(archive) = self.config.default_archive.as_deref().filter(|p| p.exists()) {
                loader.load_archive(archive)?;
            }
            if self.config.load_missing_aliases {
                loader.load_missing_aliases();
            }
        }
        if let Some(dir) = self.config.user_aliases_dir.as_deref().filter(|p| p.exists()) {
            loader.load_directory(dir)?;
        }

        let (registry, diagnostics) = loader.finish();
        log::info!(
            "Loaded {} aliases ({} errors, {} warnings)",
            registry.alias_count(),
            diagnostics.errors().count(),
            diagnostics.warnings().count()
        );
        self.global.store(Arc::new(registry));
        Ok(diagnostics)
    }

    /// Resolve a name against the global registry.
    pub fn resolve_name(&self, text: &str) -> Option<ItemSelector> {
        let global = self.snapshot();
        ResolutionContext::new(&global).resolve_name(text)
    }

    pub fn material_name(&self, item: &CanonicalItem, plural: bool) -> String {
        let global = self.snapshot();
        ResolutionContext::new(&global).material_name(item, plural)
    }

    pub fn gender(&self, item: &CanonicalItem) -> Gender {
        let global = self.snapshot();
        ResolutionContext::new(&global).gender(item)
    }

    pub fn minecraft_id(&self, item: &CanonicalItem) -> Option<String> {
        let global = self.snapshot();
        let id = ResolutionContext::new(&global).minecraft_id(item);
        id.map(str::to_string)
    }

    pub fn related_entity(&self, item: &CanonicalItem) -> Option<EntityRef> {
        let global = self.snapshot();
        let entity = ResolutionContext::new(&global).related_entity(item);
        entity.cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformData;
    use crate::types::{ItemStack, MaterialInfo, Version};

    fn aliases() -> Aliases {
        let platform = PlatformData::new(Version::new(1, 20, 4))
            .with_material(MaterialInfo::new("stone").block())
            .with_material(MaterialInfo::new("oak_boat"));
        Aliases::new(Arc::new(platform))
    }

    #[test]
    fn test_load_text_publishes() {
        let aliases = aliases();
        let before = aliases.snapshot();

        let diagnostics = aliases.load_alias_text("blocks:\n    stone¦s = minecraft:stone\n");
        assert!(diagnostics.is_empty());
        assert!(aliases.resolve_name("stones").is_some());
        // Old snapshots are not affected.
        assert!(before.lookup("stone").is_none());

        aliases.load_alias_text("boats:\n    boat = minecraft:oak_boat\n");
        assert!(aliases.resolve_name("stone").is_some());
        assert!(aliases.resolve_name("boat").is_some());

        aliases.clear();
        assert!(aliases.resolve_name("stone").is_none());
    }

    #[test]
    fn test_registered_condition() {
        let mut aliases = aliases();
        aliases.register_condition("feature", |value| value == "on");
        aliases.load_alias_text("a:\n    feature = off\n    stone = minecraft:stone\nb:\n    feature = on\n    boat = minecraft:oak_boat\n");
        assert!(aliases.resolve_name("stone").is_none());
        assert!(aliases.resolve_name("boat").is_some());
    }

    #[test]
    fn test_reload_from_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("user.sk"), "user:\n    rock¦s = stone\n").unwrap();

        let aliases = aliases().with_config(
            LoaderConfig::new()
                .with_default_aliases(true)
                .with_missing_aliases(true)
                .with_user_aliases_dir(dir.path()),
        );
        let diagnostics = aliases.reload().unwrap();
        assert!(diagnostics.is_empty());
        assert!(aliases.resolve_name("rocks").is_some());
        assert!(aliases.resolve_name("oak boat").is_some());

        let stone = aliases.platform().material("stone").unwrap();
        let held = CanonicalItem::from_stack(&ItemStack::new(stone), aliases.platform().material_info(stone).unwrap());
        assert_eq!(aliases.material_name(&held, false), "stone");
        assert_eq!(aliases.minecraft_id(&held).as_deref(), Some("minecraft:stone"));
    }

    #[test]
    fn test_concurrent_loads_keep_every_alias() {
        let aliases = aliases();
        std::thread::scope(|scope| {
            for thread in 0..8 {
                let aliases = &aliases;
                scope.spawn(move || {
                    for n in 0..25 {
                        let text = format!("s:\n    name{}x{} = minecraft:stone\n", thread, n);
                        assert!(aliases.load_alias_text(&text).is_empty());
                    }
                });
            }
        });

        for thread in 0..8 {
            for n in 0..25 {
                let name = format!("name{}x{}", thread, n);
                assert!(aliases.resolve_name(&name).is_some(), "lost {}", name);
            }
        }
        assert_eq!(aliases.snapshot().alias_count(), 200);
    }

    #[test]
    fn test_script_registry() {
        let aliases = aliases();
        aliases.load_alias_text("blocks:\n    stone = minecraft:stone\n");

        let (local, diagnostics) = aliases.load_script_text(aliases.script_registry(), "local:\n    pebble = stone\n");
        assert!(diagnostics.is_empty());
        let global = aliases.snapshot();
        let ctx = ResolutionContext::new(&global).with_script(&local);
        assert!(ctx.resolve_name("pebble").is_some());
        assert!(aliases.resolve_name("pebble").is_none());
    }
}
