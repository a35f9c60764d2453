//! Alias loading from files, directories and ZIP archives.

use crate::error::Result;
use crate::parser::{AliasParser, Conditions, Diagnostics, SectionNode};
use crate::registry::AliasRegistry;
use std::io::Read;
use std::path::Path;

const ALIAS_EXTENSION: &str = "sk";

/// Feeds alias sources into a registry and collects their diagnostics.
pub struct AliasLoader {
    registry: AliasRegistry,
    conditions: Conditions,
    diagnostics: Diagnostics,
}

impl AliasLoader {
    pub fn new(registry: AliasRegistry, conditions: Conditions) -> Self {
        Self {
            registry,
            conditions,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn registry(&self) -> &AliasRegistry {
        &self.registry
    }

    /// Load alias text. `source` names the text in diagnostics.
    pub fn load_text(&mut self, source: Option<&str>, text: &str) {
        let mut parser = AliasParser::new(&mut self.registry, &self.conditions);
        parser.set_source(source.map(str::to_string));
        parser.load_text(text);
        self.diagnostics.extend(parser.into_diagnostics());
    }

    /// Load a single already parsed section.
    pub fn load_section(&mut self, section: &SectionNode) {
        let mut parser = AliasParser::new(&mut self.registry, &self.conditions);
        parser.load_section(section);
        self.diagnostics.extend(parser.into_diagnostics());
    }

    /// Load one alias file.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        log::debug!("Loading aliases from {}", path.display());
        self.load_text(Some(&path.display().to_string()), &text);
        Ok(())
    }

    /// Load every `.sk` file below `dir`, in sorted order. Hidden
    /// directories are skipped.
    pub fn load_directory<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let mut entries = std::fs::read_dir(dir.as_ref())?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for path in entries {
            if path.is_dir() {
                if !is_hidden(&path) {
                    self.load_directory(&path)?;
                }
            } else if path.extension().map_or(false, |ext| ext == ALIAS_EXTENSION) {
                self.load_file(&path)?;
            }
        }
        Ok(())
    }

    /// Load an alias archive from a file path. Directories are loaded like
    /// [`load_directory`](Self::load_directory).
    pub fn load_archive<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        if path.is_dir() {
            return self.load_directory(path);
        }
        let data = std::fs::read(path)?;
        self.load_archive_bytes(&data)
    }

    /// Load every `.sk` entry of a ZIP archive, in sorted order.
    pub fn load_archive_bytes(&mut self, data: &[u8]) -> Result<()> {
        let cursor = std::io::Cursor::new(data);
        let mut archive = zip::ZipArchive::new(cursor)?;

        let mut names: Vec<String> = archive
            .file_names()
            .filter(|name| name.ends_with(".sk") && !name.split('/').any(|part| part.starts_with('.')))
            .map(str::to_string)
            .collect();
        names.sort();

        for name in names {
            let mut file = archive.by_name(&name)?;
            let mut text = String::new();
            file.read_to_string(&mut text)?;
            log::debug!("Loading aliases from archive entry {}", name);
            self.load_text(Some(&name), &text);
        }
        Ok(())
    }

    /// Register `<key with spaces>¦s` for every material that no alias
    /// covers yet.
    pub fn load_missing_aliases(&mut self) {
        let platform = self.registry.platform_arc();
        let missing: Vec<String> = platform
            .materials()
            .filter(|material| !self.registry.has_material(*material))
            .filter_map(|material| platform.material_info(material))
            .map(|info| info.id.clone())
            .collect();

        let mut parser = AliasParser::new(&mut self.registry, &self.conditions);
        for id in missing {
            let key = id.split_once(':').map_or(id.as_str(), |(_, key)| key);
            let name = format!("{}¦s", key.replace('_', " "));
            log::debug!("Creating temporary alias for: {}", id);
            parser.load_alias(&name, &id, 0);
        }
        self.diagnostics.extend(parser.into_diagnostics());
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn finish(self) -> (AliasRegistry, Diagnostics) {
        (self.registry, self.diagnostics)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.starts_with('.'))
}
