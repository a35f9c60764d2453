//! Alias file parsing.
//!
//! [`AliasParser`] walks parsed sections and feeds a registry:
//!
//! - nested `{group}:` sections become variation groups
//! - entries whose key is a registered condition gate the rest of the section
//! - every other entry is an alias: `name pattern = item, item, ...`
//!
//! Problems never abort a load. They are collected into [`Diagnostics`] with
//! the line they came from and logged as they are found.

mod conditions;
mod names;
mod pattern;
mod source;
mod tags;
mod variation;

pub use conditions::{version_matches, Condition, Conditions, MINECRAFT_VERSION};
pub use names::{alias_plural, fix_name, strip_gender, Gender, PLURAL_MARKER};
pub use pattern::{expand_pattern, Expansion, PatternExpander};
pub use source::{parse_source, EntryNode, Node, SectionNode};
pub use tags::{parse_block_states, parse_tags, split_outside_groups};
pub use variation::{expand_variations, Variation, VariationGroup, VariationSource, DEFAULT_KEY};

use crate::error::ParseError;
use crate::registry::{AliasName, AliasRegistry};
use serde::Serialize;
use std::fmt;

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    fn of(error: &ParseError) -> Severity {
        match error {
            ParseError::UselessVariation(_) | ParseError::EmptyAlias(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// One problem found while loading aliases.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// File or archive entry the problem came from, if known.
    pub source: Option<String>,
    /// 1-based line number, if known.
    pub line: Option<usize>,
    pub error: ParseError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.source, self.line) {
            (Some(source), Some(line)) => write!(f, "{}:{}: {}", source, line, self.error),
            (Some(source), None) => write!(f, "{}: {}", source, self.error),
            (None, Some(line)) => write!(f, "line {}: {}", line, self.error),
            (None, None) => write!(f, "{}", self.error),
        }
    }
}

/// Collected diagnostics of a load.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem and log it.
    pub fn report(&mut self, source: Option<&str>, line: Option<usize>, error: ParseError) {
        let diagnostic = Diagnostic {
            severity: Severity::of(&error),
            source: source.map(str::to_string),
            line,
            error,
        };
        match diagnostic.severity {
            Severity::Warning => log::warn!("{}", diagnostic),
            Severity::Error => log::error!("{}", diagnostic),
        }
        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append diagnostics without logging them again.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Loads alias sections into a registry.
pub struct AliasParser<'a> {
    registry: &'a mut AliasRegistry,
    conditions: &'a Conditions,
    expander: PatternExpander,
    diagnostics: Diagnostics,
    source: Option<String>,
}

impl<'a> AliasParser<'a> {
    pub fn new(registry: &'a mut AliasRegistry, conditions: &'a Conditions) -> Self {
        Self {
            registry,
            conditions,
            expander: PatternExpander::new(),
            diagnostics: Diagnostics::new(),
            source: None,
        }
    }

    /// Name diagnostics after `source` from now on.
    pub fn set_source(&mut self, source: Option<String>) {
        self.source = source;
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    fn report(&mut self, line: usize, error: ParseError) {
        let line = (line > 0).then_some(line);
        self.diagnostics.report(self.source.as_deref(), line, error);
    }

    /// Parse a whole alias file. Entries outside of any section are
    /// rejected.
    pub fn load_text(&mut self, text: &str) {
        let (root, errors) = parse_source(text);
        for (line, error) in errors {
            self.report(line, error);
        }
        for node in &root.children {
            match node {
                Node::Section(section) => self.load_section(section),
                Node::Entry(entry) => self.report(entry.line, ParseError::OutsideSection),
            }
        }
    }

    /// Load one section of aliases.
    pub fn load_section(&mut self, section: &SectionNode) {
        for node in &section.children {
            match node {
                Node::Section(child) => {
                    if is_braced(&child.key) {
                        let group = self.load_variations(child);
                        self.registry.add_variation_group(child.key.clone(), group);
                    } else {
                        self.report(child.line, ParseError::InvalidVariationSection(child.key.clone()));
                    }
                }
                Node::Entry(entry) => match self.conditions.check(&entry.key, &entry.value) {
                    Some(true) => {}
                    Some(false) => {
                        log::debug!(
                            "Skipping rest of section '{}': {} = {} does not hold",
                            section.key,
                            entry.key,
                            entry.value
                        );
                        return;
                    }
                    None => self.load_alias(&entry.key, &entry.value, entry.line),
                },
            }
        }
    }

    /// Build a variation group from a `{group}:` section.
    pub fn load_variations(&mut self, section: &SectionNode) -> VariationGroup {
        let mut group = VariationGroup::new();
        for node in &section.children {
            let entry = match node {
                Node::Entry(entry) => entry,
                Node::Section(child) => {
                    self.report(child.line, ParseError::UnexpectedSection);
                    continue;
                }
            };

            let variation = match Variation::parse(&entry.value) {
                Ok(variation) => variation,
                Err(e) => {
                    self.report(entry.line, e);
                    continue;
                }
            };
            if entry.key != DEFAULT_KEY && variation.is_useless() {
                self.report(entry.line, ParseError::UselessVariation(entry.key.clone()));
            }

            let expansion = self.expander.expand(&entry.key);
            for error in expansion.errors {
                self.report(entry.line, error);
            }
            for key in expansion.names {
                let key = if key == DEFAULT_KEY { key } else { fix_name(&key) };
                group.push(&key, variation.clone());
            }
        }
        group
    }

    /// Register every name `name` expands to with every item of `data`.
    pub fn load_alias(&mut self, name: &str, data: &str, line: usize) {
        if name.trim().is_empty() {
            self.report(line, ParseError::EmptyName);
            return;
        }

        let mut items = Vec::new();
        for raw in split_outside_groups(data, ',') {
            if raw.is_empty() {
                continue;
            }
            match Variation::parse(raw) {
                Ok(item) => items.push(item),
                Err(e) => self.report(line, e),
            }
        }

        let expansion = self.expander.expand(name);
        for error in expansion.errors {
            self.report(line, error);
        }

        for pattern in &expansion.names {
            let mut errors = Vec::new();
            let variations = expand_variations(pattern, &*self.registry, &mut errors);
            for error in errors {
                self.report(line, error);
            }

            for (expanded, variation) in &variations {
                let alias_name = match self.alias_name(expanded, line) {
                    Some(alias_name) => alias_name,
                    None => continue,
                };
                if items.is_empty() {
                    self.report(line, ParseError::EmptyAlias(alias_name.singular.clone()));
                    continue;
                }

                for item in &items {
                    let merged = item.merge(variation);
                    let id = match merged.id {
                        Some(id) => id.to_lowercase(),
                        None => {
                            self.report(line, ParseError::EmptyAlias(alias_name.singular.clone()));
                            continue;
                        }
                    };
                    if let Err(e) = self.registry.add_alias(&alias_name, &id, merged.tags, merged.states) {
                        self.report(line, e);
                    }
                }
            }
        }
    }

    fn alias_name(&mut self, expanded: &str, line: usize) -> Option<AliasName> {
        let (name, token) = strip_gender(expanded);
        let gender = match token.map(Gender::from_token) {
            None => Gender::Unspecified,
            Some(Ok(gender)) => gender,
            Some(Err(e)) => {
                self.report(line, e);
                Gender::Unspecified
            }
        };

        let (singular, plural) = alias_plural(&name);
        if singular.is_empty() {
            self.report(line, ParseError::EmptyName);
            return None;
        }
        Some(AliasName::new(singular, plural, gender))
    }
}

fn is_braced(key: &str) -> bool {
    key.len() > 2 && key.starts_with('{') && key.ends_with('}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Platform, PlatformData};
    use crate::types::{MaterialInfo, Version};
    use std::sync::Arc;

    fn registry() -> AliasRegistry {
        let platform = PlatformData::new(Version::new(1, 20, 4))
            .with_material(MaterialInfo::new("oak_boat"))
            .with_material(MaterialInfo::new("spruce_boat"))
            .with_material(MaterialInfo::new("oak_chest_boat"))
            .with_material(MaterialInfo::new("stone").block())
            .with_material(MaterialInfo::new("mossy_cobblestone").block())
            .with_material(MaterialInfo::new("cobblestone").block())
            .with_material(MaterialInfo::new("apple"))
            .with_material(MaterialInfo::new("shears").with_durability(238));
        AliasRegistry::new(Arc::new(platform))
    }

    fn load(registry: &mut AliasRegistry, conditions: &Conditions, text: &str) -> Diagnostics {
        let mut parser = AliasParser::new(registry, conditions);
        parser.load_text(text);
        parser.into_diagnostics()
    }

    #[test]
    fn test_variation_aliases() {
        let mut registry = registry();
        let diagnostics = load(
            &mut registry,
            &Conditions::new(),
            "\
boats:
    {boat wood}:
        oak = minecraft:oak_-
        spruce = minecraft:spruce_-
    {boat wood} boat¦s = -boat
",
        );
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert!(registry.lookup("oak boat").is_some());
        assert!(registry.lookup("spruce boats").is_some());
        assert!(registry.lookup("boat").is_none());

        let spruce = registry.platform().material("spruce_boat").unwrap();
        assert_eq!(registry.lookup("spruce boat").unwrap().types()[0].material(), spruce);
    }

    #[test]
    fn test_default_variation() {
        let mut registry = registry();
        let diagnostics = load(
            &mut registry,
            &Conditions::new(),
            "\
blocks:
    {mossy}:
        {default} = minecraft:-
        mossy = minecraft:mossy_-
    {mossy} cobblestone = -cobblestone
",
        );
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        let mossy = registry.platform().material("mossy_cobblestone").unwrap();
        assert_eq!(registry.lookup("mossy cobblestone").unwrap().types()[0].material(), mossy);
        assert!(registry.lookup("cobblestone").is_some());
    }

    #[test]
    fn test_gender_and_plural() {
        let mut registry = registry();
        load(
            &mut registry,
            &Conditions::new(),
            "items:\n    apple¦s @an = minecraft:apple\n    pair¦s of shears @a = minecraft:shears\n",
        );

        let apple = &registry.alias_items("apples").unwrap()[0];
        let name = registry.material_name(apple).unwrap();
        assert_eq!(name.singular, "apple");
        assert_eq!(name.plural, "apples");
        assert_eq!(name.gender, Gender::An);
        assert!(registry.lookup("pairs of shears").is_some());
    }

    #[test]
    fn test_condition_skips_rest_of_section() {
        let mut registry = registry();
        let conditions = Conditions::with_version(Version::new(1, 8, 8));
        load(
            &mut registry,
            &conditions,
            "\
early:
    stone = minecraft:stone
    minecraft version = 1.9 or newer
    oak boat = minecraft:oak_boat
late:
    apple = minecraft:apple
",
        );
        assert!(registry.lookup("stone").is_some());
        assert!(registry.lookup("oak boat").is_none());
        assert!(registry.lookup("apple").is_some());
    }

    #[test]
    fn test_errors_are_collected() {
        let mut registry = registry();
        let diagnostics = load(
            &mut registry,
            &Conditions::new(),
            "\
top = minecraft:stone
s:
    bad = minecraft:nope
    (broken = minecraft:stone
    {missing} thing = minecraft:stone
    nothing = -
    wood:
        oak = oak
    apple = minecraft:apple
",
        );

        let errors: Vec<&ParseError> = diagnostics.errors().map(|d| &d.error).collect();
        assert!(errors.contains(&&ParseError::OutsideSection));
        assert!(errors.contains(&&ParseError::InvalidMinecraftId("minecraft:nope".to_string())));
        assert!(errors.contains(&&ParseError::NotEnoughBrackets { offset: 0, bracket: '(' }));
        assert!(errors.contains(&&ParseError::UnknownVariation("{missing}".to_string())));
        assert!(errors.contains(&&ParseError::InvalidVariationSection("wood".to_string())));

        let warnings: Vec<&ParseError> = diagnostics.warnings().map(|d| &d.error).collect();
        assert_eq!(warnings, vec![&ParseError::EmptyAlias("nothing".to_string())]);

        // Errors skip only the offending entry.
        assert!(registry.lookup("apple").is_some());
        assert!(registry.lookup("thing").is_some());
        assert_eq!(diagnostics.iter().next().unwrap().line, Some(1));
    }

    #[test]
    fn test_useless_variation_warning() {
        let mut registry = registry();
        let diagnostics = load(
            &mut registry,
            &Conditions::new(),
            "s:\n    {g}:\n        {default} = -\n        plain = -\n",
        );
        let warnings: Vec<&ParseError> = diagnostics.warnings().map(|d| &d.error).collect();
        assert_eq!(warnings, vec![&ParseError::UselessVariation("plain".to_string())]);
    }

    #[test]
    fn test_diagnostic_display() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(Some("boats.sk"), Some(3), ParseError::EmptyName);
        let text = diagnostics.iter().next().unwrap().to_string();
        assert_eq!(text, "boats.sk:3: alias name is empty");
    }
}
