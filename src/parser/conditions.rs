//! Section conditions.
//!
//! An entry whose key is a registered condition is not an alias: its value
//! is passed to the condition, and when that returns `false` the rest of the
//! section is skipped.

use crate::types::Version;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Predicate over the condition entry's value.
pub type Condition = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Key of the built-in version condition.
pub const MINECRAFT_VERSION: &str = "minecraft version";

/// Registered conditions by keyword.
#[derive(Clone, Default)]
pub struct Conditions {
    conditions: HashMap<String, Condition>,
}

impl fmt::Debug for Conditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.conditions.keys().collect();
        keys.sort();
        f.debug_struct("Conditions").field("keys", &keys).finish()
    }
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conditions with `minecraft version` checking against `current`.
    pub fn with_version(current: Version) -> Self {
        let mut conditions = Self::new();
        conditions.register(MINECRAFT_VERSION, move |value| {
            match version_matches(&current, value) {
                Ok(matches) => matches,
                Err(e) => {
                    log::warn!("Invalid {} condition '{}': {}", MINECRAFT_VERSION, value, e);
                    false
                }
            }
        });
        conditions
    }

    pub fn register<F>(&mut self, keyword: impl Into<String>, condition: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.conditions.insert(keyword.into(), Arc::new(condition));
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.conditions.contains_key(keyword)
    }

    /// Evaluate a condition. `None` if `keyword` is not a condition.
    pub fn check(&self, keyword: &str, value: &str) -> Option<bool> {
        self.conditions.get(keyword).map(|condition| condition(value))
    }
}

/// Check `current` against `X or newer`, `X or older`, `A to B` or an exact
/// version.
pub fn version_matches(current: &Version, spec: &str) -> Result<bool, String> {
    let spec = spec.trim();
    if let Some(version) = spec.strip_suffix("or newer") {
        let version: Version = version.parse()?;
        return Ok(*current >= version);
    }
    if let Some(version) = spec.strip_suffix("or older") {
        let version: Version = version.parse()?;
        return Ok(*current <= version);
    }
    if let Some((from, to)) = spec.split_once(" to ") {
        let from: Version = from.parse()?;
        let to: Version = to.parse()?;
        return Ok(*current >= from && *current <= to);
    }
    let version: Version = spec.parse()?;
    Ok(*current == version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_matches() {
        let current = Version::new(1, 16, 5);
        assert_eq!(version_matches(&current, "1.13 or newer"), Ok(true));
        assert_eq!(version_matches(&current, "1.17 or newer"), Ok(false));
        assert_eq!(version_matches(&current, "1.12.2 or older"), Ok(false));
        assert_eq!(version_matches(&current, "1.16 to 1.16.5"), Ok(true));
        assert_eq!(version_matches(&current, "1.9 to 1.12"), Ok(false));
        assert_eq!(version_matches(&current, "1.16.5"), Ok(true));
        assert!(version_matches(&current, "newest").is_err());
    }

    #[test]
    fn test_check() {
        let mut conditions = Conditions::with_version(Version::new(1, 20, 4));
        conditions.register("feature", |value| value == "on");

        assert_eq!(conditions.check(MINECRAFT_VERSION, "1.13 or newer"), Some(true));
        assert_eq!(conditions.check(MINECRAFT_VERSION, "garbage"), Some(false));
        assert_eq!(conditions.check("feature", "off"), Some(false));
        assert_eq!(conditions.check("oak boat", "minecraft:oak_boat"), None);
    }
}
