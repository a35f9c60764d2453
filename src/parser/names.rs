//! English noun handling for alias names: whitespace normalization, gender
//! markers (`@a`, `@an`, `@x`, `@-`) and `¦` plural markers.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};

/// Plural marker. `oak boat¦s` is "oak boat" and "oak boats";
/// `pair¦s of shears` is "pair of shears" and "pairs of shears".
pub const PLURAL_MARKER: char = '¦';

/// Grammatical gender of an alias name, which picks its indefinite article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// No gender given; the article is guessed from the first letter.
    #[default]
    Unspecified,
    /// Takes "a".
    A,
    /// Takes "an".
    An,
    /// Only used in plural form, takes no indefinite article.
    Plural,
    /// Takes no article at all.
    Uncountable,
}

impl Gender {
    /// Parse the token after `@`.
    pub fn from_token(token: &str) -> Result<Gender, ParseError> {
        match token.trim() {
            "a" => Ok(Gender::A),
            "an" => Ok(Gender::An),
            "x" => Ok(Gender::Plural),
            "-" => Ok(Gender::Uncountable),
            other => Err(ParseError::UnknownGender(other.to_string())),
        }
    }

    /// Numeric id as used by hosts: -1 unset, -2 plural, -3 uncountable and
    /// article index otherwise.
    pub fn id(self) -> i32 {
        match self {
            Gender::Unspecified => -1,
            Gender::A => 0,
            Gender::An => 1,
            Gender::Plural => -2,
            Gender::Uncountable => -3,
        }
    }

    /// Indefinite article for `word`, if any.
    pub fn indefinite_article(self, word: &str) -> Option<&'static str> {
        match self {
            Gender::A => Some("a"),
            Gender::An => Some("an"),
            Gender::Plural | Gender::Uncountable => None,
            Gender::Unspecified => {
                let vowel = word
                    .chars()
                    .next()
                    .map_or(false, |c| "aeiouAEIOU".contains(c));
                Some(if vowel { "an" } else { "a" })
            }
        }
    }
}

/// Collapse runs of whitespace, trim the ends and remove whitespace in front
/// of the plural marker.
pub fn fix_name(name: &str) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace(" ¦", "¦")
}

/// Split a trailing `@token` gender marker off a name.
pub fn strip_gender(name: &str) -> (String, Option<&str>) {
    match name.rfind('@') {
        Some(at) => (name[..at].trim().to_string(), Some(name[at + 1..].trim())),
        None => (name.trim().to_string(), None),
    }
}

/// Singular and plural forms of a name with an optional plural marker.
pub fn alias_plural(name: &str) -> (String, String) {
    let marker = match name.find(PLURAL_MARKER) {
        Some(marker) => marker,
        None => {
            let trimmed = name.trim().to_string();
            return (trimmed.clone(), trimmed);
        }
    };
    let base = &name[..marker];
    let suffix_start = marker + PLURAL_MARKER.len_utf8();
    let plural_end = name[suffix_start..]
        .find(char::is_whitespace)
        .map(|i| suffix_start + i);

    match plural_end {
        None => {
            let singular = base.trim().to_string();
            let plural = format!("{}{}", base, &name[suffix_start..]).trim().to_string();
            (singular, plural)
        }
        Some(end) => {
            let singular = format!("{}{}", base, &name[end..]).trim().to_string();
            let plural = format!("{}{}", base, &name[suffix_start..]).trim().to_string();
            (singular, plural)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_name() {
        assert_eq!(fix_name("  oak   boat ¦s "), "oak boat¦s");
        assert_eq!(fix_name("stone"), "stone");
    }

    #[test]
    fn test_strip_gender() {
        assert_eq!(strip_gender("apple @an"), ("apple".to_string(), Some("an")));
        assert_eq!(strip_gender("shears @x"), ("shears".to_string(), Some("x")));
        assert_eq!(strip_gender("stone"), ("stone".to_string(), None));
    }

    #[test]
    fn test_gender_tokens() {
        assert_eq!(Gender::from_token("x"), Ok(Gender::Plural));
        assert_eq!(Gender::from_token("-"), Ok(Gender::Uncountable));
        assert_eq!(Gender::Plural.id(), -2);
        assert!(Gender::from_token("y").is_err());
    }

    #[test]
    fn test_indefinite_article() {
        assert_eq!(Gender::Unspecified.indefinite_article("apple"), Some("an"));
        assert_eq!(Gender::Unspecified.indefinite_article("boat"), Some("a"));
        assert_eq!(Gender::A.indefinite_article("unicorn"), Some("a"));
        assert_eq!(Gender::Plural.indefinite_article("shears"), None);
    }

    #[test]
    fn test_plural_suffix() {
        assert_eq!(
            alias_plural("oak boat¦s"),
            ("oak boat".to_string(), "oak boats".to_string())
        );
    }

    #[test]
    fn test_plural_in_middle() {
        assert_eq!(
            alias_plural("pair¦s of shears"),
            ("pair of shears".to_string(), "pairs of shears".to_string())
        );
    }

    #[test]
    fn test_no_marker() {
        assert_eq!(
            alias_plural("glass"),
            ("glass".to_string(), "glass".to_string())
        );
    }
}
