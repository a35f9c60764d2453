//! Graded match quality between two items.

use std::fmt;

/// How well an item matches another.
///
/// Variants are ordered from best to worst, so `EXACT < SAME_ITEM <
/// SAME_MATERIAL < DIFFERENT` and a lower value is a better match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchQuality {
    /// Everything that is compared matches.
    Exact,
    /// Same item, but the subject carries data the pattern does not care about.
    SameItem,
    /// Only the material is shared.
    SameMaterial,
    /// Not the same material, or a required metadata kind is missing.
    Different,
}

impl MatchQuality {
    /// Whether this quality is strictly better than `other`.
    pub fn is_better(self, other: MatchQuality) -> bool {
        self < other
    }

    /// Whether this quality is `other` or better.
    pub fn is_at_least(self, other: MatchQuality) -> bool {
        self <= other
    }
}

impl fmt::Display for MatchQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchQuality::Exact => "exact",
            MatchQuality::SameItem => "same item",
            MatchQuality::SameMaterial => "same material",
            MatchQuality::Different => "different",
        };
        f.write_str(name)
    }
}
