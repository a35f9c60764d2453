//! Error types for alias loading and resolution.

use thiserror::Error;

/// Result type alias using AliasError.
pub type Result<T> = std::result::Result<T, AliasError>;

/// Fatal errors that abort loading of a whole alias source.
#[derive(Error, Debug)]
pub enum AliasError {
    /// Failed to read or parse a ZIP archive.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A material id the platform does not know.
    #[error("Unknown material: {0}")]
    UnknownMaterial(String),
}

/// Per-line grammar and domain errors.
///
/// These never abort a load; they are collected into
/// [`Diagnostics`](crate::parser::Diagnostics) and the offending name, slot or
/// item is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParseError {
    /// A closing bracket without a matching opener.
    #[error("too many closing brackets: '{bracket}' at offset {offset}")]
    TooManyBrackets { offset: usize, bracket: char },

    /// An opening bracket that is never closed.
    #[error("not enough closing brackets: '{bracket}' at offset {offset} is never closed")]
    NotEnoughBrackets { offset: usize, bracket: char },

    /// A `{group}` reference to a group that was never defined.
    #[error("unknown variation {0}")]
    UnknownVariation(String),

    /// An entry without a name.
    #[error("alias name is empty")]
    EmptyName,

    /// A block state segment without `=`.
    #[error("malformed block state '{0}', expected key=value")]
    MalformedState(String),

    /// A block state list without an id in front of it.
    #[error("missing id or '-' before block states in '{0}'")]
    MissingStateId(String),

    /// A tag block with nothing in front of it.
    #[error("missing id or '-' before tags in '{0}'")]
    MissingTagId(String),

    /// Tag block that is not a JSON object.
    #[error("invalid tags '{raw}': {reason}")]
    InvalidTags { raw: String, reason: String },

    /// Alias data naming an id the platform does not know.
    #[error("'{0}' is not a valid Minecraft id")]
    InvalidMinecraftId(String),

    /// Block states given for a material that is not a block.
    #[error("'{0}' is not a block, so it cannot have block states")]
    StatesOnItem(String),

    /// Variation section whose key is not wrapped in braces.
    #[error("'{0}' is not a valid variation section, its name must be wrapped in braces")]
    InvalidVariationSection(String),

    /// A section where an entry was expected.
    #[error("unexpected section")]
    UnexpectedSection,

    /// An entry at the top level of an alias file.
    #[error("aliases must be placed inside a section")]
    OutsideSection,

    /// A line of an alias file that is neither entry, section nor comment.
    #[error("cannot parse line '{0}'")]
    InvalidLine(String),

    /// Gender marker after `@` that is not recognized.
    #[error("unknown gender '{0}'")]
    UnknownGender(String),

    /// Variation that changes nothing. Reported as a warning.
    #[error("variation '{0}' has no id, tags or block states")]
    UselessVariation(String),

    /// Alias whose data resolves to no id. Reported as a warning.
    #[error("alias '{0}' is empty")]
    EmptyAlias(String),
}
