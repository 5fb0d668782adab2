//! Error types produced while formatting and loading translations.
//!
//! Catalog absence, missing contextual entries and an unknown system locale
//! are recovered where they occur and never reach these types. Only malformed
//! substitution arguments surface from [`crate::Message::translate`].

use camino::Utf8PathBuf;
use figment::Error as FigmentError;
use thiserror::Error;

/// Substitution failures raised when params do not fit a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FormatError {
    /// The template consumed more positional arguments than were supplied.
    #[error("not enough arguments for format string")]
    NotEnoughArguments,

    /// Positional arguments remained after every placeholder was filled.
    #[error("not all arguments converted during string formatting")]
    NotAllConverted,

    /// A named placeholder was used without a mapping of params.
    #[error("format requires a mapping")]
    MappingRequired,

    /// A positional placeholder was used while the params are a mapping.
    #[error("positional placeholder at offset {position} cannot be filled from a mapping")]
    PositionalWithMapping {
        /// Byte offset of the offending `%` in the template.
        position: usize,
    },

    /// A named placeholder referenced a key absent from the mapping.
    #[error("missing key '{key}' in format mapping")]
    MissingKey {
        /// Key requested by the template.
        key: String,
    },

    /// The template ended in the middle of a conversion specifier.
    #[error("incomplete format at offset {position}")]
    Incomplete {
        /// Byte offset of the `%` that started the specifier.
        position: usize,
    },

    /// A `%(` key was never closed.
    #[error("incomplete format key at offset {position}")]
    UnterminatedKey {
        /// Byte offset of the `%` that started the specifier.
        position: usize,
    },

    /// The conversion character is not understood.
    #[error("unsupported format character '{conversion}' at offset {position}")]
    UnsupportedConversion {
        /// Conversion character found in the template.
        conversion: char,
        /// Byte offset of the conversion character.
        position: usize,
    },

    /// A numeric conversion received a non-numeric value.
    #[error("%{conversion} format: a number is required, not {found}")]
    NumberRequired {
        /// Conversion character that required a number.
        conversion: char,
        /// Kind of value that was supplied.
        found: &'static str,
    },

    /// An integer-only conversion received a non-integer value.
    #[error("%{conversion} format: an integer is required, not {found}")]
    IntegerRequired {
        /// Conversion character that required an integer.
        conversion: char,
        /// Kind of value that was supplied.
        found: &'static str,
    },

    /// A field width exceeded [`crate::format::MAX_FIELD_SIZE`].
    #[error("width too big in format at offset {position}")]
    WidthTooBig {
        /// Byte offset of the `%` that started the specifier.
        position: usize,
    },

    /// A precision exceeded [`crate::format::MAX_FIELD_SIZE`].
    #[error("precision too big in format at offset {position}")]
    PrecisionTooBig {
        /// Byte offset of the `%` that started the specifier.
        position: usize,
    },

    /// `%c` received something other than a code point or a single character.
    #[error("%c requires an integer code point or a single character")]
    CharacterRequired,
}

/// Errors surfaced by operations that touch catalogs or configuration
/// directly rather than through the fallback-driven translation path.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum I18nError {
    /// A catalog file could not be read.
    #[error("failed to read message catalog '{path}': {source}")]
    CatalogRead {
        /// Path of the catalog file.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A catalog file was read but is not a valid MO catalog.
    #[error("failed to parse message catalog '{path}': {source}")]
    CatalogParse {
        /// Path of the catalog file.
        path: Utf8PathBuf,
        /// Parser failure reported by `gettext`.
        #[source]
        source: gettext::Error,
    },

    /// Per-domain settings in the environment could not be extracted.
    #[error("invalid translation settings for domain '{domain}': {source}")]
    Settings {
        /// Translation domain whose settings were requested.
        domain: String,
        /// Extraction failure reported by figment.
        #[source]
        source: Box<FigmentError>,
    },

    /// Params did not fit the translated template.
    #[error(transparent)]
    Format(#[from] FormatError),
}
