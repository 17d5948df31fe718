//! Error types for the ld-parser crate.
//!
//! This module provides the [`ParseError`] type for failures while compiling
//! path patterns or decoding locale files.

use camino::Utf8PathBuf;

/// Errors that can occur while compiling patterns or loading locale files.
///
/// # Error Recovery Strategy
///
/// - **Pattern errors** ([`ParseError::InvalidPattern`]): Fatal - the detector
///   cannot be constructed
/// - **File errors** (read, decode, non-mapping document): Recoverable - the
///   file is dropped from the index and loading continues
///
/// # Examples
///
/// ```
/// use ld_parser::ParseError;
///
/// fn handle_error(err: ParseError) {
///     if err.is_recoverable() {
///         eprintln!("skipping file: {err}");
///     } else {
///         eprintln!("fatal: {err}");
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A path pattern or extension alternation did not compile.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern, after placeholder expansion.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: Box<regex::Error>,
    },

    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The file path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// The file path.
        path: Utf8PathBuf,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The file is not valid YAML.
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        /// The file path.
        path: Utf8PathBuf,
        /// The underlying decode error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The document decoded, but its top level is not a key/value mapping.
    #[error("{path} does not contain a key/value mapping (found {found})")]
    NotAMapping {
        /// The file path.
        path: Utf8PathBuf,
        /// What was found instead.
        found: &'static str,
    },

    /// A YAML mapping key is a list or mapping, which has no string form.
    #[error("{path} uses a {found} as a mapping key")]
    UnsupportedKey {
        /// The file path.
        path: Utf8PathBuf,
        /// The kind of key found.
        found: &'static str,
    },
}

impl ParseError {
    /// Creates a new [`ParseError::InvalidPattern`] error.
    #[inline]
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source: Box::new(source),
        }
    }

    /// Creates a new [`ParseError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ParseError::UnsupportedKey`] error.
    #[inline]
    pub fn unsupported_key(path: impl Into<Utf8PathBuf>, found: &'static str) -> Self {
        Self::UnsupportedKey {
            path: path.into(),
            found,
        }
    }

    /// Returns `true` if this error concerns a single file and loading can
    /// continue without it.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidPattern { .. })
    }

    /// Returns `true` if this error is fatal.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Read { path, .. }
            | Self::Json { path, .. }
            | Self::Yaml { path, .. }
            | Self::NotAMapping { path, .. }
            | Self::UnsupportedKey { path, .. } => Some(path),
            Self::InvalidPattern { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_read_error_is_recoverable() {
        let err = ParseError::read(
            "/app/locales/en.json",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.is_recoverable());
        assert!(!err.is_fatal());
        assert_eq!(err.path().map(|p| p.as_str()), Some("/app/locales/en.json"));
    }

    #[test]
    fn test_not_a_mapping_display() {
        let err = ParseError::NotAMapping {
            path: Utf8PathBuf::from("en.json"),
            found: "list",
        };
        assert_eq!(
            err.to_string(),
            "en.json does not contain a key/value mapping (found list)"
        );
    }

    #[test]
    fn test_invalid_pattern_is_fatal() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = ParseError::invalid_pattern("(", source);
        assert!(err.is_fatal());
        assert!(err.path().is_none());
    }
}
