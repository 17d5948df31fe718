//! Error types for the ld-scanner crate.
//!
//! - [`ScanError`] for directory resolution and traversal
//! - [`DetectorError`] for everything that can stop the detector from
//!   starting
//! - [`ClientError`] for the lazy-load client

use camino::Utf8PathBuf;
use ld_core::ConfigError;
use ld_parser::ParseError;

/// Errors that can occur while resolving or walking locale directories.
///
/// # Error Recovery Strategy
///
/// - **Invalid glob** ([`ScanError::InvalidGlob`]): Recoverable - the pattern
///   is skipped with a warning
/// - **Non-UTF-8 path** ([`ScanError::NonUtf8Path`]): Recoverable - the entry
///   is skipped
/// - **Walk errors** ([`ScanError::Walk`]): Recoverable per entry; the rest
///   of the directory is still walked
/// - **Missing directory** ([`ScanError::MissingDirectory`]): Fatal for that
///   walk
///
/// # Examples
///
/// ```
/// use ld_scanner::ScanError;
/// use camino::Utf8PathBuf;
///
/// let err = ScanError::MissingDirectory(Utf8PathBuf::from("/app/locales"));
/// assert!(err.is_fatal());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Failed to walk a directory entry.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// A locale-path glob did not compile.
    #[error("invalid locale path glob '{pattern}': {source}")]
    InvalidGlob {
        /// The offending glob.
        pattern: String,
        /// The underlying glob error.
        #[source]
        source: globset::Error,
    },

    /// The directory to walk does not exist or is not a directory.
    #[error("not a directory: {0}")]
    MissingDirectory(Utf8PathBuf),

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

impl ScanError {
    /// Creates a new [`ScanError::InvalidGlob`] error.
    #[inline]
    pub fn invalid_glob(pattern: impl Into<String>, source: globset::Error) -> Self {
        Self::InvalidGlob {
            pattern: pattern.into(),
            source,
        }
    }

    /// Returns `true` if this error is recoverable (scanning can continue).
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::MissingDirectory(_))
    }

    /// Returns `true` if this error is fatal.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::MissingDirectory(path) => Some(path),
            Self::Walk(_) | Self::InvalidGlob { .. } | Self::NonUtf8Path(_) => None,
        }
    }
}

/// Errors that abort detector construction or initialization.
///
/// Per-file problems never surface here; they are logged and the file is
/// left out of the index.
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The path pattern or a parser alias did not compile.
    #[error(transparent)]
    Pattern(#[from] ParseError),

    /// Locale directories were found but not a single file could be indexed.
    #[error("no locale files detected in {dirs} locale directories; check locales_paths and path_matcher")]
    NoLocaleFiles {
        /// Number of locale directories that were loaded.
        dirs: usize,
    },

    /// A locale directory could not be walked.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl DetectorError {
    /// Returns `true` if this error is recoverable.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Scan(e) => e.is_recoverable(),
            Self::Config(_) | Self::Pattern(_) | Self::NoLocaleFiles { .. } => false,
        }
    }

    /// Returns `true` if this error is fatal.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }
}

/// Errors returned by the lazy-load client and its bundle sources.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No bundle exists for the requested locale (or namespace).
    #[error("no bundle for locale '{locale}'{}", .namespace.as_deref().map(|ns| format!(" namespace '{ns}'")).unwrap_or_default())]
    UnknownBundle {
        /// The requested locale.
        locale: String,
        /// The requested namespace, if any.
        namespace: Option<String>,
    },

    /// The bundle source is no longer available.
    #[error("bundle source closed")]
    SourceClosed,
}

impl ClientError {
    /// Creates a new [`ClientError::UnknownBundle`] error.
    #[inline]
    pub fn unknown_bundle(locale: impl Into<String>, namespace: Option<&str>) -> Self {
        Self::UnknownBundle {
            locale: locale.into(),
            namespace: namespace.map(ToOwned::to_owned),
        }
    }

    /// Returns `true` if the client can keep serving after this error.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnknownBundle { .. })
    }

    /// Returns `true` if this error is fatal.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_invalid_glob() {
        let source = globset::Glob::new("src/[locales").unwrap_err();
        let err = ScanError::invalid_glob("src/[locales", source);
        assert!(err.is_recoverable());
        assert!(err.path().is_none());
        assert!(err.to_string().contains("src/[locales"));
    }

    #[test]
    fn test_scan_error_missing_directory() {
        let err = ScanError::MissingDirectory(Utf8PathBuf::from("/gone"));
        assert!(err.is_fatal());
        assert_eq!(err.path().map(|p| p.as_str()), Some("/gone"));
    }

    #[test]
    fn test_no_locale_files_display() {
        assert_eq!(
            DetectorError::NoLocaleFiles { dirs: 2 }.to_string(),
            "no locale files detected in 2 locale directories; check locales_paths and path_matcher"
        );
        assert!(DetectorError::NoLocaleFiles { dirs: 2 }.is_fatal());
    }

    #[test]
    fn test_detector_error_from_config() {
        let err: DetectorError = ConfigError::invalid_option("path_matcher", "bad").into();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("path_matcher"));
    }

    #[test]
    fn test_client_error_display() {
        assert_eq!(
            ClientError::unknown_bundle("fr", None).to_string(),
            "no bundle for locale 'fr'"
        );
        assert_eq!(
            ClientError::unknown_bundle("fr", Some("common")).to_string(),
            "no bundle for locale 'fr' namespace 'common'"
        );
        assert!(ClientError::unknown_bundle("fr", None).is_recoverable());
        assert!(ClientError::SourceClosed.is_fatal());
    }
}
