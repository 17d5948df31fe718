//! Per-file indexed state.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::value::Mapping;

/// One successfully parsed locale file.
///
/// A record only exists for files that matched the path pattern with a
/// non-empty locale, had a supported extension, and parsed without error.
///
/// # Examples
///
/// ```
/// use ld_core::{FileRecord, Mapping};
/// use camino::Utf8PathBuf;
///
/// let record = FileRecord {
///     path: Utf8PathBuf::from("/app/locales/en/more/extra.json"),
///     root: Utf8PathBuf::from("/app/locales"),
///     dir: Utf8PathBuf::from("/app/locales/en/more"),
///     locale: "en".to_owned(),
///     namespace: Some("more.extra".to_owned()),
///     matcher: "{locale}/{namespaces}.{ext}".to_owned(),
///     value: Mapping::new(),
/// };
///
/// assert_eq!(record.key_path().as_slice(), ["en", "more.extra"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path of the file. Unique within the index.
    pub path: Utf8PathBuf,

    /// The locale-root directory the file was discovered under.
    pub root: Utf8PathBuf,

    /// The directory directly containing the file.
    pub dir: Utf8PathBuf,

    /// Locale captured from the path. Never empty.
    pub locale: String,

    /// Dot-joined namespace captured from the path, if any.
    pub namespace: Option<String>,

    /// The path pattern that produced the match.
    pub matcher: String,

    /// Parsed file contents.
    pub value: Mapping,
}

impl FileRecord {
    /// Returns the resource-tree key path: `[locale]` or `[locale, namespace]`.
    #[must_use]
    pub fn key_path(&self) -> SmallVec<[&str; 2]> {
        let mut keys = SmallVec::new();
        keys.push(self.locale.as_str());
        if let Some(ns) = self.namespace.as_deref() {
            keys.push(ns);
        }
        keys
    }
}
