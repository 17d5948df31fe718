//! Virtual module identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag prefixed to every locale to form its module identifier.
pub const VIRTUAL_MODULE_PREFIX: &str = "virtual-locale";

/// Identifier of the synthetic module serving one locale.
///
/// The mapping is reversible: `virtual-locale-<locale>`.
///
/// # Examples
///
/// ```
/// use ld_core::ModuleId;
///
/// let id = ModuleId::for_locale("zh-tw");
/// assert_eq!(id.as_str(), "virtual-locale-zh-tw");
/// assert_eq!(id.locale(), Some("zh-tw"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    /// Mints the identifier for `locale`.
    #[must_use]
    pub fn for_locale(locale: &str) -> Self {
        Self(format!("{VIRTUAL_MODULE_PREFIX}-{locale}"))
    }

    /// Parses an identifier string, returning `None` unless it carries the
    /// virtual prefix and a non-empty locale.
    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        let locale = id.strip_prefix(VIRTUAL_MODULE_PREFIX)?.strip_prefix('-')?;
        (!locale.is_empty()).then(|| Self(id.to_owned()))
    }

    /// Returns the locale this identifier was minted from.
    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.0
            .strip_prefix(VIRTUAL_MODULE_PREFIX)
            .and_then(|rest| rest.strip_prefix('-'))
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
