//! Ordered, immutable lookup from file extension to parser.
//!
//! The registry is assembled once at startup: the built-in parsers first, then
//! the configured extension aliases, then any parser registered through
//! [`ParserRegistry::with_parser`]. Lookups return the first parser that
//! accepts an extension.

use std::sync::Arc;

use ld_core::ParserAlias;
use tracing::debug;

use crate::error::ParseError;
use crate::parser::{FormatParser, Parser};

/// An ordered list of parsers, queried by extension.
///
/// # Examples
///
/// ```
/// use ld_parser::ParserRegistry;
///
/// let registry = ParserRegistry::builtin();
/// assert_eq!(registry.extensions(), "json|ya?ml");
/// assert_eq!(registry.find("yaml").map(|p| p.name()), Some("yaml"));
/// assert!(registry.find("toml").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ParserRegistry {
    parsers: Vec<Arc<dyn Parser>>,
}

impl ParserRegistry {
    /// Creates a registry holding only the built-in JSON and YAML parsers.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            parsers: vec![Arc::new(FormatParser::json()), Arc::new(FormatParser::yaml())],
        }
    }

    /// Creates a registry with no parsers, for callers that register their own.
    #[must_use]
    pub const fn empty() -> Self {
        Self { parsers: Vec::new() }
    }

    /// Creates a registry of the built-ins followed by `aliases`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidPattern`] if an alias' extension
    /// alternation does not compile.
    pub fn from_config(aliases: &[ParserAlias]) -> Result<Self, ParseError> {
        let mut registry = Self::builtin();
        for alias in aliases {
            debug!(extensions = %alias.extensions, format = ?alias.format, "Registering parser alias");
            registry = registry.with_parser(FormatParser::from_alias(alias)?);
        }
        Ok(registry)
    }

    /// Appends a parser. It is consulted after every parser already present.
    #[must_use]
    pub fn with_parser(mut self, parser: impl Parser + 'static) -> Self {
        self.parsers.push(Arc::new(parser));
        self
    }

    /// Returns the first parser that supports `ext` (leading dot optional).
    #[must_use]
    pub fn find(&self, ext: &str) -> Option<&Arc<dyn Parser>> {
        self.parsers.iter().find(|parser| parser.supports(ext))
    }

    /// Returns `true` if some parser supports `ext`.
    #[inline]
    #[must_use]
    pub fn supports(&self, ext: &str) -> bool {
        self.find(ext).is_some()
    }

    /// Returns the pipe-joined extension alternation of every parser.
    #[must_use]
    pub fn extensions(&self) -> String {
        self.parsers
            .iter()
            .map(|parser| parser.supported_exts())
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Returns the parsers in lookup order.
    #[inline]
    #[must_use]
    pub fn parsers(&self) -> &[Arc<dyn Parser>] {
        &self.parsers
    }

    /// Returns the number of registered parsers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// Returns `true` if no parser is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use camino::Utf8Path;
    use ld_core::{Mapping, ParserFormat, Value};

    #[derive(Debug)]
    struct StubParser {
        name: &'static str,
        exts: &'static str,
    }

    #[async_trait]
    impl Parser for StubParser {
        fn name(&self) -> &str {
            self.name
        }

        fn supported_exts(&self) -> &str {
            self.exts
        }

        fn supports(&self, ext: &str) -> bool {
            self.exts.split('|').any(|e| e == ext.trim_start_matches('.'))
        }

        async fn load(&self, _path: &Utf8Path) -> Result<Mapping, ParseError> {
            let mut map = Mapping::new();
            map.insert("from".to_owned(), Value::from(self.name));
            Ok(map)
        }
    }

    #[test]
    fn test_builtin_lookup() {
        let registry = ParserRegistry::builtin();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find("json").unwrap().name(), "json");
        assert_eq!(registry.find(".yml").unwrap().name(), "yaml");
        assert!(!registry.supports("ts"));
    }

    #[test]
    fn test_from_config_appends_aliases() {
        let registry = ParserRegistry::from_config(&[ParserAlias {
            extensions: "arb".to_owned(),
            format: ParserFormat::Json,
        }])
        .unwrap();

        assert_eq!(registry.extensions(), "json|ya?ml|arb");
        assert_eq!(registry.find("arb").unwrap().name(), "json");
    }

    #[test]
    fn test_from_config_rejects_bad_alias() {
        let result = ParserRegistry::from_config(&[ParserAlias {
            extensions: "[".to_owned(),
            format: ParserFormat::Yaml,
        }]);
        assert!(result.unwrap_err().is_fatal());
    }

    #[test]
    fn test_builtins_win_over_later_parsers() {
        let registry = ParserRegistry::builtin()
            .with_parser(StubParser { name: "shadow", exts: "json" })
            .with_parser(StubParser { name: "toml", exts: "toml" });

        assert_eq!(registry.find("json").unwrap().name(), "json");
        assert_eq!(registry.find("toml").unwrap().name(), "toml");
        assert_eq!(registry.extensions(), "json|ya?ml|json|toml");
    }

    #[tokio::test]
    async fn test_custom_parser_load() {
        let registry = ParserRegistry::builtin().with_parser(StubParser { name: "ini", exts: "ini" });
        let parser = registry.find("ini").unwrap();
        let map = parser.load(Utf8Path::new("/x/en.ini")).await.unwrap();
        assert_eq!(map["from"], Value::from("ini"));
    }
}
