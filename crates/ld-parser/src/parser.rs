//! The parser contract and the built-in format parsers.
//!
//! A [`Parser`] claims a set of file extensions and turns a file into a
//! [`Mapping`]. The registry only ever talks to parsers through this trait,
//! so callers can plug in formats the workspace does not ship.

use std::fmt;

use async_trait::async_trait;
use camino::Utf8Path;
use ld_core::{Mapping, Number, ParserAlias, ParserFormat, Value};
use regex::Regex;

use crate::error::ParseError;

/// A capability object that decodes locale files.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use camino::Utf8Path;
/// use ld_core::Mapping;
/// use ld_parser::{ParseError, Parser};
///
/// #[derive(Debug)]
/// struct EmptyParser;
///
/// #[async_trait]
/// impl Parser for EmptyParser {
///     fn name(&self) -> &str { "empty" }
///     fn supported_exts(&self) -> &str { "empty" }
///     fn supports(&self, ext: &str) -> bool { ext == "empty" }
///     async fn load(&self, _path: &Utf8Path) -> Result<Mapping, ParseError> {
///         Ok(Mapping::new())
///     }
/// }
/// ```
#[async_trait]
pub trait Parser: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Regex alternation of the extensions this parser claims, without dots
    /// (e.g. `ya?ml`). Fed into the `{ext}` placeholder of path patterns.
    fn supported_exts(&self) -> &str;

    /// Returns `true` if files with extension `ext` (no leading dot) are handled.
    fn supports(&self, ext: &str) -> bool;

    /// Reads and decodes the file at `path`.
    async fn load(&self, path: &Utf8Path) -> Result<Mapping, ParseError>;
}

/// A parser for one of the built-in [`ParserFormat`]s.
///
/// # Examples
///
/// ```
/// use ld_parser::{FormatParser, Parser};
///
/// let yaml = FormatParser::yaml();
/// assert!(yaml.supports("yml"));
/// assert!(yaml.supports(".yaml"));
/// assert!(!yaml.supports("json"));
/// ```
#[derive(Debug, Clone)]
pub struct FormatParser {
    format: ParserFormat,
    exts: String,
    ext_regex: Regex,
}

impl FormatParser {
    /// Creates a parser for `format` claiming the extension alternation `exts`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidPattern`] if `exts` is not a valid regex.
    pub fn new(format: ParserFormat, exts: &str) -> Result<Self, ParseError> {
        let anchored = format!("^(?:{exts})$");
        let ext_regex =
            Regex::new(&anchored).map_err(|e| ParseError::invalid_pattern(anchored.clone(), e))?;
        Ok(Self {
            format,
            exts: exts.to_owned(),
            ext_regex,
        })
    }

    /// The built-in JSON parser (`.json`).
    #[must_use]
    pub fn json() -> Self {
        Self::builtin(ParserFormat::Json, "json")
    }

    /// The built-in YAML parser (`.yml`, `.yaml`).
    #[must_use]
    pub fn yaml() -> Self {
        Self::builtin(ParserFormat::Yaml, "ya?ml")
    }

    /// Creates a parser from a configured extension alias.
    pub fn from_alias(alias: &ParserAlias) -> Result<Self, ParseError> {
        Self::new(alias.format, &alias.extensions)
    }

    fn builtin(format: ParserFormat, exts: &'static str) -> Self {
        Self {
            format,
            exts: exts.to_owned(),
            ext_regex: Regex::new(&format!("^(?:{exts})$"))
                .unwrap_or_else(|_| unreachable!("built-in extension pattern is valid")),
        }
    }

    /// Returns the format this parser decodes.
    #[inline]
    #[must_use]
    pub const fn format(&self) -> ParserFormat {
        self.format
    }

    /// Decodes `bytes` read from `path`.
    pub fn decode(&self, path: &Utf8Path, bytes: &[u8]) -> Result<Mapping, ParseError> {
        let value: Value = match self.format {
            ParserFormat::Json => {
                serde_json::from_slice(bytes).map_err(|source| ParseError::Json {
                    path: path.to_owned(),
                    source,
                })?
            }
            ParserFormat::Yaml if bytes.iter().all(u8::is_ascii_whitespace) => Value::Null,
            ParserFormat::Yaml => {
                let yaml: serde_yaml::Value =
                    serde_yaml::from_slice(bytes).map_err(|source| ParseError::Yaml {
                        path: path.to_owned(),
                        source,
                    })?;
                from_yaml(path, yaml)?
            }
        };

        match value {
            Value::Map(map) => Ok(map),
            // An empty YAML document is an empty translation file.
            Value::Null if self.format == ParserFormat::Yaml => Ok(Mapping::new()),
            other => Err(ParseError::NotAMapping {
                path: path.to_owned(),
                found: kind_name(&other),
            }),
        }
    }
}

#[async_trait]
impl Parser for FormatParser {
    fn name(&self) -> &str {
        match self.format {
            ParserFormat::Json => "json",
            ParserFormat::Yaml => "yaml",
        }
    }

    fn supported_exts(&self) -> &str {
        &self.exts
    }

    fn supports(&self, ext: &str) -> bool {
        self.ext_regex.is_match(ext.trim_start_matches('.'))
    }

    async fn load(&self, path: &Utf8Path) -> Result<Mapping, ParseError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ParseError::read(path, e))?;
        self.decode(path, &bytes)
    }
}

/// Converts a YAML tree, turning scalar mapping keys (`404`, `true`, `~`)
/// into their string form.
fn from_yaml(path: &Utf8Path, yaml: serde_yaml::Value) -> Result<Value, ParseError> {
    Ok(match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => yaml_number(&n),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::List(
            items
                .into_iter()
                .map(|item| from_yaml(path, item))
                .collect::<Result<_, _>>()?,
        ),
        serde_yaml::Value::Mapping(entries) => {
            let mut map = Mapping::with_capacity(entries.len());
            for (key, value) in entries {
                map.insert(yaml_key(path, key)?, from_yaml(path, value)?);
            }
            Value::Map(map)
        }
        serde_yaml::Value::Tagged(tagged) => from_yaml(path, tagged.value)?,
    })
}

fn yaml_key(path: &Utf8Path, key: serde_yaml::Value) -> Result<String, ParseError> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".to_owned()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(path, tagged.value),
        serde_yaml::Value::Sequence(_) => Err(ParseError::unsupported_key(path, "list")),
        serde_yaml::Value::Mapping(_) => Err(ParseError::unsupported_key(path, "mapping")),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        // NaN and infinities have no JSON number form.
        n.as_f64()
            .and_then(Number::from_f64)
            .map_or_else(|| Value::String(n.to_string()), Value::Number)
    }
}

const fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::List(_) => "list",
        Value::Map(_) => "mapping",
    }
}
