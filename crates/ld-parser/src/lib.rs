//! Locale file parsing and path pattern matching.
//!
//! This crate provides the two leaf components of the locale detector:
//!
//! - [`PathMatcher`] / [`PathMatchers`] - compile a path pattern such as
//!   `{locale}/{namespaces}.{ext}` and extract `locale` and `namespace` from
//!   paths relative to a locale root
//! - [`Parser`] / [`ParserRegistry`] - an ordered, immutable list of parsers
//!   that turn locale files into [`ld_core::Mapping`]s
//!
//! # Overview
//!
//! The registry supplies the `{ext}` alternation to the matcher, so a path
//! only matches when some parser can load it:
//!
//! ```
//! use ld_parser::{PathMatcher, ParserRegistry};
//!
//! let registry = ParserRegistry::builtin();
//! let matcher = PathMatcher::compile("{locale}/{namespaces}.{ext}", &registry.extensions())?;
//!
//! let m = matcher.matches("zh/common.yml").unwrap();
//! assert_eq!(m.locale, "zh");
//! assert_eq!(m.namespace.as_deref(), Some("common"));
//! assert!(registry.find("yml").is_some());
//! # Ok::<(), ld_parser::ParseError>(())
//! ```
//!
//! # Built-in Formats
//!
//! | Parser | Extensions |
//! |--------|------------|
//! | JSON   | `json`     |
//! | YAML   | `yml`, `yaml` |
//!
//! Extra extensions can be routed to a built-in format through
//! [`ld_core::ParserAlias`], or a custom [`Parser`] can be appended with
//! [`ParserRegistry::with_parser`].

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod matcher;
pub mod parser;
pub mod registry;

pub use error::ParseError;
pub use matcher::{PathMatch, PathMatcher, PathMatchers};
pub use parser::{FormatParser, Parser};
pub use registry::ParserRegistry;
