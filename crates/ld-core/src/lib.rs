//! Core types, errors, and configuration for the locale detector.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - [`Config`] and its sections, loaded from JSON and overridden by the CLI
//! - [`ConfigError`] for configuration failures
//! - [`Value`], the recursive value tree every parser produces
//! - [`FileRecord`], the per-file unit of indexed state
//! - [`ModuleId`], the synthetic identifier minted for each locale

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    normalize_path, Config, DetectorConfig, MergePolicy, ParserAlias, ParserFormat, WatchConfig,
    DEFAULT_LOCALES_PATH, DEFAULT_PATH_MATCHER,
};
pub use error::ConfigError;
pub use types::{FileRecord, Mapping, ModuleId, Number, Value, VIRTUAL_MODULE_PREFIX};
