//! Domain types for the locale detector.
//!
//! # Module Organization
//!
//! - [`value`] - The recursive value tree produced by parsers
//! - [`record`] - Per-file indexed state
//! - [`module`] - Virtual module identifiers
//!
//! All public types are re-exported here and at the crate root.

mod module;
mod record;
mod value;

pub use module::{ModuleId, VIRTUAL_MODULE_PREFIX};
pub use record::FileRecord;
pub use value::{Mapping, Number, Value};
