//! Locale file discovery, indexing and incremental re-indexing.
//!
//! This crate is the core of the locale detector. It finds locale files
//! scattered across a project, parses them, folds them into a
//! `locale -> namespace -> value` resource tree and keeps that tree in sync
//! as files change.
//!
//! # Overview
//!
//! The main entry point is [`LocaleDetector`], which combines:
//!
//! - [`DirectoryResolver`]: expands locale-path globs into locale roots
//! - [`FileWalker`]: sorted traversal of one locale root
//! - [`FileLoader`]: path matching, parser selection and single-file loads
//! - [`FileIndex`]: the insertion-ordered per-file state
//! - [`ResourceTree`]: folds the index into [`LocaleModules`]
//!
//! On the consuming side, [`ResourceClient`] lazily fetches locale bundles
//! from any [`BundleSource`], such as a [`SnapshotSource`] fed by the
//! detector.
//!
//! # Example
//!
//! ```no_run
//! use ld_scanner::LocaleDetector;
//! use ld_core::Config;
//! use ld_watcher::{FileWatcher, LocaleFileFilter};
//! use camino::Utf8Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default().resolve(Utf8Path::new("/work/app"))?;
//! let mut detector = LocaleDetector::new(&config)?;
//! let stats = detector.init().await?;
//! println!("Loaded {} files", stats.loaded);
//!
//! let filter = LocaleFileFilter::new(&detector.extensions())?;
//! let mut watcher = FileWatcher::new(detector.locale_dirs(), &config.watch, filter).await?;
//! detector.run(watcher.events()).await;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! LocaleDetector (coordinator, single owner)
//!     │
//!     ├── DirectoryResolver (globset + ignore)
//!     │
//!     ├── FileLoader
//!     │       ├── FileWalker (ignore crate)
//!     │       ├── PathMatchers (ld-parser)
//!     │       └── ParserRegistry (ld-parser)
//!     │
//!     ├── FileIndex (IndexMap, insertion order)
//!     │
//!     └── ResourceTree ──► Arc<LocaleModules> ──► watch channel
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod client;
mod detector;
mod error;
mod index;
mod loader;
mod resolver;
mod stats;
mod tree;
mod walker;

pub use client::{BundleSource, ResourceClient, SnapshotSource, TranslationStore};
pub use detector::LocaleDetector;
pub use error::{ClientError, DetectorError, ScanError};
pub use index::{FileIndex, LoadOutcome};
pub use loader::FileLoader;
pub use resolver::DirectoryResolver;
pub use stats::LoadStats;
pub use tree::{LocaleModules, ResourceTree};
pub use walker::FileWalker;
