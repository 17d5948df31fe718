//! Debounced locale-file watcher with async event streaming.
//!
//! This crate provides file change detection via the `notify` crate with
//! debouncing through `notify-debouncer-mini`, bridged to tokio so that the
//! locale detector can consume change notifications from an async loop.
//!
//! # Overview
//!
//! - One [`FileWatcher`] watches every resolved locale root
//! - Rapid changes (editor save sequences) are debounced
//! - [`LocaleFileFilter`] drops files no parser can load before they reach
//!   the channel
//! - Events are [`FileEvent`]s carrying an absolute UTF-8 path
//!
//! # Usage
//!
//! ```no_run
//! use ld_watcher::{FileWatcher, LocaleFileFilter};
//! use ld_core::WatchConfig;
//! use camino::Utf8PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dirs = vec![Utf8PathBuf::from("/app/src/locales")];
//!     let filter = LocaleFileFilter::new("json|ya?ml")?;
//!     let mut watcher = FileWatcher::new(&dirs, &WatchConfig::default(), filter).await?;
//!
//!     while let Some(event) = watcher.recv().await {
//!         println!("Locale file changed: {}", event.path);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Backpressure
//!
//! The event channel is bounded (100 events by default). Events that queue
//! up while the consumer is reloading are picked up together on its next
//! pass, which is how bursts collapse into a single rebuild.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod filter;
pub mod watcher;

pub use error::WatchError;
pub use events::{FileEvent, FileEventBatch};
pub use filter::{AcceptAllFilter, FileFilter, LocaleFileFilter, SKIP_DIRECTORIES};
pub use watcher::FileWatcher;
