//! The consuming side of the lazy-load protocol.
//!
//! A [`ResourceClient`] fetches one locale bundle at a time from a
//! [`BundleSource`], merges it into its [`TranslationStore`] and only then
//! switches the active locale. Missing keys fall back to the fallback locale.
//!
//! # Example
//!
//! ```no_run
//! use ld_scanner::{LocaleDetector, ResourceClient, SnapshotSource};
//! use ld_core::Config;
//! use camino::Utf8Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default().resolve(Utf8Path::new("/work/app"))?;
//! let mut detector = LocaleDetector::new(&config)?;
//! detector.init().await?;
//!
//! let source = SnapshotSource::new(detector.subscribe());
//! let mut client = ResourceClient::new(source, "en");
//! client.init("zh").await?;
//!
//! println!("{:?}", client.translate("common.greeting"));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use ld_core::{Mapping, Value};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::tree::LocaleModules;

/// Something that can answer `bundle(locale, namespace?)` queries.
#[async_trait]
pub trait BundleSource: Send + Sync {
    /// Fetches a whole locale, or one namespace of it.
    async fn fetch(&self, locale: &str, namespace: Option<&str>) -> Result<Value, ClientError>;
}

/// Serves bundles from the detector's published builds.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    rx: watch::Receiver<Arc<LocaleModules>>,
}

impl SnapshotSource {
    /// Wraps a receiver obtained from `LocaleDetector::subscribe`.
    #[must_use]
    pub const fn new(rx: watch::Receiver<Arc<LocaleModules>>) -> Self {
        Self { rx }
    }

    /// Waits for the next published build.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SourceClosed`] once the detector is dropped.
    pub async fn changed(&mut self) -> Result<(), ClientError> {
        self.rx.changed().await.map_err(|_| ClientError::SourceClosed)
    }

    /// Returns the build currently being served.
    #[must_use]
    pub fn current(&self) -> Arc<LocaleModules> {
        Arc::clone(&self.rx.borrow())
    }
}

#[async_trait]
impl BundleSource for SnapshotSource {
    async fn fetch(&self, locale: &str, namespace: Option<&str>) -> Result<Value, ClientError> {
        self.current()
            .bundle(locale, namespace)
            .cloned()
            .ok_or_else(|| ClientError::unknown_bundle(locale, namespace))
    }
}

/// Loaded translations: `locale -> namespace -> resources`.
#[derive(Debug, Clone, Default)]
pub struct TranslationStore {
    locales: IndexMap<String, Mapping>,
}

impl TranslationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a locale bundle into the store, one namespace at a time.
    ///
    /// Each top-level key of `bundle` is a namespace; keys of a later bundle
    /// replace earlier ones within that namespace.
    pub fn add_bundle(&mut self, locale: &str, bundle: &Value) {
        let Some(bundle) = bundle.as_map() else {
            return;
        };
        let namespaces = self.locales.entry(locale.to_owned()).or_default();

        for (namespace, resources) in bundle {
            let slot = namespaces
                .entry(namespace.clone())
                .or_insert_with(Value::empty_map);
            match resources {
                Value::Map(map) => slot.merge_shallow(map),
                other => *slot = other.clone(),
            }
        }
    }

    /// Returns `true` if a bundle for `locale` has been added.
    #[must_use]
    pub fn has_locale(&self, locale: &str) -> bool {
        self.locales.contains_key(locale)
    }

    /// Looks up `namespace.key` in `locale`.
    ///
    /// Namespaces may contain dots themselves; every split point is tried
    /// from the left. The remaining key is looked up flat first, then as a
    /// dotted path into nested mappings.
    #[must_use]
    pub fn lookup(&self, locale: &str, key: &str) -> Option<&str> {
        let namespaces = self.locales.get(locale)?;

        key.match_indices('.').find_map(|(at, _)| {
            let (namespace, rest) = (&key[..at], &key[at + 1..]);
            let resources = namespaces.get(namespace)?.as_map()?;
            resources
                .get(rest)
                .and_then(Value::as_str)
                .or_else(|| lookup_nested(resources, rest))
        })
    }

    /// Iterates the loaded locales.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }
}

fn lookup_nested<'a>(map: &'a Mapping, path: &str) -> Option<&'a str> {
    let (head, tail) = match path.split_once('.') {
        Some((head, tail)) => (head, Some(tail)),
        None => (path, None),
    };
    let value = map.get(head)?;
    match tail {
        Some(tail) => lookup_nested(value.as_map()?, tail),
        None => value.as_str(),
    }
}

/// Lazily loads locale bundles and tracks the active locale.
#[derive(Debug)]
pub struct ResourceClient<S> {
    source: S,
    store: TranslationStore,
    fallback: String,
    active: Option<String>,
}

impl<S: BundleSource> ResourceClient<S> {
    /// Creates a client with the given fallback locale. Nothing is loaded yet.
    pub fn new(source: S, fallback: impl Into<String>) -> Self {
        Self {
            source,
            store: TranslationStore::new(),
            fallback: fallback.into(),
            active: None,
        }
    }

    /// Loads the fallback locale, then switches to `initial`.
    ///
    /// A missing fallback bundle is logged and tolerated.
    ///
    /// # Errors
    ///
    /// Returns the error from loading `initial`.
    pub async fn init(&mut self, initial: &str) -> Result<(), ClientError> {
        let fallback = self.fallback.clone();
        if let Err(e) = self.load(&fallback).await {
            if e.is_fatal() {
                return Err(e);
            }
            warn!(locale = %fallback, error = %e, "Fallback locale unavailable");
        }
        self.change_language(initial).await
    }

    /// Loads `locale` if needed, then makes it active.
    ///
    /// On failure the active locale is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns the error from the bundle source.
    pub async fn change_language(&mut self, locale: &str) -> Result<(), ClientError> {
        if !self.store.has_locale(locale) {
            self.load(locale).await?;
        }
        self.active = Some(locale.to_owned());
        debug!(locale, "Active locale changed");
        Ok(())
    }

    /// Fetches `locale` again, merging it over what is already loaded.
    ///
    /// # Errors
    ///
    /// Returns the error from the bundle source.
    pub async fn reload(&mut self, locale: &str) -> Result<(), ClientError> {
        self.load(locale).await
    }

    /// Resolves `namespace.key` against the active locale, then the fallback.
    #[must_use]
    pub fn translate(&self, key: &str) -> Option<&str> {
        self.active
            .as_deref()
            .and_then(|locale| self.store.lookup(locale, key))
            .or_else(|| self.store.lookup(&self.fallback, key))
    }

    /// Returns the active locale.
    #[must_use]
    pub fn active_locale(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Returns the fallback locale.
    #[must_use]
    pub fn fallback_locale(&self) -> &str {
        &self.fallback
    }

    /// Returns the loaded translations.
    #[must_use]
    pub const fn store(&self) -> &TranslationStore {
        &self.store
    }

    /// Returns the bundle source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    async fn load(&mut self, locale: &str) -> Result<(), ClientError> {
        let bundle = self.source.fetch(locale, None).await?;
        self.store.add_bundle(locale, &bundle);
        debug!(locale, "Loaded locale bundle");
        Ok(())
    }
}
