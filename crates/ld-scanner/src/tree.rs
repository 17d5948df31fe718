//! Folding the file index into the locale resource tree.
//!
//! Every record contributes its parsed mapping at the key path
//! `[locale]` or `[locale, namespace]`. Records are folded in index order so
//! a later file overrides an earlier one at the same slot. The top-level
//! locales are then exposed as virtual modules.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use ld_core::{FileRecord, Mapping, MergePolicy, ModuleId, Value};
use serde::Serialize;

use crate::index::FileIndex;

/// One published build of the resource tree and its virtual modules.
///
/// Rebuilt wholesale from the index on every change and shared with readers
/// behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocaleModules {
    /// `locale -> namespace -> value`, or `locale -> value` for files without
    /// a namespace.
    pub modules: Mapping,
    /// Module identifier to the locale subtree it serves.
    pub virtual_modules: IndexMap<ModuleId, Value>,
    /// Path-like lookup key (`<root>/<module id>`) to module identifier.
    pub resolved_ids: IndexMap<Utf8PathBuf, ModuleId>,
}

impl LocaleModules {
    /// Returns the value served by the module `id`.
    #[must_use]
    pub fn module(&self, id: &ModuleId) -> Option<&Value> {
        self.virtual_modules.get(id)
    }

    /// Returns the module identifier registered for a path-like key.
    #[must_use]
    pub fn resolve_id(&self, key: &Utf8Path) -> Option<&ModuleId> {
        self.resolved_ids.get(key)
    }

    /// Returns the locale subtree, or one namespace of it.
    #[must_use]
    pub fn bundle(&self, locale: &str, namespace: Option<&str>) -> Option<&Value> {
        let tree = self.modules.get(locale)?;
        match namespace {
            Some(ns) => tree.as_map()?.get(ns),
            None => Some(tree),
        }
    }

    /// Iterates the top-level locales in tree order.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Returns `true` if no locale has any content.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Builds [`LocaleModules`] from a [`FileIndex`].
///
/// # Examples
///
/// ```
/// use ld_scanner::{FileIndex, ResourceTree};
/// use ld_core::MergePolicy;
/// use camino::Utf8Path;
///
/// let tree = ResourceTree::new(Utf8Path::new("/app"), MergePolicy::Shallow);
/// let modules = tree.build(&FileIndex::new());
/// assert!(modules.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ResourceTree {
    root: Utf8PathBuf,
    merge: MergePolicy,
}

impl ResourceTree {
    /// Creates a builder that mints lookup keys under `root`.
    #[must_use]
    pub fn new(root: &Utf8Path, merge: MergePolicy) -> Self {
        Self {
            root: root.to_owned(),
            merge,
        }
    }

    /// Folds the index and derives the virtual-module registry.
    #[must_use]
    pub fn build(&self, index: &FileIndex) -> LocaleModules {
        let modules = self.fold(index.iter());

        let mut virtual_modules = IndexMap::with_capacity(modules.len());
        let mut resolved_ids = IndexMap::with_capacity(modules.len());
        for (locale, value) in &modules {
            let id = ModuleId::for_locale(locale);
            resolved_ids.insert(self.root.join(id.as_str()), id.clone());
            virtual_modules.insert(id, value.clone());
        }

        LocaleModules {
            modules,
            virtual_modules,
            resolved_ids,
        }
    }

    /// Folds records into the nested `locale -> namespace -> value` mapping.
    pub fn fold<'a>(&self, records: impl IntoIterator<Item = &'a FileRecord>) -> Mapping {
        let mut tree = Mapping::new();
        for record in records {
            let keys = record.key_path();
            let Some((last, parents)) = keys.split_last() else {
                continue;
            };

            let mut map = &mut tree;
            for key in parents {
                map = map
                    .entry((*key).to_owned())
                    .or_insert_with(Value::empty_map)
                    .ensure_map();
            }

            let slot = map
                .entry((*last).to_owned())
                .or_insert_with(Value::empty_map);
            match self.merge {
                MergePolicy::Shallow => slot.merge_shallow(&record.value),
                MergePolicy::Deep => slot.merge_deep(&record.value),
            }
        }
        tree
    }

    /// Returns the merge policy in use.
    #[inline]
    #[must_use]
    pub const fn merge(&self) -> MergePolicy {
        self.merge
    }
}
