//! Resource Manager
//!
//! The manager owns two separate namespaces: resources and cache groups.
//! Resources are registered up front (usually from a site manifest) and
//! materialized on demand by reference counting:
//!
//! - [`ResourceManager::cache`] takes a reference, loading on the first one
//! - [`ResourceManager::uncache`] gives one back, evicting at zero or below
//! - [`ResourceManager::get`] reads the cached value without loading
//!
//! Counting lets independent subsystems request the same resource without
//! unloading it under each other.
//!
//! # Locking
//!
//! All methods take `&self`. Each namespace sits behind a `RwLock` and each
//! resource behind its own `Mutex`, so the count update, threshold check and
//! load/unload for one key form a single step. Loaders run while only that
//! resource's mutex is held; a loader must not call back into the manager for
//! the same key.

use std::any::TypeId;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::assets::group::CacheGroup;
use crate::assets::resource::{AssetValue, Resource};
use crate::errors::{Error, GroupCacheError, Namespace, Result};

type Entry = Arc<Mutex<Resource>>;

#[derive(Default)]
pub struct ResourceManager {
    resources: RwLock<FxHashMap<String, Entry>>,
    groups: RwLock<FxHashMap<String, CacheGroup>>,
}

impl ResourceManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        self.resources
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::unknown_resource(key))
    }

    // ========================================================================
    // Resource namespace
    // ========================================================================

    /// Adds a resource under `key`. The resource starts uncached with a count of zero.
    pub fn register(&self, key: impl Into<String>, mut resource: Resource) -> Result<()> {
        let key = key.into();
        // Release hooks may call back into the manager.
        resource.attach(&key);
        let mut guard = self.resources.write();
        if guard.contains_key(&key) {
            return Err(Error::DuplicateKey {
                namespace: Namespace::Resource,
                key,
            });
        }
        log::debug!("Registered resource {:?} ({})", key, resource.value_type_name());
        guard.insert(key, Arc::new(Mutex::new(resource)));
        Ok(())
    }

    /// Removes a resource regardless of its reference count, releasing any cached value.
    pub fn unregister(&self, key: &str) -> Result<()> {
        let entry = self
            .resources
            .write()
            .remove(key)
            .ok_or_else(|| Error::unknown_resource(key))?;

        let mut resource = entry.lock();
        if resource.ref_count() > 0 {
            log::debug!(
                "Unregistering resource {:?} with {} live reference(s)",
                key,
                resource.ref_count()
            );
        }
        resource.unload();
        Ok(())
    }

    #[must_use]
    pub fn has_resource(&self, key: &str) -> bool {
        self.resources.read().contains_key(key)
    }

    #[must_use]
    pub fn resource_keys(&self) -> Vec<String> {
        self.resources.read().keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.read().is_empty()
    }

    // ========================================================================
    // Reference counting
    // ========================================================================

    /// Takes a reference to the resource, loading it if it holds no value.
    ///
    /// The count always rises by one. An over-released resource is loaded
    /// but only stored once the count is positive again. If loading fails the
    /// count is not incremented and the error is returned.
    pub fn cache(&self, key: &str) -> Result<AssetValue> {
        self.entry(key)?.lock().acquire(false)
    }

    /// Like [`cache`](Self::cache), but always re-runs the loader, replacing
    /// any cached value.
    pub fn recache(&self, key: &str) -> Result<AssetValue> {
        self.entry(key)?.lock().acquire(true)
    }

    /// Gives back a reference, evicting the value once the count drops to zero
    /// or below. Returns the new count, which may be negative.
    ///
    /// Non-cacheable resources fail with [`Error::CachingUnsupported`].
    pub fn uncache(&self, key: &str) -> Result<i64> {
        self.entry(key)?.lock().release()
    }

    /// Reads the cached value. Never loads.
    pub fn get(&self, key: &str) -> Result<AssetValue> {
        self.entry(key)?.lock().get()
    }

    /// Reads the cached value downcast to `T`.
    pub fn get_as<T: std::any::Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>> {
        self.entry(key)?.lock().get_as::<T>()
    }

    /// Returns the cached value if there is one, otherwise loads a throwaway
    /// value without caching it.
    pub fn fetch(&self, key: &str) -> Result<AssetValue> {
        self.entry(key)?.lock().fetch()
    }

    pub fn ref_count(&self, key: &str) -> Result<i64> {
        Ok(self.entry(key)?.lock().ref_count())
    }

    pub fn is_cached(&self, key: &str) -> Result<bool> {
        Ok(self.entry(key)?.lock().is_cached())
    }

    /// Value type produced by the resource, as `(TypeId, type name)`.
    pub fn value_type(&self, key: &str) -> Result<(TypeId, &'static str)> {
        let entry = self.entry(key)?;
        let resource = entry.lock();
        Ok((resource.value_type(), resource.value_type_name()))
    }

    pub(crate) fn check_type<T: std::any::Any>(&self, key: &str) -> Result<()> {
        self.entry(key)?.lock().check_type::<T>()
    }

    // ========================================================================
    // Group namespace
    // ========================================================================

    /// Adds a group under `key`. The group takes `key` as its own key.
    pub fn add_group(&self, key: impl Into<String>, mut group: CacheGroup) -> Result<()> {
        let key = key.into();
        let mut guard = self.groups.write();
        if guard.contains_key(&key) {
            return Err(Error::DuplicateKey {
                namespace: Namespace::Group,
                key,
            });
        }
        group.rename(&key);
        guard.insert(key, group);
        Ok(())
    }

    pub fn remove_group(&self, key: &str) -> Result<CacheGroup> {
        self.groups
            .write()
            .remove(key)
            .ok_or_else(|| Error::unknown_group(key))
    }

    #[must_use]
    pub fn has_group(&self, key: &str) -> bool {
        self.groups.read().contains_key(key)
    }

    /// Returns a snapshot of the group.
    pub fn group(&self, key: &str) -> Result<CacheGroup> {
        self.groups
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::unknown_group(key))
    }

    #[must_use]
    pub fn group_keys(&self) -> Vec<String> {
        self.groups.read().keys().cloned().collect()
    }

    /// Edits a registered group in place.
    pub fn update_group<R>(&self, key: &str, f: impl FnOnce(&mut CacheGroup) -> R) -> Result<R> {
        let mut guard = self.groups.write();
        let group = guard.get_mut(key).ok_or_else(|| Error::unknown_group(key))?;
        Ok(f(group))
    }

    /// Caches every member of the group. See [`CacheGroup::cache_all`].
    pub fn cache_group(&self, key: &str) -> Result<()> {
        let group = self.group(key)?;
        group.cache_all(self).map_err(Error::from)
    }

    /// Uncaches every member of the group. See [`CacheGroup::uncache_all`].
    pub fn uncache_group(&self, key: &str) -> Result<()> {
        let group = self.group(key)?;
        group.uncache_all(self).map_err(Error::from)
    }

    /// Checks that every group member names a registered resource.
    ///
    /// Returns one aggregate error per group with dangling members.
    #[must_use]
    pub fn dangling_members(&self) -> Vec<GroupCacheError> {
        let groups = self.groups.read();
        let resources = self.resources.read();
        groups
            .values()
            .filter_map(|group| {
                let failures: Vec<_> = group
                    .members()
                    .filter(|key| !resources.contains_key(*key))
                    .map(|key| (key.to_string(), Error::unknown_resource(key)))
                    .collect();
                (!failures.is_empty()).then(|| GroupCacheError {
                    group: group.key().to_string(),
                    failures,
                })
            })
            .collect()
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Evicts every cached value and empties both namespaces.
    pub fn cleanup(&self) {
        let entries: Vec<Entry> = self.resources.write().drain().map(|(_, e)| e).collect();
        for entry in entries {
            entry.lock().unload();
        }
        self.groups.write().clear();
        log::debug!("Resource manager cleaned up");
    }
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("resources", &self.resources.read().len())
            .field("groups", &self.groups.read().len())
            .finish()
    }
}
