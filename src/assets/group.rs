//! Cache Groups
//!
//! A cache group is a named set of resource keys that can be cached and
//! uncached together. Groups hold keys only; members are looked up through
//! the manager each time, so unregistering a resource never leaves a group
//! pointing at freed data. Unknown members are reported when the group is
//! cached, not when they are added.

use rustc_hash::FxHashSet;

use crate::assets::manager::ResourceManager;
use crate::errors::{Error, GroupCacheError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheGroup {
    key: String,
    members: FxHashSet<String>,
}

impl CacheGroup {
    pub fn new<I, S>(key: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn rename(&mut self, key: &str) {
        key.clone_into(&mut self.key);
    }

    /// Adds a member key. Returns `false` if it was already present.
    pub fn add_resource(&mut self, key: impl Into<String>) -> bool {
        self.members.insert(key.into())
    }

    /// Removes a member key. Returns `false` if it was not present.
    pub fn remove_resource(&mut self, key: &str) -> bool {
        self.members.remove(key)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.members.contains(key)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    /// Caches every member once.
    ///
    /// Members are independent: a failing member does not stop the others,
    /// and successfully cached members stay cached. All failures are returned
    /// together.
    pub fn cache_all(&self, manager: &ResourceManager) -> Result<(), GroupCacheError> {
        self.fan_out(|key| manager.cache(key).map(drop))
    }

    /// Uncaches every member once. Every member is processed even if some
    /// keys are unknown.
    pub fn uncache_all(&self, manager: &ResourceManager) -> Result<(), GroupCacheError> {
        self.fan_out(|key| manager.uncache(key).map(drop))
    }

    fn fan_out(
        &self,
        mut op: impl FnMut(&str) -> Result<(), Error>,
    ) -> Result<(), GroupCacheError> {
        let mut failures = Vec::new();
        for key in &self.members {
            if let Err(e) = op(key.as_str()) {
                log::warn!("Cache group {:?}: member {:?} failed: {}", self.key, key, e);
                failures.push((key.clone(), e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(GroupCacheError {
                group: self.key.clone(),
                failures,
            })
        }
    }
}
