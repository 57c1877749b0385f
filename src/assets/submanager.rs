//! Submanagers
//!
//! A submanager is a typed view over a shared [`ResourceManager`]. It only
//! deals with resources producing `T`, and hands values back as `Arc<T>`.
//! Submanagers own nothing; several may share one manager.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::assets::loaders::{MusicTrack, Sound};
use crate::assets::manager::ResourceManager;
use crate::assets::resource::Resource;
use crate::errors::{Error, Result};

/// Image submanager.
pub type ImageManager = Submanager<image::DynamicImage>;
/// Sound effect submanager.
pub type SoundManager = Submanager<Sound>;
/// Music submanager. Music is not cacheable; use [`Submanager::fetch`].
pub type MusicManager = Submanager<MusicTrack>;

pub struct Submanager<T> {
    manager: Arc<ResourceManager>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> Submanager<T> {
    #[must_use]
    pub fn new(manager: Arc<ResourceManager>) -> Self {
        Self {
            manager,
            _marker: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub fn manager(&self) -> &Arc<ResourceManager> {
        &self.manager
    }

    /// Registers a resource with the underlying manager, rejecting resources
    /// that do not produce `T`.
    pub fn register(&self, key: impl Into<String>, resource: Resource) -> Result<()> {
        let key = key.into();
        if !resource.produces::<T>() {
            return Err(Error::TypeMismatch {
                key,
                expected: std::any::type_name::<T>(),
                found: resource.value_type_name(),
            });
        }
        self.manager.register(key, resource)
    }

    /// Whether `key` names a resource producing `T`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.manager.check_type::<T>(key).is_ok()
    }

    /// Caches the resource and returns its value.
    ///
    /// The reference taken here is the caller's to give back with
    /// [`uncache`](Self::uncache).
    pub fn load(&self, key: &str) -> Result<Arc<T>> {
        self.manager.check_type::<T>(key)?;
        self.manager.cache(key)?;
        self.manager.get_as::<T>(key)
    }

    /// Takes a reference without reading the value.
    pub fn cache(&self, key: &str) -> Result<()> {
        self.manager.check_type::<T>(key)?;
        self.manager.cache(key).map(drop)
    }

    pub fn uncache(&self, key: &str) -> Result<i64> {
        self.manager.check_type::<T>(key)?;
        self.manager.uncache(key)
    }

    /// Reads the cached value. Never loads.
    pub fn get(&self, key: &str) -> Result<Arc<T>> {
        self.manager.get_as::<T>(key)
    }

    /// Returns the cached value, or a freshly loaded one that is not kept.
    pub fn fetch(&self, key: &str) -> Result<Arc<T>> {
        self.manager.check_type::<T>(key)?;
        self.manager
            .fetch(key)?
            .downcast::<T>()
            .map_err(|_| Error::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>(),
                found: "unknown",
            })
    }
}

impl<T> Clone for Submanager<T> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Submanager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Submanager")
            .field("type", &std::any::type_name::<T>())
            .field("manager", &self.manager)
            .finish()
    }
}
