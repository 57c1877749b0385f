//! Resource
//!
//! A resource is a keyed, lazily-loadable unit of game data. It wraps a
//! [`ResourceLoader`] and, while at least one holder has cached it, the value
//! that loader produced.
//!
//! # Design Principles
//! - Kinds differ only by their loader; there is no resource class hierarchy
//! - Values are type-erased behind [`AssetValue`] and recovered with `get_as`
//! - A value is stored if and only if the reference count is positive
//! - Eviction always succeeds; release hook failures are logged and dropped

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::errors::{Error, LoadError, Result};

/// A loaded, shareable resource value.
pub type AssetValue = Arc<dyn Any + Send + Sync>;

/// Produces the value of a resource.
///
/// `load` takes nothing beyond what the loader was constructed with. `release`
/// receives the value previously returned by `load` when the resource is
/// evicted; its errors are never propagated.
pub trait ResourceLoader: Send + Sync + 'static {
    type Output: Any + Send + Sync;

    fn load(&self) -> std::result::Result<Self::Output, LoadError>;

    fn release(&self, _value: &Self::Output) -> std::result::Result<(), LoadError> {
        Ok(())
    }

    /// Whether the value may be kept between requests.
    fn cacheable(&self) -> bool {
        true
    }
}

// Object-safe view over `ResourceLoader`.
trait ErasedLoader: Send + Sync {
    fn load_erased(&self) -> std::result::Result<AssetValue, LoadError>;
    fn release_erased(&self, value: &AssetValue) -> std::result::Result<(), LoadError>;
    fn cacheable(&self) -> bool;
}

impl<L: ResourceLoader> ErasedLoader for L {
    fn load_erased(&self) -> std::result::Result<AssetValue, LoadError> {
        let value = ResourceLoader::load(self)?;
        Ok(Arc::new(value))
    }

    fn release_erased(&self, value: &AssetValue) -> std::result::Result<(), LoadError> {
        match value.downcast_ref::<L::Output>() {
            Some(value) => ResourceLoader::release(self, value),
            None => Ok(()),
        }
    }

    fn cacheable(&self) -> bool {
        ResourceLoader::cacheable(self)
    }
}

/// Loader built from a pair of closures.
struct FnLoader<T, F, R> {
    load: F,
    release: R,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F, R> ResourceLoader for FnLoader<T, F, R>
where
    T: Any + Send + Sync,
    F: Fn() -> std::result::Result<T, LoadError> + Send + Sync + 'static,
    R: Fn(&T) -> std::result::Result<(), LoadError> + Send + Sync + 'static,
{
    type Output = T;

    fn load(&self) -> std::result::Result<T, LoadError> {
        (self.load)()
    }

    fn release(&self, value: &T) -> std::result::Result<(), LoadError> {
        (self.release)(value)
    }
}

/// A lazily-loaded resource.
pub struct Resource {
    key: String,
    loader: Box<dyn ErasedLoader>,
    value_type: TypeId,
    value_type_name: &'static str,
    cached: Option<AssetValue>,
    ref_count: i64,
}

impl Resource {
    /// Creates a resource from a loader. The resource starts uncached.
    pub fn new<L: ResourceLoader>(loader: L) -> Self {
        Self {
            key: String::new(),
            loader: Box::new(loader),
            value_type: TypeId::of::<L::Output>(),
            value_type_name: std::any::type_name::<L::Output>(),
            cached: None,
            ref_count: 0,
        }
    }

    /// Creates a resource from a load closure with no release hook.
    pub fn from_fn<T, F>(load: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> std::result::Result<T, LoadError> + Send + Sync + 'static,
    {
        Self::with_release(load, |_: &T| Ok(()))
    }

    /// Creates a resource from a load closure and a release hook.
    pub fn with_release<T, F, R>(load: F, release: R) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> std::result::Result<T, LoadError> + Send + Sync + 'static,
        R: Fn(&T) -> std::result::Result<(), LoadError> + Send + Sync + 'static,
    {
        Self::new(FnLoader {
            load,
            release,
            _marker: PhantomData,
        })
    }

    /// Key the resource was registered under. Empty before registration.
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    #[must_use]
    pub fn ref_count(&self) -> i64 {
        self.ref_count
    }

    #[inline]
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    #[inline]
    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        self.loader.cacheable()
    }

    #[inline]
    #[must_use]
    pub fn value_type(&self) -> TypeId {
        self.value_type
    }

    #[inline]
    #[must_use]
    pub fn value_type_name(&self) -> &'static str {
        self.value_type_name
    }

    /// Whether this resource produces values of type `T`.
    #[inline]
    #[must_use]
    pub fn produces<T: Any>(&self) -> bool {
        self.value_type == TypeId::of::<T>()
    }

    /// Runs the loader and stores its value as the cache.
    ///
    /// On failure the previous cache state is kept.
    pub fn load(&mut self) -> std::result::Result<AssetValue, LoadError> {
        let value = self.loader.load_erased()?;
        if let Some(old) = self.cached.replace(Arc::clone(&value)) {
            self.release_value(&old);
        }
        log::debug!("Loaded resource {:?} ({})", self.key, self.value_type_name);
        Ok(value)
    }

    /// Drops the cached value, running the release hook first. No-op when nothing is cached.
    pub fn unload(&mut self) {
        if let Some(value) = self.cached.take() {
            self.release_value(&value);
            log::debug!("Evicted resource {:?}", self.key);
        }
    }

    fn release_value(&self, value: &AssetValue) {
        if let Err(e) = self.loader.release_erased(value) {
            log::warn!("Release hook for resource {:?} failed: {}", self.key, e);
        }
    }

    /// Returns the cached value. Never loads.
    pub fn get(&self) -> Result<AssetValue> {
        match &self.cached {
            Some(value) if self.ref_count > 0 => Ok(Arc::clone(value)),
            _ => Err(Error::NotCached(self.key.clone())),
        }
    }

    /// Returns the cached value downcast to `T`.
    pub fn get_as<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        self.check_type::<T>()?;
        self.get()?
            .downcast::<T>()
            .map_err(|_| self.type_mismatch::<T>())
    }

    /// Returns the cached value if present, otherwise loads a fresh value
    /// without storing it or touching the reference count.
    pub fn fetch(&self) -> Result<AssetValue> {
        if let Some(value) = &self.cached {
            return Ok(Arc::clone(value));
        }
        self.loader.load_erased().map_err(|source| Error::Load {
            key: self.key.clone(),
            source,
        })
    }

    pub(crate) fn check_type<T: Any>(&self) -> Result<()> {
        if self.produces::<T>() {
            Ok(())
        } else {
            Err(self.type_mismatch::<T>())
        }
    }

    fn type_mismatch<T: Any>(&self) -> Error {
        Error::TypeMismatch {
            key: self.key.clone(),
            expected: std::any::type_name::<T>(),
            found: self.value_type_name,
        }
    }

    /// Takes one reference. Loads when the count was at or below zero, or
    /// always when `force` is set.
    ///
    /// The count moves by exactly one. A value is only stored once the new
    /// count is positive; below that the fresh value is handed back uncached,
    /// like [`Resource::fetch`]. On load failure the count is left unchanged.
    pub(crate) fn acquire(&mut self, force: bool) -> Result<AssetValue> {
        if !self.is_cacheable() {
            return Err(Error::CachingUnsupported(self.key.clone()));
        }
        let hit = if force || self.ref_count <= 0 {
            None
        } else {
            self.cached.clone()
        };
        if let Some(value) = hit {
            self.ref_count += 1;
            return Ok(value);
        }

        let count = self.ref_count + 1;
        let loaded = if count > 0 {
            self.load()
        } else {
            self.loader.load_erased()
        };
        let value = loaded.map_err(|source| Error::Load {
            key: self.key.clone(),
            source,
        })?;
        self.ref_count = count;
        Ok(value)
    }

    /// Gives back one reference, evicting at or below zero. Returns the new count.
    pub(crate) fn release(&mut self) -> Result<i64> {
        if !self.is_cacheable() {
            return Err(Error::CachingUnsupported(self.key.clone()));
        }
        self.ref_count -= 1;
        if self.ref_count <= 0 {
            self.unload();
        }
        Ok(self.ref_count)
    }

    /// Puts the resource into its freshly-registered state under `key`.
    pub(crate) fn attach(&mut self, key: &str) {
        self.unload();
        key.clone_into(&mut self.key);
        self.ref_count = 0;
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("key", &self.key)
            .field("value_type", &self.value_type_name)
            .field("ref_count", &self.ref_count)
            .field("cached", &self.is_cached())
            .finish_non_exhaustive()
    }
}
