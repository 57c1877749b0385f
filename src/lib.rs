//! Larder
//!
//! A reference-counted cache for lazily-loaded game resources.
//!
//! Resources are registered by key with a [`ResourceManager`] and loaded only
//! while someone holds a cache reference to them. [`CacheGroup`]s cache and
//! release sets of resources together, and [`Submanager`]s give typed access
//! to one kind of resource.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use larder::{ImageLoader, ImageManager, Resource, ResourceManager};
//!
//! let manager = Arc::new(ResourceManager::new());
//! let images = ImageManager::new(Arc::clone(&manager));
//! images.register("Hero", Resource::new(ImageLoader::new("img/hero.png")))?;
//!
//! let hero = images.load("Hero")?;
//! // ...
//! images.uncache("Hero")?;
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod assets;
pub mod errors;

pub use assets::{
    AssetValue, BytesLoader, CacheGroup, ImageLoader, ImageManager, MusicLoader, MusicManager,
    MusicTrack, Resource, ResourceDescriptor, ResourceLoader, ResourceManager, ResourceSource,
    ResourceTypeRegistry, SiteManifest, Sound, SoundLoader, SoundManager, Submanager,
};
pub use errors::{Error, GroupCacheError, LoadError, Result};
