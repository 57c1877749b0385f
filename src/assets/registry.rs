//! Resource type registry.
//!
//! Maps tag names (as written in a site manifest) to resource constructors so
//! configuration can instantiate custom kinds without knowing their types.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::assets::io::ResourceSource;
use crate::assets::loaders::{BytesLoader, ImageLoader, MusicLoader, SoundLoader};
use crate::assets::resource::Resource;
use crate::errors::{Error, LoadError, Result};

/// Everything a constructor gets from a declaration: the path plus any extra
/// attributes, passed through as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub path: PathBuf,
    pub attributes: FxHashMap<String, String>,
}

impl ResourceDescriptor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            attributes: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Reads a boolean attribute, falling back to `default` when absent.
    pub fn bool_attribute(&self, name: &str, default: bool) -> std::result::Result<bool, LoadError> {
        let Some(value) = self.attribute(name) else {
            return Ok(default);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(LoadError::InvalidAttribute {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn source(&self) -> ResourceSource {
        ResourceSource::File(self.path.clone())
    }
}

pub type Constructor = Arc<dyn Fn(&ResourceDescriptor) -> Result<Resource> + Send + Sync>;

#[derive(Clone, Default)]
pub struct ResourceTypeRegistry {
    constructors: FxHashMap<String, Constructor>,
}

impl ResourceTypeRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the `resource`, `image`, `sound` and `music` tags.
    #[must_use]
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        registry.register_type("resource", |desc| {
            Ok(Resource::new(BytesLoader::new(desc.source())))
        });
        registry.register_type("image", |desc| {
            let convert = desc.bool_attribute("convert", true).map_err(|e| invalid(desc, e))?;
            let alpha = desc.bool_attribute("alpha", true).map_err(|e| invalid(desc, e))?;
            Ok(Resource::new(
                ImageLoader::new(desc.source()).convert(convert).alpha(alpha),
            ))
        });
        registry.register_type("sound", |desc| {
            Ok(Resource::new(SoundLoader::new(desc.source())))
        });
        registry.register_type("music", |desc| {
            Ok(Resource::new(MusicLoader::new(desc.path.clone())))
        });
        registry
    }

    /// Registers a constructor for `tag`, replacing any previous one.
    pub fn register_type<F>(&mut self, tag: impl Into<String>, constructor: F)
    where
        F: Fn(&ResourceDescriptor) -> Result<Resource> + Send + Sync + 'static,
    {
        let tag = tag.into();
        if self
            .constructors
            .insert(tag.clone(), Arc::new(constructor))
            .is_some()
        {
            log::debug!("Replaced constructor for resource type {tag:?}");
        }
    }

    pub fn unregister_type(&mut self, tag: &str) -> Result<()> {
        self.constructors
            .remove(tag)
            .map(drop)
            .ok_or_else(|| Error::UnknownType(tag.to_string()))
    }

    #[must_use]
    pub fn has_type(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    pub fn construct(&self, tag: &str, descriptor: &ResourceDescriptor) -> Result<Resource> {
        let constructor = self
            .constructors
            .get(tag)
            .ok_or_else(|| Error::UnknownType(tag.to_string()))?;
        constructor(descriptor)
    }
}

fn invalid(desc: &ResourceDescriptor, source: LoadError) -> Error {
    Error::Load {
        key: desc.path.to_string_lossy().into_owned(),
        source,
    }
}

impl fmt::Debug for ResourceTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.constructors.keys().collect();
        tags.sort_unstable();
        f.debug_struct("ResourceTypeRegistry")
            .field("types", &tags)
            .finish()
    }
}
