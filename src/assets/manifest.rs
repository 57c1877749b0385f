//! Site Manifest
//!
//! A declarative description of a game's resources and cache groups, loaded
//! from JSON at startup and installed into a [`ResourceManager`].
//!
//! ```json
//! {
//!     "resources": [
//!         { "key": "Hero", "type": "image", "path": "img/hero.png", "attributes": { "alpha": "false" } },
//!         { "type": "sound", "path": "sfx/jump.ogg" }
//!     ],
//!     "groups": [
//!         { "key": "Level1", "members": ["Hero", { "key": "Boss", "type": "image", "path": "img/boss.png" }] }
//!     ]
//! }
//! ```
//!
//! A resource without a `key` is keyed by its path. Group members are either
//! references to resource keys or inline declarations, which are registered
//! as resources first.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::assets::group::CacheGroup;
use crate::assets::manager::ResourceManager;
use crate::assets::registry::{ResourceDescriptor, ResourceTypeRegistry};
use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "FxHashMap::is_empty")]
    pub attributes: FxHashMap<String, String>,
}

impl ResourceEntry {
    /// The declared key, or the path when none was given.
    #[must_use]
    pub fn resolved_key(&self) -> String {
        self.key
            .clone()
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupMember {
    Ref(String),
    Inline(ResourceEntry),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub key: String,
    #[serde(default)]
    pub members: Vec<GroupMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteManifest {
    #[serde(default)]
    pub resources: Vec<ResourceEntry>,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
    /// Directory relative resource paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl SiteManifest {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a manifest file. Relative resource paths resolve against the
    /// file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut manifest = Self::from_json_str(&text)?;
        manifest.base_dir = path.parent().map(Path::to_path_buf);
        Ok(manifest)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Registers every resource, then every group (registering inline members
    /// on the way). Stops at the first error; entries installed before it stay
    /// installed.
    pub fn install(&self, manager: &ResourceManager, registry: &ResourceTypeRegistry) -> Result<()> {
        for entry in &self.resources {
            self.install_resource(entry, manager, registry)?;
        }

        for group in &self.groups {
            let mut members = Vec::with_capacity(group.members.len());
            for member in &group.members {
                match member {
                    GroupMember::Ref(key) => members.push(key.clone()),
                    GroupMember::Inline(entry) => {
                        members.push(self.install_resource(entry, manager, registry)?);
                    }
                }
            }
            manager.add_group(group.key.clone(), CacheGroup::new(group.key.clone(), members))?;
        }

        log::info!(
            "Installed site manifest: {} resource(s), {} group(s)",
            self.resources.len(),
            self.groups.len()
        );
        Ok(())
    }

    fn install_resource(
        &self,
        entry: &ResourceEntry,
        manager: &ResourceManager,
        registry: &ResourceTypeRegistry,
    ) -> Result<String> {
        let key = entry.resolved_key();
        let path = match &self.base_dir {
            Some(base) if entry.path.is_relative() => base.join(&entry.path),
            _ => entry.path.clone(),
        };
        let descriptor = ResourceDescriptor {
            path,
            attributes: entry.attributes.clone(),
        };
        let resource = registry.construct(&entry.kind, &descriptor)?;
        manager.register(key.clone(), resource)?;
        Ok(key)
    }
}
