pub mod group;
pub mod io;
pub mod loaders;
pub mod manager;
pub mod manifest;
pub mod registry;
pub mod resource;
pub mod submanager;

pub use group::CacheGroup;
pub use io::ResourceSource;
pub use loaders::{BytesLoader, ImageLoader, MusicLoader, MusicTrack, Sound, SoundLoader};
pub use manager::ResourceManager;
pub use manifest::{GroupEntry, GroupMember, ResourceEntry, SiteManifest};
pub use registry::{Constructor, ResourceDescriptor, ResourceTypeRegistry};
pub use resource::{AssetValue, Resource, ResourceLoader};
pub use submanager::{ImageManager, MusicManager, SoundManager, Submanager};
