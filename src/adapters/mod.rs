// Adapters layer: concrete implementations of the domain ports.

pub mod bundles;
pub mod files;
pub mod preferences;
pub mod storage;

pub use bundles::{DirBundleLoader, HttpBundleLoader, StaticBundleLoader};
pub use files::{InMemoryFile, LocalFile};
pub use preferences::{FilePreferenceStore, MemoryPreferenceStore};
pub use storage::{LocalStorage, MemoryStorage};
