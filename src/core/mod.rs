pub mod auto_save;
pub mod i18n;
pub mod import_export;
pub mod validators;

pub use crate::domain::model::{Bundle, ExportOutcome, ImportResult, Record};
pub use crate::domain::ports::{BundleLoader, FileSource, PreferenceStore, SaveHandler, Storage};
pub use crate::utils::error::Result;
