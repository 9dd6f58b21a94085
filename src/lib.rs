pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{InMemoryFile, LocalFile, LocalStorage, MemoryStorage};
pub use config::AppConfig;
pub use core::{
    auto_save::{AutoSaveConfig, AutoSaver},
    i18n::Translator,
    import_export::ImportExportManager,
};
pub use domain::{language::Language, mappings::FieldMapping, model::Record};
pub use utils::error::{BizError, Result};
