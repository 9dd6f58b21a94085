use crate::config::{AppConfig, DEFAULT_CONFIG_FILE};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "bizsuite")]
#[command(about = "Translation lookup and CSV/JSON import-export for business records")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Override the translation bundle directory
    #[arg(long)]
    pub locales_dir: Option<String>,

    /// Load translation bundles over HTTP from this base URL
    #[arg(long)]
    pub locales_url: Option<String>,

    /// Override the export output directory
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List supported languages
    Languages,

    /// Persist the active language
    SetLanguage {
        /// Language code (uz-latn, uz-cyrl, ru, en)
        code: String,
    },

    /// Resolve a dotted translation key
    Translate {
        key: String,

        /// Text returned when no bundle has the key
        #[arg(long)]
        fallback: Option<String>,
    },

    /// Show keys missing from a language compared with the fallback language
    Audit {
        /// Only audit this language
        #[arg(long)]
        language: Option<String>,
    },

    /// Export a JSON array of records as CSV or JSON
    Export {
        /// JSON file holding the records
        #[arg(short, long)]
        input: String,

        /// Base name of the generated file
        #[arg(short, long)]
        name: String,

        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Explicit CSV column order
        #[arg(long, value_delimiter = ',')]
        headers: Vec<String>,
    },

    /// Import and validate a CSV or JSON file
    Import {
        /// File to import (.csv or .json)
        #[arg(short, long)]
        file: String,

        /// Field mapping for CSV columns (transaction, contact, invoice or a configured one)
        #[arg(short, long)]
        mapping: Option<String>,

        /// Fields every row must provide
        #[arg(long, value_delimiter = ',')]
        required: Vec<String>,

        /// Print every row error
        #[arg(long)]
        show_errors: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl CliConfig {
    /// 命令列參數覆蓋設定檔
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.locales_dir {
            config.i18n.locales_dir = dir.clone();
            config.i18n.locales_url = None;
        }
        if let Some(url) = &self.locales_url {
            config.i18n.locales_url = Some(url.clone());
        }
        if let Some(dir) = &self.output_dir {
            config.export.output_dir = dir.clone();
        }
    }
}
