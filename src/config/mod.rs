#[cfg(feature = "cli")]
pub mod cli;

use crate::adapters::{DirBundleLoader, FilePreferenceStore, HttpBundleLoader};
use crate::core::auto_save::AutoSaveConfig;
use crate::core::i18n::Translator;
use crate::domain::language::Language;
use crate::domain::mappings::FieldMapping;
use crate::domain::ports::{BundleLoader, PreferenceStore};
use crate::utils::error::{BizError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "bizsuite.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub i18n: I18nConfig,
    pub export: ExportConfig,
    pub mappings: HashMap<String, FieldMapping>,
    pub auto_save: AutoSaveSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    pub default_language: String,
    pub fallback_language: String,
    pub locales_dir: String,
    /// 設定後改用 HTTP 載入，忽略 locales_dir
    pub locales_url: Option<String>,
    pub request_timeout_seconds: Option<u64>,
    pub preference_file: String,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_language: Language::DEFAULT.code().to_string(),
            fallback_language: Language::FALLBACK.code().to_string(),
            locales_dir: "./locales".to_string(),
            locales_url: None,
            request_timeout_seconds: None,
            preference_file: "./.bizsuite/preferences.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: "./exports".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveSettings {
    pub enabled: bool,
    pub debounce_ms: u64,
}

impl Default for AutoSaveSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 2000,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 檔案不存在時使用預設值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(
                "No configuration at {}, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BizError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${LOCALES_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BizError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_language_code("i18n.default_language", &self.i18n.default_language)?;
        validation::validate_language_code(
            "i18n.fallback_language",
            &self.i18n.fallback_language,
        )?;

        match &self.i18n.locales_url {
            Some(url) => validation::validate_url("i18n.locales_url", url)?,
            None => validation::validate_path("i18n.locales_dir", &self.i18n.locales_dir)?,
        }

        if let Some(timeout) = self.i18n.request_timeout_seconds {
            validation::validate_positive_number("i18n.request_timeout_seconds", timeout, 1)?;
        }

        validation::validate_path("i18n.preference_file", &self.i18n.preference_file)?;
        validation::validate_path("export.output_dir", &self.export.output_dir)?;
        validation::validate_positive_number("auto_save.debounce_ms", self.auto_save.debounce_ms, 1)?;

        for (name, mapping) in &self.mappings {
            if mapping.is_empty() {
                return Err(BizError::InvalidConfigValueError {
                    field: format!("mappings.{}", name),
                    value: String::new(),
                    reason: "Mapping must contain at least one column".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn default_language(&self) -> Language {
        self.i18n.default_language.parse().unwrap_or(Language::DEFAULT)
    }

    pub fn fallback_language(&self) -> Language {
        self.i18n.fallback_language.parse().unwrap_or(Language::FALLBACK)
    }

    /// 自訂 mapping 優先於內建 preset
    pub fn mapping(&self, name: &str) -> Option<FieldMapping> {
        self.mappings
            .get(name)
            .cloned()
            .or_else(|| FieldMapping::preset(name))
    }

    pub fn auto_save_config(&self) -> AutoSaveConfig {
        AutoSaveConfig {
            enabled: self.auto_save.enabled,
            debounce: Duration::from_millis(self.auto_save.debounce_ms),
        }
    }

    pub fn bundle_loader(&self) -> Result<Arc<dyn BundleLoader>> {
        match &self.i18n.locales_url {
            Some(url) => {
                let loader = match self.i18n.request_timeout_seconds {
                    Some(seconds) => {
                        HttpBundleLoader::with_timeout(url.clone(), Duration::from_secs(seconds))?
                    }
                    None => HttpBundleLoader::new(url.clone()),
                };
                Ok(Arc::new(loader))
            }
            None => Ok(Arc::new(DirBundleLoader::new(&self.i18n.locales_dir))),
        }
    }

    pub fn preference_store(&self) -> Arc<dyn PreferenceStore> {
        Arc::new(FilePreferenceStore::new(&self.i18n.preference_file))
    }

    pub fn translator(&self) -> Result<Translator> {
        Ok(Translator::with_languages(
            self.bundle_loader()?,
            self.preference_store(),
            self.default_language(),
            self.fallback_language(),
        ))
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[i18n]
default_language = "ru"
fallback_language = "en"
locales_dir = "./assets/locales"
preference_file = "./state/prefs.json"

[export]
output_dir = "./out"

[mappings.product]
"SKU Code" = "sku"
Price = "unit_price"

[auto_save]
enabled = false
debounce_ms = 500
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.default_language(), Language::Ru);
        assert_eq!(config.export.output_dir, "./out");
        assert_eq!(
            config.mapping("product").unwrap().field_for("SKU Code"),
            Some("sku")
        );
        assert_eq!(
            config.auto_save_config(),
            AutoSaveConfig {
                enabled: false,
                debounce: Duration::from_millis(500)
            }
        );
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.default_language(), Language::UzLatn);
        assert_eq!(config.fallback_language(), Language::En);
        assert_eq!(config.i18n.locales_dir, "./locales");
        assert_eq!(config.auto_save.debounce_ms, 2000);
        assert!(config.mapping("invoice").is_some());
        assert!(config.mapping("unknown").is_none());
    }

    #[test]
    fn test_custom_mapping_overrides_preset() {
        let config = AppConfig::from_toml_str(
            r#"
[mappings.contact]
"Full Name" = "name"
"#,
        )
        .unwrap();

        let contact = config.mapping("contact").unwrap();
        assert_eq!(contact.field_for("Full Name"), Some("name"));
        assert_eq!(contact.field_for("Email"), None);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("BIZSUITE_TEST_LOCALES_URL", "https://cdn.example.com/locales");

        let config = AppConfig::from_toml_str(
            r#"
[i18n]
locales_url = "${BIZSUITE_TEST_LOCALES_URL}"
"#,
        )
        .unwrap();
        assert_eq!(
            config.i18n.locales_url.as_deref(),
            Some("https://cdn.example.com/locales")
        );
        assert!(config.validate().is_ok());

        std::env::remove_var("BIZSUITE_TEST_LOCALES_URL");
    }

    #[test]
    fn test_config_validation_errors() {
        let bad_language = AppConfig::from_toml_str(
            r#"
[i18n]
default_language = "de"
"#,
        )
        .unwrap();
        assert!(bad_language.validate().is_err());

        let bad_output = AppConfig::from_toml_str(
            r#"
[export]
output_dir = ""
"#,
        )
        .unwrap();
        assert!(bad_output.validate().is_err());

        let bad_url = AppConfig::from_toml_str(
            r#"
[i18n]
locales_url = "ftp://example.com"
"#,
        )
        .unwrap();
        assert!(bad_url.validate().is_err());

        let zero_debounce = AppConfig::from_toml_str(
            r#"
[auto_save]
debounce_ms = 0
"#,
        )
        .unwrap();
        assert!(zero_debounce.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml_str("[i18n\nbroken").unwrap_err();
        assert!(matches!(err, BizError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[export]\noutput_dir = \"./from-file\"\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.export.output_dir, "./from-file");

        let missing = AppConfig::load_or_default("/no/such/bizsuite.toml").unwrap();
        assert_eq!(missing.export.output_dir, "./exports");
    }
}
