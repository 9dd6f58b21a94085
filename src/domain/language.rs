use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported interface languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "uz-latn")]
    UzLatn,
    #[serde(rename = "uz-cyrl")]
    UzCyrl,
    #[serde(rename = "ru")]
    Ru,
    #[serde(rename = "en")]
    En,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageConfig {
    pub code: Language,
    pub name: &'static str,
    pub native_name: &'static str,
    pub flag: &'static str,
    pub direction: TextDirection,
}

impl Language {
    /// 載入順序即此順序
    pub const ALL: [Language; 4] = [
        Language::UzLatn,
        Language::UzCyrl,
        Language::Ru,
        Language::En,
    ];

    /// Active language before any preference is applied.
    pub const DEFAULT: Language = Language::UzLatn;

    /// Language consulted when the active bundle lacks a key.
    pub const FALLBACK: Language = Language::En;

    pub fn code(&self) -> &'static str {
        match self {
            Language::UzLatn => "uz-latn",
            Language::UzCyrl => "uz-cyrl",
            Language::Ru => "ru",
            Language::En => "en",
        }
    }

    pub fn config(&self) -> LanguageConfig {
        match self {
            Language::UzLatn => LanguageConfig {
                code: *self,
                name: "Uzbek (Latin)",
                native_name: "Oʻzbekcha",
                flag: "🇺🇿",
                direction: TextDirection::Ltr,
            },
            Language::UzCyrl => LanguageConfig {
                code: *self,
                name: "Uzbek (Cyrillic)",
                native_name: "Ўзбекча",
                flag: "🇺🇿",
                direction: TextDirection::Ltr,
            },
            Language::Ru => LanguageConfig {
                code: *self,
                name: "Russian",
                native_name: "Русский",
                flag: "🇷🇺",
                direction: TextDirection::Ltr,
            },
            Language::En => LanguageConfig {
                code: *self,
                name: "English",
                native_name: "English",
                flag: "🇺🇸",
                direction: TextDirection::Ltr,
            },
        }
    }

    pub fn direction(&self) -> TextDirection {
        self.config().direction
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::DEFAULT
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown language code '{}'", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

impl FromStr for Language {
    type Err = UnknownLanguage;

    /// 只接受完全相符的代碼
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .iter()
            .copied()
            .find(|l| l.code() == s)
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}
