use crate::domain::language::{Language, TextDirection};
use crate::domain::model::Bundle;
use crate::domain::ports::{BundleLoader, PreferenceStore};
use crate::utils::error::Result;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{broadcast, OnceCell};

/// Storage key of the persisted language choice.
pub const LANGUAGE_PREFERENCE_KEY: &str = "language";

/// Broadcast after every successful language switch. Receivers re-query
/// [`Translator::current_language`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageChanged;

/// Document-wide locale attributes (`lang` / `dir`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentLocale {
    pub lang: Language,
    pub dir: TextDirection,
}

impl DocumentLocale {
    fn for_language(language: Language) -> Self {
        Self {
            lang: language,
            dir: language.direction(),
        }
    }
}

enum LoadState {
    Ready(HashMap<Language, Bundle>),
    Failed,
}

/// Translation context shared by every view.
pub struct Translator {
    loader: Arc<dyn BundleLoader>,
    preferences: Arc<dyn PreferenceStore>,
    bundles: OnceCell<LoadState>,
    locale: RwLock<DocumentLocale>,
    fallback_language: Language,
    changes: broadcast::Sender<LanguageChanged>,
}

impl Translator {
    pub fn new(loader: Arc<dyn BundleLoader>, preferences: Arc<dyn PreferenceStore>) -> Self {
        Self::with_languages(loader, preferences, Language::DEFAULT, Language::FALLBACK)
    }

    pub fn with_languages(
        loader: Arc<dyn BundleLoader>,
        preferences: Arc<dyn PreferenceStore>,
        default_language: Language,
        fallback_language: Language,
    ) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            loader,
            preferences,
            bundles: OnceCell::new(),
            locale: RwLock::new(DocumentLocale::for_language(default_language)),
            fallback_language,
            changes,
        }
    }

    /// Loads every bundle once. Concurrent callers share the same in-flight
    /// load; later calls return immediately. Returns whether bundles are ready.
    pub async fn initialize(&self) -> bool {
        let state = self.bundles.get_or_init(|| self.load_all()).await;
        matches!(state, LoadState::Ready(_))
    }

    async fn load_all(&self) -> LoadState {
        tracing::info!("🌐 Loading translations for {} languages", Language::ALL.len());

        let state = match self.fetch_bundles().await {
            Ok(bundles) => {
                tracing::info!("✅ Translations loaded for all languages");
                LoadState::Ready(bundles)
            }
            Err(e) => {
                tracing::error!("❌ Failed to load translations: {}", e);
                LoadState::Failed
            }
        };

        self.restore_saved_language();
        state
    }

    async fn fetch_bundles(&self) -> Result<HashMap<Language, Bundle>> {
        let mut bundles = HashMap::new();
        for language in Language::ALL {
            let value = self.loader.load(language).await?;
            bundles.insert(language, Bundle::from_value(language, value)?);
            tracing::debug!("Loaded bundle '{}'", language);
        }
        Ok(bundles)
    }

    fn restore_saved_language(&self) {
        match self.preferences.get(LANGUAGE_PREFERENCE_KEY) {
            Ok(Some(code)) => match code.parse::<Language>() {
                Ok(language) => {
                    *self.locale.write().unwrap_or_else(PoisonError::into_inner) =
                        DocumentLocale::for_language(language);
                }
                Err(_) => tracing::warn!("⚠️ Ignoring saved language '{}'", code),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!("⚠️ Could not read saved language: {}", e),
        }
        tracing::info!("Current language set to: {}", self.current_language());
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.bundles.get(), Some(LoadState::Ready(_)))
    }

    pub fn current_language(&self) -> Language {
        self.document_locale().lang
    }

    pub fn fallback_language(&self) -> Language {
        self.fallback_language
    }

    pub fn document_locale(&self) -> DocumentLocale {
        *self.locale.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switches the active language. Unsupported codes are ignored without
    /// notification; the return value tells whether the switch happened.
    pub fn set_language(&self, code: &str) -> bool {
        let Ok(language) = code.parse::<Language>() else {
            tracing::debug!("Ignoring unsupported language code '{}'", code);
            return false;
        };

        *self.locale.write().unwrap_or_else(PoisonError::into_inner) =
            DocumentLocale::for_language(language);

        if let Err(e) = self.preferences.set(LANGUAGE_PREFERENCE_KEY, language.code()) {
            tracing::warn!("⚠️ Could not persist language '{}': {}", language, e);
        }

        // 沒有訂閱者時 send 會回傳錯誤，忽略即可
        let _ = self.changes.send(LanguageChanged);
        tracing::info!("🌐 Language set to: {}", language);
        true
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LanguageChanged> {
        self.changes.subscribe()
    }

    /// Resolves `key` in the active language, then the fallback language,
    /// then `fallback`, then the key itself.
    pub fn t(&self, key: &str, fallback: Option<&str>) -> String {
        let Some(LoadState::Ready(bundles)) = self.bundles.get() else {
            return fallback.unwrap_or(key).to_string();
        };

        let current = self.current_language();
        if let Some(text) = bundles.get(&current).and_then(|b| b.lookup(key)) {
            return text.to_string();
        }

        if current != self.fallback_language {
            if let Some(text) = bundles
                .get(&self.fallback_language)
                .and_then(|b| b.lookup(key))
            {
                tracing::debug!(
                    "Translation key '{}' missing in '{}', using '{}'",
                    key,
                    current,
                    self.fallback_language
                );
                return text.to_string();
            }
        }

        tracing::debug!("Missing translation key: '{}'", key);
        fallback.unwrap_or(key).to_string()
    }

    /// [`Translator::t`] followed by `{name}` placeholder substitution.
    pub fn t_fmt(&self, key: &str, fallback: Option<&str>, args: &[(&str, String)]) -> String {
        let mut text = self.t(key, fallback);
        for (name, value) in args {
            text = text.replace(&format!("{{{}}}", name), value);
        }
        text
    }

    /// Keys present in the fallback bundle but absent from `language`.
    pub fn missing_keys(&self, language: Language) -> Vec<String> {
        let Some(LoadState::Ready(bundles)) = self.bundles.get() else {
            return Vec::new();
        };
        let (Some(reference), Some(target)) =
            (bundles.get(&self.fallback_language), bundles.get(&language))
        else {
            return Vec::new();
        };

        let present = target.keys();
        reference
            .keys()
            .into_iter()
            .filter(|key| !present.contains(key))
            .collect()
    }
}
