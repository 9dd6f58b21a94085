use crate::domain::language::Language;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Download sink: offers generated content as a file named `path`.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// An uploaded file: a name plus readable text content.
#[async_trait]
pub trait FileSource: Send + Sync {
    fn name(&self) -> &str;
    async fn read_text(&self) -> Result<String>;
}

/// Loads the raw translation tree for one language.
#[async_trait]
pub trait BundleLoader: Send + Sync {
    async fn load(&self, language: Language) -> Result<serde_json::Value>;
}

/// Persistent key/value store for user preferences.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Persists a value handed over by the auto-saver.
#[async_trait]
pub trait SaveHandler<T>: Send + Sync {
    async fn save(&self, data: &T) -> Result<()>;
}
