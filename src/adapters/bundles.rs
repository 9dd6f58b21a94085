use crate::domain::language::Language;
use crate::domain::ports::BundleLoader;
use crate::utils::error::{BizError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Reads `{dir}/{code}.json`.
#[derive(Debug, Clone)]
pub struct DirBundleLoader {
    dir: PathBuf,
}

impl DirBundleLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl BundleLoader for DirBundleLoader {
    async fn load(&self, language: Language) -> Result<Value> {
        let path = self.dir.join(format!("{}.json", language.code()));
        tracing::debug!("📂 Loading bundle from {}", path.display());

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| BizError::BundleError {
                language: language.code().to_string(),
                message: format!("{}: {}", path.display(), e),
            })?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Fetches `{base_url}/{code}.json` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBundleLoader {
    base_url: String,
    client: Client,
}

impl HttpBundleLoader {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl BundleLoader for HttpBundleLoader {
    async fn load(&self, language: Language) -> Result<Value> {
        let url = format!("{}/{}.json", self.base_url, language.code());
        tracing::debug!("📡 Fetching bundle: {}", url);

        let response = self.client.get(&url).send().await?;
        tracing::debug!("Bundle response status: {}", response.status());

        if !response.status().is_success() {
            return Err(BizError::BundleError {
                language: language.code().to_string(),
                message: format!("HTTP {} from {}", response.status(), url),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

/// Serves bundles from memory and counts how often each one is requested.
#[derive(Debug, Default)]
pub struct StaticBundleLoader {
    bundles: HashMap<Language, Value>,
    delay: Option<Duration>,
    loads: AtomicUsize,
}

impl StaticBundleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundle(mut self, language: Language, bundle: Value) -> Self {
        self.bundles.insert(language, bundle);
        self
    }

    /// Simulated latency per bundle.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BundleLoader for StaticBundleLoader {
    async fn load(&self, language: Language) -> Result<Value> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.bundles
            .get(&language)
            .cloned()
            .ok_or_else(|| BizError::BundleError {
                language: language.code().to_string(),
                message: "no bundle registered".to_string(),
            })
    }
}
