use crate::domain::ports::FileSource;
use crate::utils::error::{BizError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// An uploaded file whose bytes are already in memory.
#[derive(Debug, Clone)]
pub struct InMemoryFile {
    name: String,
    bytes: Vec<u8>,
}

impl InMemoryFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

#[async_trait]
impl FileSource for InMemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_text(&self) -> Result<String> {
        String::from_utf8(self.bytes.clone()).map_err(|_| BizError::EncodingError {
            name: self.name.clone(),
        })
    }
}

/// A file on the local disk, read when the import runs.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
}

impl LocalFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FileSource for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_text(&self) -> Result<String> {
        let bytes = tokio::fs::read(&self.path).await?;
        String::from_utf8(bytes).map_err(|_| BizError::EncodingError {
            name: self.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_file_rejects_invalid_utf8() {
        let file = InMemoryFile::new("broken.csv", vec![0xff, 0xfe, 0x00]);
        assert!(matches!(
            file.read_text().await,
            Err(BizError::EncodingError { .. })
        ));
    }

    #[tokio::test]
    async fn test_local_file_reads_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("contacts.csv");
        std::fs::write(&path, "Name\nAli\n").unwrap();

        let file = LocalFile::new(&path);
        assert_eq!(file.name(), "contacts.csv");
        assert_eq!(file.read_text().await.unwrap(), "Name\nAli\n");
    }

    #[tokio::test]
    async fn test_local_file_missing() {
        let file = LocalFile::new("/definitely/not/here.json");
        assert!(matches!(file.read_text().await, Err(BizError::IoError(_))));
    }
}
