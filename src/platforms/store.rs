use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::infrastructure::PlatformError;
use crate::models::PostedReviewRecord;

/// Where the mock platform keeps posted reviews.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Persist one record and return where it went.
    async fn write_one(&self, record: &PostedReviewRecord) -> Result<String, PlatformError>;

    /// Load every stored record, in no particular order.
    async fn read_all(&self) -> Result<Vec<PostedReviewRecord>, PlatformError>;
}

const MAX_NAME_ATTEMPTS: usize = 100;

/// One pretty-printed JSON file per review:
/// `<dir>/<business_id>_<timestamp with ':' replaced by '-'>.json`.
/// Existing files are never overwritten; a clash gets a `_<n>` suffix.
#[derive(Debug, Clone)]
pub struct FileReviewStore {
    dir: PathBuf,
}

impl FileReviewStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, record: &PostedReviewRecord) -> PathBuf {
        self.dir.join(format!("{}.json", Self::file_stem(record)))
    }

    fn file_stem(record: &PostedReviewRecord) -> String {
        let business_id = record.business_id.as_str().replace(['/', '\\'], "_");
        let timestamp = record.timestamp.replace(':', "-");
        format!("{}_{}", business_id, timestamp)
    }

    async fn create_record_file(
        &self,
        record: &PostedReviewRecord,
    ) -> Result<(fs::File, PathBuf), PlatformError> {
        let mut path = self.record_path(record);
        for attempt in 1..=MAX_NAME_ATTEMPTS {
            match fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => return Ok((file, path)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    path = self
                        .dir
                        .join(format!("{}_{}.json", Self::file_stem(record), attempt));
                }
                Err(e) => {
                    return Err(PlatformError::storage(
                        format!("cannot create {}", path.display()),
                        e,
                    ))
                }
            }
        }

        Err(PlatformError::storage(
            format!("no free file name for {}", self.record_path(record).display()),
            std::io::Error::from(std::io::ErrorKind::AlreadyExists),
        ))
    }
}

#[async_trait]
impl ReviewStore for FileReviewStore {
    async fn write_one(&self, record: &PostedReviewRecord) -> Result<String, PlatformError> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            PlatformError::storage(format!("cannot create {}", self.dir.display()), e)
        })?;

        let content = serde_json::to_string_pretty(record)?;
        let (mut file, path) = self.create_record_file(record).await?;
        let write_err = |e| PlatformError::storage(format!("cannot write {}", path.display()), e);
        file.write_all(content.as_bytes()).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;

        tracing::debug!(path = %path.display(), "review record written");
        Ok(path.display().to_string())
    }

    async fn read_all(&self) -> Result<Vec<PostedReviewRecord>, PlatformError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.dir).await.map_err(|e| {
            PlatformError::storage(format!("cannot read {}", self.dir.display()), e)
        })?;

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            PlatformError::storage(format!("cannot read {}", self.dir.display()), e)
        })? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let content = fs::read_to_string(&path)
                .await
                .map_err(|e| PlatformError::storage(format!("cannot read {}", path.display()), e))?;
            records.push(serde_json::from_str(&content)?);
        }

        Ok(records)
    }
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryReviewStore {
    records: Mutex<Vec<PostedReviewRecord>>,
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn write_one(&self, record: &PostedReviewRecord) -> Result<String, PlatformError> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.push(record.clone());
        Ok(format!("memory:{}", records.len() - 1))
    }

    async fn read_all(&self) -> Result<Vec<PostedReviewRecord>, PlatformError> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records.clone())
    }
}
