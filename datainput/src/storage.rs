//! Durable record stores. A store only ever appends: there is no read path
//! and no compensation if a later pipeline stage fails.
use crate::config::StorageConfig;
use crate::errors::StorageError;
use crate::http::send_checked;
use crate::record::{EnrichedRecord, RecordKey};
use async_trait::async_trait;
use hyper::header::CONTENT_TYPE;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

#[async_trait]
pub trait RecordStore: Send + Sync {
    fn name(&self) -> &'static str;

    /// Appends one serialized record under `key` as a single atomic write.
    async fn append(&self, key: &RecordKey, payload: &str) -> Result<(), StorageError>;
}

/// Serializes `record` and appends it to `store`.
pub async fn write_record(
    store: &dyn RecordStore,
    record: &EnrichedRecord,
) -> Result<(), StorageError> {
    let payload = record.to_json()?;
    let key = record.key();

    store.append(&key, &payload).await?;

    tracing::debug!(
        store = store.name(),
        partition = %key.partition,
        row = %key.row,
        "Record written"
    );
    Ok(())
}

/// Builds the store selected in the config
pub async fn get_store(
    config: &StorageConfig,
    client: reqwest::Client,
) -> Result<Arc<dyn RecordStore>, std::io::Error> {
    let store: Arc<dyn RecordStore> = match config {
        StorageConfig::Filesystem { base_dir } => {
            Arc::new(FilesystemRecordStore::create(base_dir).await?)
        }
        StorageConfig::Http { url } => Arc::new(HttpRecordStore::new(client, url.clone())),
    };
    Ok(store)
}

/// Appends records as JSON lines to `<base_dir>/<partition>.jsonl`.
pub struct FilesystemRecordStore {
    base_dir: PathBuf,
    // Serializes appends so a rollback only ever cuts its own line
    write_lock: Mutex<()>,
}

impl FilesystemRecordStore {
    pub async fn create(base_dir: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let base_dir = base_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&base_dir).await?;
        Ok(FilesystemRecordStore {
            base_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn partition_path(&self, partition: &str) -> PathBuf {
        self.base_dir.join(format!("{partition}.jsonl"))
    }
}

#[async_trait]
impl RecordStore for FilesystemRecordStore {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    async fn append(&self, key: &RecordKey, payload: &str) -> Result<(), StorageError> {
        let mut line = String::with_capacity(payload.len() + 1);
        line.push_str(payload);
        line.push('\n');

        let path = self.partition_path(&key.partition);

        let _guard = self.write_lock.lock().await;
        tokio::task::spawn_blocking(move || append_line(&path, line.as_bytes()))
            .await
            .map_err(std::io::Error::other)??;
        Ok(())
    }
}

/// Appends `line` and syncs it to disk. On failure the file is cut back to
/// its previous length so no partial line stays behind.
fn append_line(path: &Path, line: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let start = file.metadata()?.len();

    let result = file.write_all(line).and_then(|()| file.sync_data());
    if result.is_err() {
        if let Err(e) = file.set_len(start) {
            tracing::error!(
                path = %path.display(),
                error = %e,
                "Could not remove partial record"
            );
        }
    }
    result
}

/// POSTs each record to a table-style REST endpoint. The key travels inside
/// the record as `PartitionKey`/`RowKey`.
pub struct HttpRecordStore {
    client: reqwest::Client,
    url: Url,
}

impl HttpRecordStore {
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        HttpRecordStore { client, url }
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn append(&self, _key: &RecordKey, payload: &str) -> Result<(), StorageError> {
        let request = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_owned());

        send_checked(request).await?;
        Ok(())
    }
}
