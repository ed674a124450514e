//! JSON-lines backed training store
//!
//! One case per line, appended and never rewritten. A case is published to
//! readers only after its line is on disk. A failed append truncates the file
//! back to its previous length, and a torn final line left by a crash is
//! dropped on the next open.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::case::TrainingCase;
use super::store::{Published, TrainingStore};
use crate::error::StoreError;

pub struct JsonlTrainingStore {
    path: PathBuf,
    writer: Mutex<File>,
    published: Published,
}

/// State of the log's last line as found on open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tail {
    Clean,
    /// Last line parsed but has no terminating newline
    Unterminated,
    /// Last line is a partial write; keep only the first `keep` bytes
    Torn { keep: u64 },
}

struct LoadedLog {
    cases: Vec<TrainingCase>,
    tail: Tail,
}

impl JsonlTrainingStore {
    /// Open (or create) the log at `path` and load every existing case
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let log = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| StoreError::io(&path, e))?;
            parse_log(&path, &contents)?
        } else {
            LoadedLog {
                cases: Vec::new(),
                tail: Tail::Clean,
            }
        };

        let mut writer = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| StoreError::io(&path, e))?;

        match log.tail {
            Tail::Clean => {}
            Tail::Unterminated => {
                writer.write_all(b"\n").await.map_err(|e| StoreError::io(&path, e))?;
                writer.sync_data().await.map_err(|e| StoreError::io(&path, e))?;
            }
            Tail::Torn { keep } => {
                writer.set_len(keep).await.map_err(|e| StoreError::io(&path, e))?;
                writer.sync_data().await.map_err(|e| StoreError::io(&path, e))?;
            }
        }

        info!("Opened training log {} ({} cases)", path.display(), log.cases.len());

        Ok(Self {
            path,
            writer: Mutex::new(writer),
            published: Published::with_cases(log.cases),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_log(path: &Path, contents: &str) -> Result<LoadedLog, StoreError> {
    let mut cases = Vec::new();
    let mut tail = Tail::Clean;
    let mut offset = 0u64;

    for (index, line) in contents.split_inclusive('\n').enumerate() {
        let start = offset;
        offset += line.len() as u64;
        let terminated = line.ends_with('\n');

        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<TrainingCase>(line.trim_end()) {
            Ok(case) => {
                if !terminated {
                    tail = Tail::Unterminated;
                }
                cases.push(case);
            }
            // Only the unterminated final line can be a partial write
            Err(e) if !terminated => {
                warn!(
                    "Dropping torn final line {} of {} ({} bytes): {}",
                    index + 1,
                    path.display(),
                    line.len(),
                    e
                );
                tail = Tail::Torn { keep: start };
            }
            Err(e) => {
                return Err(StoreError::Corrupt {
                    path: path.to_path_buf(),
                    line: index + 1,
                    reason: e.to_string(),
                })
            }
        }
    }

    Ok(LoadedLog { cases, tail })
}

async fn write_line(writer: &mut File, line: &[u8]) -> std::io::Result<()> {
    writer.write_all(line).await?;
    writer.flush().await?;
    writer.sync_data().await
}

#[async_trait]
impl TrainingStore for JsonlTrainingStore {
    async fn append(&self, case: TrainingCase) -> Result<(), StoreError> {
        let mut line = serde_json::to_string(&case)?;
        line.push('\n');

        // Held until publication so file order matches snapshot order
        let mut writer = self.writer.lock().await;
        let prev_len = writer
            .metadata()
            .await
            .map_err(|e| StoreError::io(&self.path, e))?
            .len();

        if let Err(e) = write_line(&mut writer, line.as_bytes()).await {
            if let Err(rollback) = writer.set_len(prev_len).await {
                warn!(
                    "Could not truncate {} back to {} bytes after a failed append: {}",
                    self.path.display(),
                    prev_len,
                    rollback
                );
            }
            return Err(StoreError::io(&self.path, e));
        }

        let id = case.id();
        let total = self.published.publish(case).await;
        drop(writer);

        debug!("Persisted training case {} to {} ({} total)", id, self.path.display(), total);
        Ok(())
    }

    async fn snapshot(&self) -> Arc<Vec<TrainingCase>> {
        self.published.current().await
    }
}
