use std::{io, path::PathBuf};

use futures::AsyncWriteExt;
use serde::Serialize;

/// Append-only newline-delimited JSON log.
///
/// Each record is serialized to one line and appended in a single write.
/// The file is never read back by the pipeline.
#[derive(Debug, Clone)]
pub struct SongLog {
    path: PathBuf,
}

impl SongLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub async fn append<T: Serialize>(&self, record: &T) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            async_fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_vec(record).map_err(io::Error::other)?;
        line.push(b'\n');

        let mut file = async_fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await
    }
}
