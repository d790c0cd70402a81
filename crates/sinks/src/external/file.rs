//! File-backed `VirtualWriter`

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::VirtualWriter;

/// Writes chunks to a file, truncating any previous contents
pub struct FileWriter {
    file: File,
    path: PathBuf,
    name: String,
    length: u64,
}

impl FileWriter {
    /// Create (or truncate) the file at `path`
    pub async fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).await?;
        tracing::debug!(path = %path.display(), "created archive file");

        Ok(Self {
            file,
            name: path.display().to_string(),
            path,
            length: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl VirtualWriter for FileWriter {
    async fn write(&mut self, chunk: Bytes) -> io::Result<()> {
        self.file.write_all(&chunk).await?;
        self.length += chunk.len() as u64;
        Ok(())
    }

    fn length(&self) -> u64 {
        self.length
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn close(&mut self) -> io::Result<()> {
        self.file.flush().await?;
        self.file.sync_all().await
    }
}
