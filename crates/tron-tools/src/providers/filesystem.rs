//! Real filesystem implementation using `tokio::fs`.

use std::io;
use std::path::Path;

use async_trait::async_trait;

use crate::traits::FileSystemOps;

/// Real filesystem operations backed by `tokio::fs`.
pub struct RealFileSystem;

#[async_trait]
impl FileSystemOps for RealFileSystem {
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, io::Error> {
        tokio::fs::read(path).await
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<(), io::Error> {
        tokio::fs::write(path, content).await
    }

    async fn metadata(&self, path: &Path) -> Result<std::fs::Metadata, io::Error> {
        tokio::fs::metadata(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> Result<(), io::Error> {
        tokio::fs::create_dir_all(path).await
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
