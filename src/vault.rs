//! At-rest document store.
//!
//! Open editors cover only part of the collection; the rest lives on disk
//! (or wherever the host keeps it). The [`Vault`] trait is the minimal
//! surface propagation needs: enumerate, read, write. Reads and writes may
//! suspend; the propagator processes at-rest documents strictly one at a
//! time, so implementations never see two in-flight operations.

use std::path::PathBuf;

use url::Url;

use crate::error::{SyncError, SyncResult};

const LOG_TARGET: &str = "kagami::vault";

/// The document collection at rest.
pub trait Vault: Send + Sync {
    /// Every document in the collection, open or not, in a deterministic
    /// order.
    fn list_documents(&self) -> impl Future<Output = SyncResult<Vec<Url>>> + Send;

    /// Full content of one document.
    fn read(&self, uri: &Url) -> impl Future<Output = SyncResult<String>> + Send;

    /// Replace the full content of one document.
    fn write(&self, uri: &Url, content: &str) -> impl Future<Output = SyncResult<()>> + Send;
}

/// A vault backed by a directory of markdown files.
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(uri: &Url) -> SyncResult<PathBuf> {
        uri.to_file_path()
            .map_err(|_| SyncError::document_not_found(uri))
    }
}

impl Vault for FsVault {
    async fn list_documents(&self) -> SyncResult<Vec<Url>> {
        let mut pending = vec![self.root.clone()];
        let mut documents = Vec::new();

        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let name = entry.file_name();
                // Hidden entries hold host configuration, not documents
                if name.to_string_lossy().starts_with('.') {
                    continue;
                }
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if path.extension().is_some_and(|ext| ext == "md") {
                    match Url::from_file_path(&path) {
                        Ok(uri) => documents.push(uri),
                        Err(()) => {
                            log::warn!(
                                target: LOG_TARGET,
                                "Skipping document with unrepresentable path: {}",
                                path.display()
                            );
                        }
                    }
                }
            }
        }

        // read_dir order is platform-dependent; sort for deterministic
        // write ordering across passes
        documents.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(documents)
    }

    async fn read(&self, uri: &Url) -> SyncResult<String> {
        let path = Self::path_for(uri)?;
        Ok(tokio::fs::read_to_string(path).await?)
    }

    async fn write(&self, uri: &Url, content: &str) -> SyncResult<()> {
        let path = Self::path_for(uri)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
