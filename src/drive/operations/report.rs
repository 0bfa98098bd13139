// Per-run transfer bookkeeping shared by downloads and uploads
use std::path::PathBuf;

use bytes::Bytes;
use serde::Serialize;

use crate::drive::api::RemoteItem;
use crate::drive::utils::path::extension_of;
use crate::error::{PartialTransferSnafu, Result};
use snafu::ensure;

/// One transferred item. The content buffer is only filled when the run
/// keeps downloads in memory and is never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct TransferDescriptor {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub extension: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
    #[serde(skip)]
    pub content: Option<Bytes>,
}

impl TransferDescriptor {
    /// Describe `item` under its local `name`; size defaults to the remote size.
    pub fn new(item: &RemoteItem, name: &str) -> Self {
        Self {
            id: item.id.clone(),
            name: name.to_string(),
            mime_type: item.mime_type.clone(),
            extension: extension_of(name),
            size: item.size,
            local_path: None,
            content: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    TypeMismatch,
    AlreadyExists,
    /// Subdirectory of an upload without recursion.
    NotRecursive,
    /// Symbolic link to a directory; never followed.
    SymlinkedDirectory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub path: String,
    pub reason: SkipReason,
}

/// Outcome of a download or upload run.
#[derive(Debug, Default, Serialize)]
pub struct TransferReport {
    pub transferred: Vec<TransferDescriptor>,
    pub skipped: Vec<SkippedItem>,
    pub failed: Vec<String>,
}

impl TransferReport {
    pub fn skip(&mut self, path: impl Into<String>, reason: SkipReason) {
        let path = path.into();
        log::debug!("skip {path}: {reason:?}");
        self.skipped.push(SkippedItem { path, reason });
    }

    pub fn fail(&mut self, path: impl Into<String>) {
        self.failed.push(path.into());
    }

    pub fn total_bytes(&self) -> u64 {
        self.transferred.iter().map(|d| d.size).sum()
    }

    /// Turn collected per-item failures into an error once the run is over.
    pub fn ensure_complete(&self) -> Result<()> {
        ensure!(
            self.failed.is_empty(),
            PartialTransferSnafu {
                failed: self.failed.clone(),
            }
        );
        Ok(())
    }
}
