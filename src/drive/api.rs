// Remote item model and the backend seam shared by all drive operations
use crate::drive::constants::{FOLDER_MIME_TYPE, GOOGLE_APPS_MIME_PREFIX};
use crate::error::Result;
use bytes::Bytes;
use serde::Serialize;
use std::path::Path;

/// A file or folder entry in the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteItem {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    /// Size in bytes. Folders and Google-native documents report 0.
    pub size: u64,
    pub parents: Vec<String>,
}

impl RemoteItem {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    /// Documents, sheets and the like that only exist inside Google Drive.
    pub fn is_google_native(&self) -> bool {
        !self.is_folder() && self.mime_type.starts_with(GOOGLE_APPS_MIME_PREFIX)
    }
}

/// Kind filter used when looking up a child by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Folder,
    File,
}

impl ItemKind {
    pub fn matches(&self, item: &RemoteItem) -> bool {
        match self {
            ItemKind::Folder => item.is_folder(),
            ItemKind::File => !item.is_folder(),
        }
    }
}

/// Export target for a Google-native document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportFormat {
    pub mime_type: &'static str,
    pub extension: &'static str,
}

/// Export format used when downloading a Google-native document, if it has one.
pub fn export_format(mime_type: &str) -> Option<ExportFormat> {
    let (mime_type, extension) = match mime_type {
        "application/vnd.google-apps.document" => ("application/pdf", ".pdf"),
        "application/vnd.google-apps.spreadsheet" => (
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ".xlsx",
        ),
        "application/vnd.google-apps.presentation" => (
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            ".pptx",
        ),
        _ => return None,
    };
    Some(ExportFormat {
        mime_type,
        extension,
    })
}

/// Remote operations every drive backend provides.
///
/// Each call performs one blocking round trip (or one logical operation) and
/// never retries.
pub trait DriveApi {
    /// Fetch metadata of a single item.
    async fn get_item(&self, id: &str) -> Result<RemoteItem>;

    /// List the direct, non-trashed children of a folder in listing order.
    async fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteItem>>;

    /// Find a direct child of `folder_id` by exact name and kind.
    async fn find_child(
        &self,
        folder_id: &str,
        name: &str,
        kind: ItemKind,
    ) -> Result<Option<RemoteItem>>;

    /// Create a folder named `name` inside `parent_id`.
    async fn create_folder(&self, parent_id: &str, name: &str) -> Result<RemoteItem>;

    /// Create a new file inside `folder_id` holding `content`.
    async fn create_file(
        &self,
        folder_id: &str,
        name: &str,
        mime_type: &str,
        content: Bytes,
    ) -> Result<RemoteItem>;

    /// Replace the content of an existing file, keeping its id and parents.
    async fn update_file(&self, id: &str, mime_type: &str, content: Bytes) -> Result<RemoteItem>;

    /// Fetch the full content of a file. Google-native documents are exported.
    async fn download(&self, item: &RemoteItem) -> Result<Bytes>;

    /// Write the content of a file to `path` and return the number of bytes
    /// written. Backends that can stream override this.
    async fn download_to(&self, item: &RemoteItem, path: &Path) -> Result<u64> {
        let content = self.download(item).await?;
        tokio::fs::write(path, &content).await?;
        Ok(content.len() as u64)
    }
}
