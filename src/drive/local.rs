//! Directory-backed drive backend
//!
//! Emulates the Drive item model on top of an OpenDAL filesystem operator so
//! every command can run offline. Item ids are paths relative to the root
//! (folders carry a trailing `/`); the root folder is addressed as `root`.

use bytes::Bytes;
use opendal::{ErrorKind, Metadata, Operator};

use crate::drive::api::{DriveApi, ItemKind, RemoteItem};
use crate::drive::constants::{FOLDER_MIME_TYPE, ROOT_FOLDER_ID};
use crate::drive::utils::path::sanitize_name;
use crate::error::{Error, InvalidNameSnafu, NotAFolderSnafu, Result};
use snafu::ensure;

#[derive(Clone)]
pub struct LocalDrive {
    operator: Operator,
}

impl LocalDrive {
    /// Open (and create if needed) a local drive rooted at `root`.
    pub fn new(root: &str) -> Result<Self> {
        std::fs::create_dir_all(root)?;
        let builder = opendal::services::Fs::default().root(root);
        Ok(Self {
            operator: Operator::new(builder)?.finish(),
        })
    }

    async fn stat(&self, path: &str, id: &str) -> Result<Metadata> {
        self.operator.stat(path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::NotFound { id: id.to_string() }
            } else {
                e.into()
            }
        })
    }

    async fn item_at(&self, path: &str) -> Result<RemoteItem> {
        let meta = self.stat(path, path).await?;
        Ok(to_item(path, &meta))
    }

    /// Resolve a folder id to its listing prefix, checking it is a folder.
    async fn folder_prefix(&self, id: &str) -> Result<String> {
        let prefix = folder_prefix(id);
        if prefix.is_empty() {
            return Ok(prefix);
        }
        let meta = self.stat(prefix.trim_end_matches('/'), id).await?;
        ensure!(meta.mode().is_dir(), NotAFolderSnafu { id });
        Ok(prefix)
    }
}

impl DriveApi for LocalDrive {
    async fn get_item(&self, id: &str) -> Result<RemoteItem> {
        let path = item_path(id);
        let meta = self.stat(&path, id).await?;
        Ok(to_item(&path, &meta))
    }

    async fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteItem>> {
        let prefix = self.folder_prefix(folder_id).await?;
        let list_path = if prefix.is_empty() { "/" } else { prefix.as_str() };
        let entries = self.operator.list(list_path).await?;

        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            let path = entry.path();
            if path == prefix || path == "/" {
                continue;
            }
            if entry.metadata().mode().is_dir() {
                items.push(to_item(path, entry.metadata()));
            } else {
                // Listing does not always carry the content length
                items.push(self.item_at(path).await?);
            }
        }
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn find_child(
        &self,
        folder_id: &str,
        name: &str,
        kind: ItemKind,
    ) -> Result<Option<RemoteItem>> {
        let children = self.list_children(folder_id).await?;
        Ok(children
            .into_iter()
            .find(|item| item.name == name && kind.matches(item)))
    }

    async fn create_folder(&self, parent_id: &str, name: &str) -> Result<RemoteItem> {
        ensure!(sanitize_name(name)? == name, InvalidNameSnafu { name });
        let path = format!("{}{name}/", self.folder_prefix(parent_id).await?);
        self.operator.create_dir(&path).await?;
        self.item_at(&path).await
    }

    async fn create_file(
        &self,
        folder_id: &str,
        name: &str,
        _mime_type: &str,
        content: Bytes,
    ) -> Result<RemoteItem> {
        ensure!(sanitize_name(name)? == name, InvalidNameSnafu { name });
        let path = format!("{}{name}", self.folder_prefix(folder_id).await?);
        self.operator.write(&path, content).await?;
        self.item_at(&path).await
    }

    async fn update_file(&self, id: &str, _mime_type: &str, content: Bytes) -> Result<RemoteItem> {
        let path = item_path(id);
        let meta = self.stat(&path, id).await?;
        if meta.mode().is_dir() {
            return Err(Error::Api {
                status: 400,
                message: format!("cannot replace the content of folder {id}"),
            });
        }
        self.operator.write(&path, content).await?;
        self.item_at(&path).await
    }

    async fn download(&self, item: &RemoteItem) -> Result<Bytes> {
        let path = item_path(&item.id);
        match self.operator.read(&path).await {
            Ok(buffer) => Ok(buffer.to_bytes()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound {
                id: item.id.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

fn is_root(id: &str) -> bool {
    let trimmed = id.trim_matches('/');
    trimmed.is_empty() || trimmed == ROOT_FOLDER_ID
}

fn item_path(id: &str) -> String {
    if is_root(id) {
        "/".to_string()
    } else {
        id.trim_start_matches('/').to_string()
    }
}

fn folder_prefix(id: &str) -> String {
    if is_root(id) {
        String::new()
    } else {
        format!("{}/", id.trim_matches('/'))
    }
}

fn to_item(path: &str, meta: &Metadata) -> RemoteItem {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return RemoteItem {
            id: ROOT_FOLDER_ID.to_string(),
            name: ROOT_FOLDER_ID.to_string(),
            mime_type: FOLDER_MIME_TYPE.to_string(),
            size: 0,
            parents: vec![],
        };
    }

    let (parent, name) = match trimmed.rsplit_once('/') {
        Some((parent, name)) => (format!("{parent}/"), name),
        None => (ROOT_FOLDER_ID.to_string(), trimmed),
    };

    if meta.mode().is_dir() {
        RemoteItem {
            id: format!("{trimmed}/"),
            name: name.to_string(),
            mime_type: FOLDER_MIME_TYPE.to_string(),
            size: 0,
            parents: vec![parent],
        }
    } else {
        RemoteItem {
            id: trimmed.to_string(),
            name: name.to_string(),
            mime_type: mime_guess::from_path(name)
                .first_or_octet_stream()
                .to_string(),
            size: meta.content_length(),
            parents: vec![parent],
        }
    }
}
