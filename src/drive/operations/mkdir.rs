// Folder creation operation trait and implementation
use crate::drive::api::{DriveApi, ItemKind, RemoteItem};
use crate::error::{FolderAlreadyExistsSnafu, InvalidNameSnafu, Result};
use snafu::ensure;

/// Trait for creating folders in the drive.
pub trait FolderCreator {
    /// Create a folder named `name` under `parent_id`.
    ///
    /// Fails when a folder with the same name already exists there.
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<RemoteItem>;
}

/// Implementation of FolderCreator over any drive backend.
pub struct DriveFolderCreator<'a, A> {
    api: &'a A,
}

impl<'a, A: DriveApi> DriveFolderCreator<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: DriveApi> FolderCreator for DriveFolderCreator<'_, A> {
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<RemoteItem> {
        ensure!(!name.trim().is_empty(), InvalidNameSnafu { name });

        let existing = self
            .api
            .find_child(parent_id, name, ItemKind::Folder)
            .await?;
        ensure!(
            existing.is_none(),
            FolderAlreadyExistsSnafu { name, parent_id }
        );

        let folder = self.api.create_folder(parent_id, name).await?;
        println!("Folder ID: \"{}\"", folder.id);
        Ok(folder)
    }
}
