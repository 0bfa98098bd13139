use crate::drive::api::{DriveApi, ItemKind, RemoteItem};
use crate::drive::operations::filter::{FilterDecision, TransferOptions};
use crate::drive::operations::report::{SkipReason, TransferDescriptor, TransferReport};
use crate::drive::utils::path::{basename, extension_of};
use crate::drive::utils::progress::TransferTimer;
use crate::error::{
    FileAlreadyExistsSnafu, FolderAlreadyExistsSnafu, FolderNotFoundSnafu, PathNotFoundSnafu,
    Result,
};
use async_recursion::async_recursion;
use bytes::Bytes;
use snafu::{OptionExt, ensure};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Trait for uploading local files and directories into a drive folder.
pub trait Uploader {
    /// Upload a single file or a directory into a remote folder.
    ///
    /// # Arguments
    /// * `folder_id` - Remote folder receiving the upload
    /// * `local_path` - Source file or directory on the local filesystem
    /// * `create_folder` - For directories, create a remote folder named after
    ///   the directory instead of reusing an existing one
    /// * `options` - Filter, recursion and overwrite settings
    ///
    /// # Returns
    /// * `Result<TransferReport>` - What was uploaded, skipped and failed
    async fn upload(
        &self,
        folder_id: &str,
        local_path: &Path,
        create_folder: bool,
        options: &TransferOptions,
    ) -> Result<TransferReport>;
}

/// Implementation of Uploader over any drive backend.
pub struct DriveUploader<'a, A> {
    api: &'a A,
}

/// Outcome of offering one local file for upload.
enum FileOutcome {
    Uploaded(TransferDescriptor),
    Skipped(SkipReason),
}

impl<'a, A: DriveApi> DriveUploader<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Upload one file into `folder_id`, replacing a same-named file when
    /// overwrite is on.
    async fn upload_file(
        &self,
        folder_id: &str,
        local_path: &Path,
        options: &TransferOptions,
    ) -> Result<FileOutcome> {
        let name = basename(local_path);
        let mime_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .to_string();
        let existing = self
            .api
            .find_child(folder_id, &name, ItemKind::File)
            .await?;

        match options.decide(&mime_type, &extension_of(&name), existing.is_some()) {
            FilterDecision::TypeMismatch => {
                return Ok(FileOutcome::Skipped(SkipReason::TypeMismatch));
            }
            FilterDecision::AlreadyExists => {
                return Ok(FileOutcome::Skipped(SkipReason::AlreadyExists));
            }
            FilterDecision::Accept => {}
        }

        println!("Uploading {name}...");
        let timer = TransferTimer::start();
        let content = Bytes::from(fs::read(local_path).await?);
        let size = content.len() as u64;

        let item = match existing {
            Some(existing) => {
                log::debug!("replacing content of {} ({})", existing.id, name);
                self.api.update_file(&existing.id, &mime_type, content).await?
            }
            None => {
                self.api
                    .create_file(folder_id, &name, &mime_type, content)
                    .await?
            }
        };
        println!("{}", timer.summary(size));

        let mut descriptor = TransferDescriptor::new(&item, &name);
        descriptor.size = size;
        descriptor.local_path = Some(local_path.to_path_buf());
        Ok(FileOutcome::Uploaded(descriptor))
    }

    /// Remote folder that receives the contents of directory `name`.
    async fn target_folder(
        &self,
        parent_id: &str,
        name: &str,
        create_folder: bool,
    ) -> Result<RemoteItem> {
        let existing = self
            .api
            .find_child(parent_id, name, ItemKind::Folder)
            .await?;

        if create_folder {
            ensure!(
                existing.is_none(),
                FolderAlreadyExistsSnafu { name, parent_id }
            );
            let folder = self.api.create_folder(parent_id, name).await?;
            println!("Created folder {name} ({})", folder.id);
            Ok(folder)
        } else {
            existing.context(FolderNotFoundSnafu { name, parent_id })
        }
    }

    /// Upload `entries` of a local directory into `folder_id`.
    ///
    /// A subdirectory is listed before its remote folder is created. When it
    /// cannot be listed it is recorded as failed and its siblings still go.
    #[async_recursion(?Send)]
    async fn upload_dir(
        &self,
        folder_id: &str,
        entries: Vec<PathBuf>,
        prefix: &str,
        options: &TransferOptions,
        report: &mut TransferReport,
    ) {
        for path in entries {
            let label = format!("{prefix}{}", basename(&path));
            let metadata = match fs::symlink_metadata(&path).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    eprintln!("Failed to upload {label}: {e}");
                    report.fail(label);
                    continue;
                }
            };

            if metadata.is_symlink() && path.is_dir() {
                log::info!("not following symlinked directory {}", path.display());
                report.skip(label, SkipReason::SymlinkedDirectory);
                continue;
            }

            if metadata.is_dir() {
                if !options.recursive {
                    report.skip(label, SkipReason::NotRecursive);
                    continue;
                }
                let children = match list_dir(&path).await {
                    Ok(children) => children,
                    Err(e) => {
                        eprintln!("Failed to read directory {label}: {e}");
                        report.fail(label);
                        continue;
                    }
                };
                let sub = match self.subfolder(folder_id, &basename(&path)).await {
                    Ok(sub) => sub,
                    Err(e) => {
                        eprintln!("Failed to upload {label}: {e}");
                        report.fail(label);
                        continue;
                    }
                };
                self.upload_dir(&sub.id, children, &format!("{label}/"), options, report)
                    .await;
                continue;
            }

            match self.upload_file(folder_id, &path, options).await {
                Ok(FileOutcome::Uploaded(descriptor)) => report.transferred.push(descriptor),
                Ok(FileOutcome::Skipped(reason)) => {
                    if reason == SkipReason::AlreadyExists {
                        println!("File {label} already exists in the folder, skipping");
                    }
                    report.skip(label, reason);
                }
                Err(e) => {
                    eprintln!("Failed to upload {label}: {e}");
                    report.fail(label);
                }
            }
        }
    }

    /// Existing remote subfolder with `name`, created when missing.
    async fn subfolder(&self, parent_id: &str, name: &str) -> Result<RemoteItem> {
        match self
            .api
            .find_child(parent_id, name, ItemKind::Folder)
            .await?
        {
            Some(folder) => Ok(folder),
            None => self.api.create_folder(parent_id, name).await,
        }
    }
}

/// Entries of a local directory, sorted by path.
async fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

impl<A: DriveApi> Uploader for DriveUploader<'_, A> {
    async fn upload(
        &self,
        folder_id: &str,
        local_path: &Path,
        create_folder: bool,
        options: &TransferOptions,
    ) -> Result<TransferReport> {
        ensure!(
            local_path.exists(),
            PathNotFoundSnafu {
                path: local_path.to_path_buf()
            }
        );

        let mut report = TransferReport::default();
        if local_path.is_file() {
            match self.upload_file(folder_id, local_path, options).await? {
                FileOutcome::Uploaded(descriptor) => report.transferred.push(descriptor),
                FileOutcome::Skipped(SkipReason::AlreadyExists) => {
                    return FileAlreadyExistsSnafu {
                        name: basename(local_path),
                        folder_id,
                    }
                    .fail();
                }
                FileOutcome::Skipped(reason) => report.skip(basename(local_path), reason),
            }
            return Ok(report);
        }

        let entries = list_dir(local_path).await?;
        let name = basename(local_path);
        let folder = self.target_folder(folder_id, &name, create_folder).await?;
        self.upload_dir(&folder.id, entries, "", options, &mut report)
            .await;
        Ok(report)
    }
}
