use crate::drive::api::{DriveApi, RemoteItem};
use crate::drive::operations::estimate::{DriveSizeEstimator, SizeEstimator, check_capacity};
use crate::drive::operations::filter::{FilterDecision, TransferOptions};
use crate::drive::operations::plan::{PlannedItem, plan_entry};
use crate::drive::operations::report::{SkipReason, TransferDescriptor, TransferReport};
use crate::drive::operations::walk::{RemoteWalker, WalkEntry};
use crate::drive::utils::progress::TransferTimer;
use crate::drive::utils::space::SpaceMeter;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Trait for downloading files and folders from the drive.
pub trait Downloader {
    /// Download a single file or a whole folder.
    ///
    /// # Arguments
    /// * `item_id` - Remote file or folder to download
    /// * `local_path` - Destination directory on the local filesystem, ignored
    ///   when `options.return_content` keeps the content in memory
    /// * `options` - Filter, recursion and overwrite settings
    ///
    /// # Returns
    /// * `Result<TransferReport>` - What was transferred, skipped and failed.
    ///   Per-item failures are collected in the report; only a missing root
    ///   item or a failed capacity check abort the run.
    async fn download(
        &self,
        item_id: &str,
        local_path: &Path,
        options: &TransferOptions,
    ) -> Result<TransferReport>;
}

/// Implementation of Downloader over any drive backend.
pub struct DriveDownloader<'a, A> {
    api: &'a A,
    meter: &'a dyn SpaceMeter,
}

impl<'a, A: DriveApi> DriveDownloader<'a, A> {
    pub fn new(api: &'a A, meter: &'a dyn SpaceMeter) -> Self {
        Self { api, meter }
    }

    /// Filter one walked entry and fetch it when accepted.
    async fn transfer_entry(
        &self,
        entry: WalkEntry,
        dest: Option<&Path>,
        options: &TransferOptions,
        report: &mut TransferReport,
    ) {
        let label = entry.relative_path().display().to_string();
        let planned = match plan_entry(entry, dest, options) {
            Ok(Some(planned)) => planned,
            Ok(None) => return,
            Err(e) => {
                eprintln!("Failed to download {label}: {e}");
                report.fail(label);
                return;
            }
        };
        let label = planned.relative.display().to_string();

        match planned.decision {
            FilterDecision::TypeMismatch => report.skip(label, SkipReason::TypeMismatch),
            FilterDecision::AlreadyExists => {
                println!("File {label} already exists locally, skipping");
                report.skip(label, SkipReason::AlreadyExists);
            }
            FilterDecision::Accept => {
                println!("Downloading {}...", planned.name);
                let timer = TransferTimer::start();
                match self.fetch(&planned, dest).await {
                    Ok(descriptor) => {
                        println!("{}", timer.summary(descriptor.size));
                        report.transferred.push(descriptor);
                    }
                    Err(e) => {
                        eprintln!("Failed to download {label}: {e}");
                        report.fail(label);
                    }
                }
            }
        }
    }

    /// Fetch the content of one item and write it below `dest`, or keep it
    /// in the descriptor when there is no destination.
    async fn fetch(&self, planned: &PlannedItem, dest: Option<&Path>) -> Result<TransferDescriptor> {
        let mut descriptor = TransferDescriptor::new(&planned.item, &planned.name);

        match dest {
            Some(dir) => {
                let target = dir.join(&planned.relative);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).await?;
                }
                descriptor.size = self.api.download_to(&planned.item, &target).await?;
                log::debug!("wrote {} bytes to {}", descriptor.size, target.display());
                descriptor.local_path = Some(target);
            }
            None => {
                let content = self.api.download(&planned.item).await?;
                descriptor.size = content.len() as u64;
                descriptor.content = Some(content);
            }
        }
        Ok(descriptor)
    }

    async fn download_folder(
        &self,
        root: &RemoteItem,
        dest: Option<&Path>,
        options: &TransferOptions,
        report: &mut TransferReport,
    ) {
        let mut walker = RemoteWalker::new(self.api, root.id.clone(), options.recursive);
        while let Some(entry) = walker.next().await {
            match entry {
                Ok(entry) => self.transfer_entry(entry, dest, options, report).await,
                Err(e) => {
                    eprintln!("{e}");
                    report.fail(e.to_string());
                }
            }
        }
    }
}

impl<A: DriveApi> Downloader for DriveDownloader<'_, A> {
    async fn download(
        &self,
        item_id: &str,
        local_path: &Path,
        options: &TransferOptions,
    ) -> Result<TransferReport> {
        let root = self.api.get_item(item_id).await?;
        let dest = (!options.return_content).then_some(local_path);

        let estimate = DriveSizeEstimator::new(self.api)
            .estimate(&root, dest, options)
            .await;
        log::info!(
            "download estimate: {} item(s), {} bytes, {} skipped",
            estimate.accepted,
            estimate.total_bytes,
            estimate.skipped
        );
        check_capacity(&estimate, dest, self.meter)?;

        if let Some(dir) = dest {
            fs::create_dir_all(dir).await?;
        }

        let mut report = TransferReport::default();
        if root.is_folder() {
            self.download_folder(&root, dest, options, &mut report).await;
        } else {
            let entry = WalkEntry {
                dir: PathBuf::new(),
                item: root,
            };
            self.transfer_entry(entry, dest, options, &mut report).await;
        }
        Ok(report)
    }
}
