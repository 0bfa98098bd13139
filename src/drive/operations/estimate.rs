use crate::drive::api::{DriveApi, RemoteItem};
use crate::drive::operations::filter::TransferOptions;
use crate::drive::operations::plan::plan_entry;
use crate::drive::operations::walk::{RemoteWalker, WalkEntry};
use crate::drive::utils::size::{format_gib, format_size};
use crate::drive::utils::space::{SpaceMeter, has_capacity};
use crate::error::{InsufficientMemorySnafu, InsufficientSpaceSnafu, Result};
use futures::StreamExt;
use snafu::ensure;
use std::path::{Path, PathBuf};

/// Sum of the sizes of the items a download would transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeEstimate {
    pub total_bytes: u64,
    pub accepted: usize,
    pub skipped: usize,
}

/// Trait for estimating the size of a download before performing it.
pub trait SizeEstimator {
    /// Walk the item (or folder) and sum the sizes of the files the filter accepts.
    ///
    /// # Arguments
    /// * `root` - Item the download starts from
    /// * `dest` - Local destination directory, `None` when content stays in memory
    /// * `options` - Filter and recursion settings of the run
    async fn estimate(
        &self,
        root: &RemoteItem,
        dest: Option<&Path>,
        options: &TransferOptions,
    ) -> SizeEstimate;
}

/// Implementation of SizeEstimator over any drive backend.
pub struct DriveSizeEstimator<'a, A> {
    api: &'a A,
}

impl<'a, A: DriveApi> DriveSizeEstimator<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: DriveApi> SizeEstimator for DriveSizeEstimator<'_, A> {
    async fn estimate(
        &self,
        root: &RemoteItem,
        dest: Option<&Path>,
        options: &TransferOptions,
    ) -> SizeEstimate {
        if !root.is_folder() {
            let entry = WalkEntry {
                dir: PathBuf::new(),
                item: root.clone(),
            };
            return SizeEstimate::default().add(entry, dest, options);
        }

        RemoteWalker::new(self.api, root.id.clone(), options.recursive)
            .into_stream()
            .fold(SizeEstimate::default(), |estimate, entry| async move {
                match entry {
                    Ok(entry) => estimate.add(entry, dest, options),
                    Err(e) => {
                        // The transfer pass reports the failure for this folder
                        log::warn!("estimate: {e}");
                        estimate
                    }
                }
            })
            .await
    }
}

impl SizeEstimate {
    fn add(mut self, entry: WalkEntry, dest: Option<&Path>, options: &TransferOptions) -> Self {
        match plan_entry(entry, dest, options) {
            Ok(Some(planned)) if planned.decision.is_accept() => {
                self.total_bytes += planned.item.size;
                self.accepted += 1;
            }
            Ok(Some(_)) | Err(_) => self.skipped += 1,
            Ok(None) => {}
        }
        self
    }
}

/// Fail closed when the estimate does not fit into the free capacity for
/// the run: disk space at `dest`, or available memory when content is kept
/// in memory.
pub fn check_capacity(
    estimate: &SizeEstimate,
    dest: Option<&Path>,
    meter: &dyn SpaceMeter,
) -> Result<()> {
    let required = estimate.total_bytes;
    match dest {
        Some(path) => {
            let Some(available) = meter.available_disk(path) else {
                eprintln!(
                    "Warning: could not determine free disk space for {}, skipping capacity check",
                    path.display()
                );
                return Ok(());
            };
            println!("Free disk space: {}", format_gib(available));
            println!("Total download size: {}", format_size(required));
            ensure!(
                has_capacity(required, available),
                InsufficientSpaceSnafu {
                    path: path.to_path_buf(),
                    required,
                    available,
                }
            );
        }
        None => {
            let available = meter.available_memory();
            println!("Available memory: {}", format_gib(available));
            println!("Total download size: {}", format_size(required));
            ensure!(
                has_capacity(required, available),
                InsufficientMemorySnafu {
                    required,
                    available,
                }
            );
        }
    }
    Ok(())
}
