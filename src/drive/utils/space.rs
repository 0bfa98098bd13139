// Local capacity probing used before bulk downloads
use std::path::{Path, PathBuf};

use sysinfo::{Disks, MemoryRefreshKind, RefreshKind, System};

/// Source of free-capacity figures for the host.
pub trait SpaceMeter {
    /// Bytes available to the current user on the filesystem holding `path`,
    /// or `None` when the filesystem cannot be determined.
    fn available_disk(&self, path: &Path) -> Option<u64>;

    /// Bytes of memory available for new allocations.
    fn available_memory(&self) -> u64;
}

/// Meter backed by the host's mounted disks and memory counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemMeter;

impl SpaceMeter for SystemMeter {
    fn available_disk(&self, path: &Path) -> Option<u64> {
        let target = existing_ancestor(path)?;
        let disks = Disks::new_with_refreshed_list();
        disks
            .list()
            .iter()
            .filter(|disk| target.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .map(|disk| disk.available_space())
    }

    fn available_memory(&self) -> u64 {
        let system = System::new_with_specifics(
            RefreshKind::new().with_memory(MemoryRefreshKind::everything()),
        );
        system.available_memory()
    }
}

/// Canonical form of the closest ancestor of `path` that exists on disk.
fn existing_ancestor(path: &Path) -> Option<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(path)
    };
    absolute
        .ancestors()
        .find(|candidate| candidate.exists())
        .and_then(|candidate| candidate.canonicalize().ok())
}

/// Whether `required` bytes fit into `available`. Equal sizes fit.
pub fn has_capacity(required: u64, available: u64) -> bool {
    required <= available
}
