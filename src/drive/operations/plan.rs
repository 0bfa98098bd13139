// Maps walked remote items to their local destination and filter decision
use std::path::{Path, PathBuf};

use crate::drive::api::RemoteItem;
use crate::drive::operations::filter::{FilterDecision, TransferOptions};
use crate::drive::operations::walk::WalkEntry;
use crate::drive::utils::path::{extension_of, local_name};
use crate::error::Result;

/// A remote file paired with where it would land and whether it passes the filter.
#[derive(Debug, Clone)]
pub struct PlannedItem {
    pub item: RemoteItem,
    /// Local name, including the export extension for native documents.
    pub name: String,
    pub extension: String,
    /// Path relative to the destination directory.
    pub relative: PathBuf,
    pub decision: FilterDecision,
}

/// Plan one walked entry. Folders are not transferable and yield `None`.
///
/// `dest` is the local destination directory; `None` when content is kept in
/// memory, in which case local existence never rejects an item.
pub fn plan_entry(
    entry: WalkEntry,
    dest: Option<&Path>,
    options: &TransferOptions,
) -> Result<Option<PlannedItem>> {
    if entry.item.is_folder() {
        return Ok(None);
    }

    let name = local_name(&entry.item)?;
    let extension = extension_of(&name);
    let relative = entry.dir.join(&name);
    let target = dest.map(|dir| dir.join(&relative));
    let decision = options.decide_local(&entry.item.mime_type, &extension, target.as_deref());

    Ok(Some(PlannedItem {
        item: entry.item,
        name,
        extension,
        relative,
        decision,
    }))
}
