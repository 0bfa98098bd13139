use std::collections::VecDeque;
use std::path::PathBuf;

use futures::Stream;

use crate::drive::api::{DriveApi, RemoteItem};
use crate::drive::utils::path::sanitize_name;
use crate::error::{Error, Result};

/// One item produced by a [`RemoteWalker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Folder path of the item relative to the starting folder, built from
    /// sanitized folder names.
    pub dir: PathBuf,
    pub item: RemoteItem,
}

impl WalkEntry {
    /// Relative path of the item itself, using its display name.
    pub fn relative_path(&self) -> PathBuf {
        self.dir.join(&self.item.name)
    }
}

struct Frame {
    dir: PathBuf,
    pending: VecDeque<RemoteItem>,
}

/// Lazy depth-first walk over the children of a remote folder.
///
/// A folder is listed only when the walk reaches it, so the sequence is
/// bounded by the remote contents at that moment. The walker is consumed as
/// it goes; walking again needs a new walker and fresh listings. With
/// recursion enabled, subfolders are expanded in place and not yielded
/// themselves; without it, folder children are yielded like any other item.
pub struct RemoteWalker<'a, A> {
    api: &'a A,
    recursive: bool,
    start: Option<String>,
    stack: Vec<Frame>,
}

impl<'a, A: DriveApi> RemoteWalker<'a, A> {
    pub fn new(api: &'a A, folder_id: impl Into<String>, recursive: bool) -> Self {
        Self {
            api,
            recursive,
            start: Some(folder_id.into()),
            stack: Vec::new(),
        }
    }

    /// List a folder and push its children as the new innermost frame.
    async fn descend(&mut self, folder_id: &str, dir: PathBuf) -> Result<()> {
        let children = self
            .api
            .list_children(folder_id)
            .await
            .map_err(|e| Error::ListFolderFailed {
                id: folder_id.to_string(),
                source: Box::new(e),
            })?;
        log::debug!(
            "walk folder_id={folder_id} dir={} children={}",
            dir.display(),
            children.len()
        );
        self.stack.push(Frame {
            dir,
            pending: children.into(),
        });
        Ok(())
    }

    /// Next item in the walk. A folder that cannot be listed is reported as
    /// an error entry and the walk continues with its siblings.
    pub async fn next(&mut self) -> Option<Result<WalkEntry>> {
        if let Some(folder_id) = self.start.take() {
            if let Err(e) = self.descend(&folder_id, PathBuf::new()).await {
                return Some(Err(e));
            }
        }

        loop {
            let frame = self.stack.last_mut()?;
            let Some(item) = frame.pending.pop_front() else {
                self.stack.pop();
                continue;
            };
            let dir = frame.dir.clone();

            if item.is_folder() && self.recursive {
                let sub_dir = match sanitize_name(&item.name) {
                    Ok(name) => dir.join(name),
                    Err(e) => return Some(Err(e)),
                };
                if let Err(e) = self.descend(&item.id, sub_dir).await {
                    return Some(Err(e));
                }
                continue;
            }

            return Some(Ok(WalkEntry { dir, item }));
        }
    }

    /// Adapt the walker into a stream of entries.
    pub fn into_stream(self) -> impl Stream<Item = Result<WalkEntry>> + 'a
    where
        A: 'a,
    {
        futures::stream::unfold(self, |mut walker| async move {
            let entry = walker.next().await?;
            Some((entry, walker))
        })
    }
}
