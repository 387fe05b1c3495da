//! Bottom-up deletion of depth-indexed trees.
//!
//! Safety comes from the order, not from the removal primitive: entries are
//! removed deepest bucket first, files and links with `remove_file` and
//! directories with `remove_dir`. A directory that still has content when its
//! turn comes makes the deletion fail instead of being cleared recursively.

use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::Entry;
use crate::sequencer::Sequencer;
use crate::tree::depth::DepthTree;
use crate::tree::walker::{walk, walk_async};

/// Deletes every entry of `tree`, deepest first.
///
/// Aborts on the first failure. Entries removed before the failure stay
/// removed.
///
/// # Errors
///
/// Returns [`CoreError::Io`] for the first entry that could not be removed,
/// including a directory that is not empty.
pub fn delete_tree(tree: DepthTree) -> CoreResult<()> {
    let entries = tree.into_deletion_order();
    tracing::debug!(entries = entries.len(), "deleting tree");

    for entry in &entries {
        remove_entry(entry)?;
    }
    Ok(())
}

/// Async counterpart of [`delete_tree`]: one removal per sequencer step.
///
/// # Errors
///
/// Same as [`delete_tree`], plus [`CoreError::Cancelled`] if `cancel` fires
/// before the last removal.
pub async fn delete_tree_async(tree: DepthTree, cancel: &CancellationToken) -> CoreResult<()> {
    let mut seq = Sequencer::new(cancel);
    let entries = tree.into_deletion_order();
    tracing::debug!(entries = entries.len(), "deleting tree");

    for entry in &entries {
        seq.run_next(remove_entry_async(entry)).await?;
    }

    if !seq.complete() {
        return Err(CoreError::Cancelled);
    }
    Ok(())
}

/// Walks `root` and deletes everything under it, root included.
///
/// No cleanup is attempted beyond what the deletion completed before a
/// failing step.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use treefs_core::remove_tree;
///
/// remove_tree(Path::new("/tmp/build-output")).unwrap();
/// assert!(!Path::new("/tmp/build-output").exists());
/// ```
pub fn remove_tree(root: &Path) -> CoreResult<()> {
    let tree = walk(root)?;
    delete_tree(tree)
}

/// Async counterpart of [`remove_tree`]. Cancelling `cancel` stops either phase.
pub async fn remove_tree_async(root: &Path, cancel: &CancellationToken) -> CoreResult<()> {
    let tree = walk_async(root, cancel).await?;
    delete_tree_async(tree, cancel).await
}

fn remove_entry(entry: &Entry) -> CoreResult<()> {
    tracing::trace!(path = %entry.path().display(), "removing");
    let path = entry.path();
    if is_unlinkable(entry) {
        std::fs::remove_file(path).map_err(|e| CoreError::io(path, e))
    } else {
        std::fs::remove_dir(path).map_err(|e| CoreError::io(path, e))
    }
}

async fn remove_entry_async(entry: &Entry) -> CoreResult<()> {
    tracing::trace!(path = %entry.path().display(), "removing");
    let path = entry.path();
    if is_unlinkable(entry) {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| CoreError::io(path, e))
    } else {
        tokio::fs::remove_dir(path)
            .await
            .map_err(|e| CoreError::io(path, e))
    }
}

/// Links (including links to directories) and files are unlinked; only real
/// directories go through `remove_dir`.
fn is_unlinkable(entry: &Entry) -> bool {
    entry.is_symlink() || !entry.is_dir()
}
