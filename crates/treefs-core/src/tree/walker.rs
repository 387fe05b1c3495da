//! Breadth-first snapshots of a directory subtree.

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::{resolve, resolve_async, Entry};
use crate::fs::list::{list_directory, list_directory_async};
use crate::fs::path::normalize;
use crate::sequencer::Sequencer;
use crate::tree::depth::DepthTree;

/// Checks that `path` exists and resolves to a directory, and returns its entry.
///
/// The path is normalized first, so the returned entry carries an absolute path.
///
/// # Errors
///
/// - [`CoreError::NotFound`]: nothing exists at `path`.
/// - [`CoreError::NotADirectory`]: `path` is not a directory (a broken link
///   counts as a file).
/// - [`CoreError::RecursiveSymlink`] / [`CoreError::Io`]: resolution failed.
pub fn validate_root(path: &Path) -> CoreResult<Entry> {
    let path = normalize(path)?;
    match std::fs::symlink_metadata(&path) {
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(CoreError::NotFound(path)),
        Err(e) => return Err(CoreError::io(&path, e)),
        Ok(_) => {}
    }
    let root = resolve(&path, None)?;
    if !root.is_dir() {
        return Err(CoreError::NotADirectory(path));
    }
    Ok(root)
}

/// Async counterpart of [`validate_root`].
pub async fn validate_root_async(path: &Path) -> CoreResult<Entry> {
    let path = normalize(path)?;
    match tokio::fs::symlink_metadata(&path).await {
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(CoreError::NotFound(path)),
        Err(e) => return Err(CoreError::io(&path, e)),
        Ok(_) => {}
    }
    let root = resolve_async(&path, None).await?;
    if !root.is_dir() {
        return Err(CoreError::NotADirectory(path));
    }
    Ok(root)
}

/// Builds a [`DepthTree`] of everything under `root`, breadth-first.
///
/// The root sits at `segment_count(root) - 1`. Each directory's children are
/// appended one level below it, in listing order. Symlinked directories are
/// recorded but never descended into. Any failure aborts the walk; partial
/// trees are never returned.
///
/// # Errors
///
/// - [`CoreError::NotFound`] / [`CoreError::NotADirectory`]: see [`validate_root`].
/// - [`CoreError::Io`] / [`CoreError::RecursiveSymlink`]: a listing failed.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use treefs_core::walk;
///
/// let tree = walk(Path::new("/tmp/project")).unwrap();
/// for (depth, bucket) in tree.buckets() {
///     println!("{depth}: {} entries", bucket.len());
/// }
/// ```
pub fn walk(root: &Path) -> CoreResult<DepthTree> {
    let root = validate_root(root)?;
    let root_depth = root.depth();
    let mut queue: VecDeque<(PathBuf, usize)> =
        VecDeque::from([(root.path().to_path_buf(), root_depth)]);
    let mut tree = DepthTree::new(root, root_depth);

    while let Some((dir, depth)) = queue.pop_front() {
        tracing::debug!(dir = %dir.display(), depth, "walking directory");
        let children = list_directory(&dir)?;
        enqueue_subdirectories(&mut queue, &children, depth + 1);
        tree.extend(depth + 1, children);
    }

    tracing::debug!(entries = tree.len(), "walk finished");
    Ok(tree)
}

/// Async counterpart of [`walk`]. At most one filesystem call is in flight.
///
/// # Errors
///
/// Same as [`walk`], plus [`CoreError::Cancelled`] when `cancel` fires before
/// the walk finishes.
pub async fn walk_async(root: &Path, cancel: &CancellationToken) -> CoreResult<DepthTree> {
    let mut seq = Sequencer::new(cancel);
    let root = seq.run_next(validate_root_async(root)).await?;
    let root_depth = root.depth();
    let mut queue: VecDeque<(PathBuf, usize)> =
        VecDeque::from([(root.path().to_path_buf(), root_depth)]);
    let mut tree = DepthTree::new(root, root_depth);

    while let Some((dir, depth)) = queue.pop_front() {
        tracing::debug!(dir = %dir.display(), depth, "walking directory");
        let children = list_directory_async(&dir, &mut seq).await?;
        enqueue_subdirectories(&mut queue, &children, depth + 1);
        tree.extend(depth + 1, children);
    }

    if !seq.complete() {
        return Err(CoreError::Cancelled);
    }
    tracing::debug!(entries = tree.len(), "walk finished");
    Ok(tree)
}

fn enqueue_subdirectories(
    queue: &mut VecDeque<(PathBuf, usize)>,
    children: &[Entry],
    depth: usize,
) {
    queue.extend(
        children
            .iter()
            .filter(|child| child.is_traversable())
            .map(|child| (child.path().to_path_buf(), depth)),
    );
}
