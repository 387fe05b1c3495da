//! Directory listing.
//!
//! Both forms return children in the order the underlying directory read
//! produced them. No sorting is applied.

use std::ffi::OsString;
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::{resolve, resolve_async, Entry};
use crate::sequencer::Sequencer;

/// Reads the raw child names of `dir`, in directory-read order.
///
/// # Errors
///
/// Returns [`CoreError::Io`] if the directory cannot be read.
pub fn read_names(dir: &Path) -> CoreResult<Vec<OsString>> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| CoreError::io(dir, e))?;

    read_dir
        .map(|dir_entry| {
            dir_entry
                .map(|e| e.file_name())
                .map_err(|e| CoreError::io(dir, e))
        })
        .collect()
}

/// Async counterpart of [`read_names`].
pub async fn read_names_async(dir: &Path) -> CoreResult<Vec<OsString>> {
    let mut read_dir = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| CoreError::io(dir, e))?;

    let mut names = Vec::new();
    while let Some(dir_entry) = read_dir
        .next_entry()
        .await
        .map_err(|e| CoreError::io(dir, e))?
    {
        names.push(dir_entry.file_name());
    }
    Ok(names)
}

/// Lists the immediate children of `dir` as resolved [`Entry`] values.
///
/// Fails on the first child that cannot be resolved.
///
/// # Errors
///
/// - [`CoreError::Io`]: the directory or one of its children cannot be read.
/// - [`CoreError::RecursiveSymlink`]: a child is a link to a link.
///
/// # Examples
///
/// ```no_run
/// use treefs_core::list_directory;
/// use std::path::Path;
///
/// let entries = list_directory(Path::new("/home/user")).unwrap();
/// for entry in &entries {
///     println!("{}", entry.basename());
/// }
/// ```
pub fn list_directory(dir: &Path) -> CoreResult<Vec<Entry>> {
    read_names(dir)?
        .into_iter()
        .map(|name| {
            let basename = name.to_string_lossy();
            resolve(&dir.join(&name), Some(&*basename))
        })
        .collect()
}

/// Lists the immediate children of `dir`, one filesystem call at a time.
///
/// The directory read and each child resolution run as separate steps of
/// `seq`, so cancelling the sequencer stops the listing between (or during)
/// any of them.
pub async fn list_directory_async(dir: &Path, seq: &mut Sequencer) -> CoreResult<Vec<Entry>> {
    let names = seq.run_next(read_names_async(dir)).await?;
    tracing::trace!(dir = %dir.display(), children = names.len(), "listing directory");

    let mut entries = Vec::with_capacity(names.len());
    for name in names {
        let basename = name.to_string_lossy();
        let child = dir.join(&name);
        let entry = seq.run_next(resolve_async(&child, Some(&*basename))).await?;
        entries.push(entry);
    }
    Ok(entries)
}
