//! Per-directory index sources, and cleanup of generated index files.
//!
//! Both operations run on top of the recursive finder in file-only mode, so
//! they see exactly the non-directory entries a walk would, and the async
//! forms stop as soon as their token is cancelled.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::config::settings::IndexConfig;
use crate::error::{CoreError, CoreResult};
use crate::find::{EntryStream, FindRecurse};
use crate::fs::entry::Entry;
use crate::sequencer::{SequenceState, Sequencer};

/// Directory path mapped to the module names its index re-exports.
pub type IndexSources = BTreeMap<PathBuf, Vec<String>>;

/// Groups every source file under `root` by parent directory.
///
/// Module names are basenames with the source extension stripped, sorted
/// within each directory. Directories without a source file are absent.
///
/// # Errors
///
/// Returns the first traversal error, or [`CoreError::Cancelled`] if `cancel`
/// fires before the traversal completes.
pub async fn collect_index_sources(
    root: &Path,
    config: &IndexConfig,
    cancel: &CancellationToken,
) -> CoreResult<IndexSources> {
    let mut stream = EntryStream::recursive(root, true, cancel);
    let mut sources = IndexSources::new();

    while let Some(entry) = stream.next().await {
        add_source(&mut sources, config, &entry?);
    }
    if stream.state() != SequenceState::Completed {
        return Err(CoreError::Cancelled);
    }

    finish(&mut sources);
    Ok(sources)
}

/// Sync counterpart of [`collect_index_sources`].
pub fn collect_index_sources_sync(root: &Path, config: &IndexConfig) -> CoreResult<IndexSources> {
    let mut sources = IndexSources::new();
    for entry in FindRecurse::new(root, true) {
        add_source(&mut sources, config, &entry?);
    }
    finish(&mut sources);
    Ok(sources)
}

/// Unlinks every file under `root` named like the configured index file,
/// one at a time, and returns the removed paths in removal order.
///
/// The search finishes before the first removal.
///
/// # Errors
///
/// - The first traversal or unlink error. Files unlinked before it stay removed.
/// - [`CoreError::Cancelled`] if `cancel` fires before the last removal.
pub async fn remove_index_files(
    root: &Path,
    config: &IndexConfig,
    cancel: &CancellationToken,
) -> CoreResult<Vec<PathBuf>> {
    let mut stream = EntryStream::recursive(root, true, cancel);
    let mut doomed = Vec::new();
    while let Some(entry) = stream.next().await {
        let entry = entry?;
        if config.is_index_file(&entry) {
            doomed.push(entry.path().to_path_buf());
        }
    }
    if stream.state() != SequenceState::Completed {
        return Err(CoreError::Cancelled);
    }

    tracing::debug!(files = doomed.len(), "removing index files");
    let mut seq = Sequencer::new(cancel);
    for path in &doomed {
        seq.run_next(async {
            tokio::fs::remove_file(path)
                .await
                .map_err(|e| CoreError::io(path, e))
        })
        .await?;
    }
    if !seq.complete() {
        return Err(CoreError::Cancelled);
    }
    Ok(doomed)
}

fn add_source(sources: &mut IndexSources, config: &IndexConfig, entry: &Entry) {
    if !config.accepts(entry) {
        return;
    }
    let (Some(dir), Some(stem)) = (entry.path().parent(), module_name(entry, config)) else {
        return;
    };
    sources.entry(dir.to_path_buf()).or_default().push(stem);
}

fn module_name(entry: &Entry, config: &IndexConfig) -> Option<String> {
    let suffix = format!(".{}", config.source_extension);
    entry
        .basename()
        .strip_suffix(suffix.as_str())
        .map(str::to_string)
}

fn finish(sources: &mut IndexSources) {
    for names in sources.values_mut() {
        names.sort();
    }
}
