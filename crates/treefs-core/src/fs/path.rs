//! Path normalization and segment-based depth.
//!
//! Depth is the only platform-sensitive quantity in the crate: it is computed
//! by splitting the normalized path string on [`MAIN_SEPARATOR`] and counting
//! the pieces, never from character length.

use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

use crate::error::{CoreError, CoreResult};

/// Makes `path` absolute against the current directory and resolves `.` and
/// `..` lexically. Symlinks are not followed.
///
/// # Errors
///
/// Returns [`CoreError::Io`] if the current directory cannot be determined.
pub fn normalize(path: &Path) -> CoreResult<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| CoreError::io(path, e))?;
    Ok(normalize_lexically(&absolute))
}

/// Resolves `.` and `..` components without touching the filesystem.
///
/// `..` never climbs above the root.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

/// Counts the separator-delimited segments of `path`.
///
/// Trailing separators are ignored and a bare root counts as one segment, so
/// `/` is 1, `/tmp` is 2 and `/tmp/a` is 3.
pub fn segment_count(path: &Path) -> usize {
    let text = path.to_string_lossy();
    let trimmed = text.trim_end_matches(MAIN_SEPARATOR);
    if trimmed.is_empty() {
        return 1;
    }
    trimmed.split(MAIN_SEPARATOR).count()
}

/// Depth of an entry located at `path`: `segment_count(path) - 1`.
pub fn depth_of(path: &Path) -> usize {
    segment_count(path) - 1
}
