//! Entry representation and one-hop symlink resolution.

use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use unicode_normalization::UnicodeNormalization;

use crate::error::{CoreError, CoreResult};
use crate::fs::path::{depth_of, normalize};

/// What a symlink's immediate target turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    File,
    Directory,
    /// The target does not exist. Treated as file-kind so the link can be
    /// enumerated and unlinked like any other file.
    Missing,
}

/// Symlink details captured at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    target: PathBuf,
    resolved: TargetKind,
}

impl LinkInfo {
    /// The raw value returned by `readlink`.
    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn resolved(&self) -> TargetKind {
        self.resolved
    }

    /// `true` unless the target is a directory; broken links count as files.
    pub fn resolved_is_file(&self) -> bool {
        self.resolved != TargetKind::Directory
    }
}

/// The kind of a filesystem node. Exactly one variant holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink(LinkInfo),
}

/// A single resolved filesystem node.
///
/// `Entry` is immutable: the kind of a symlink's target is computed once by
/// [`resolve`] or [`resolve_async`] and never re-resolved.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use treefs_core::resolve;
///
/// let entry = resolve(Path::new("/etc/hosts"), None).unwrap();
/// assert_eq!(entry.basename(), "hosts");
/// assert!(entry.is_file());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    path: PathBuf,
    basename: String,
    kind: EntryKind,
    size: u64,
    modified: Option<SystemTime>,
}

impl Entry {
    fn new(
        path: PathBuf,
        basename_hint: Option<&str>,
        kind: EntryKind,
        metadata: &Metadata,
    ) -> Self {
        let basename = match basename_hint {
            Some(hint) => hint.nfc().collect(),
            None => path
                .file_name()
                .map(|n| n.to_string_lossy().nfc().collect::<String>())
                .unwrap_or_else(|| path.to_string_lossy().into_owned()),
        };
        let is_dir = matches!(kind, EntryKind::Directory);

        Self {
            path,
            basename,
            kind,
            size: if is_dir { 0 } else { metadata.len() },
            modified: metadata.modified().ok(),
        }
    }

    /// Returns the full path of this entry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the final path segment.
    pub fn basename(&self) -> &str {
        &self.basename
    }

    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    /// Size from the link-aware stat. Always `0` for directories.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the last-modified time, if available.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// Returns `true` for directories and for symlinks whose target is a directory.
    pub fn is_dir(&self) -> bool {
        match &self.kind {
            EntryKind::Directory => true,
            EntryKind::Symlink(link) => link.resolved == TargetKind::Directory,
            EntryKind::File => false,
        }
    }

    /// Returns `true` for files and for symlinks whose target is a file or missing.
    pub fn is_file(&self) -> bool {
        match &self.kind {
            EntryKind::File => true,
            EntryKind::Symlink(link) => link.resolved_is_file(),
            EntryKind::Directory => false,
        }
    }

    /// Returns `true` if this entry is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        matches!(self.kind, EntryKind::Symlink(_))
    }

    /// Returns `true` for a symlink whose target does not exist.
    pub fn is_broken_link(&self) -> bool {
        matches!(&self.kind, EntryKind::Symlink(link) if link.resolved == TargetKind::Missing)
    }

    /// The raw link value, for symlinks only.
    pub fn link_target(&self) -> Option<&Path> {
        match &self.kind {
            EntryKind::Symlink(link) => Some(link.target()),
            _ => None,
        }
    }

    /// Returns `true` for real (non-symlink) directories, the only kind a
    /// traversal ever descends into.
    pub fn is_traversable(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    /// Depth derived from the path's segment count.
    pub fn depth(&self) -> usize {
        depth_of(&self.path)
    }
}

/// Resolves `path` into an [`Entry`], following at most one symlink hop.
///
/// `path` is normalized first, so the entry always carries an absolute,
/// dot-free path. A relative link value is interpreted against the link's own
/// directory. Basenames are NFC-normalized, hint included.
///
/// # Errors
///
/// - [`CoreError::RecursiveSymlink`]: the link target is itself a symlink.
/// - [`CoreError::Io`]: the stat or readlink call failed, or the current
///   directory is needed and unavailable.
///
/// A link whose target does not exist is **not** an error; it resolves with
/// [`TargetKind::Missing`].
pub fn resolve(path: &Path, basename_hint: Option<&str>) -> CoreResult<Entry> {
    let normalized = normalize(path)?;
    let path = normalized.as_path();
    let metadata = std::fs::symlink_metadata(path).map_err(|e| CoreError::io(path, e))?;

    let kind = if metadata.file_type().is_symlink() {
        let target = std::fs::read_link(path).map_err(|e| CoreError::io(path, e))?;
        let target_path = link_target_path(path, &target);
        let resolved = classify_target(path, &target, std::fs::symlink_metadata(&target_path))?;
        EntryKind::Symlink(LinkInfo { target, resolved })
    } else {
        plain_kind(&metadata)
    };

    Ok(Entry::new(path.to_path_buf(), basename_hint, kind, &metadata))
}

/// Async counterpart of [`resolve`]. Every syscall is a suspension point.
pub async fn resolve_async(path: &Path, basename_hint: Option<&str>) -> CoreResult<Entry> {
    let normalized = normalize(path)?;
    let path = normalized.as_path();
    let metadata = tokio::fs::symlink_metadata(path)
        .await
        .map_err(|e| CoreError::io(path, e))?;

    let kind = if metadata.file_type().is_symlink() {
        let target = tokio::fs::read_link(path)
            .await
            .map_err(|e| CoreError::io(path, e))?;
        let target_path = link_target_path(path, &target);
        let target_metadata = tokio::fs::symlink_metadata(&target_path).await;
        let resolved = classify_target(path, &target, target_metadata)?;
        EntryKind::Symlink(LinkInfo { target, resolved })
    } else {
        plain_kind(&metadata)
    };

    Ok(Entry::new(path.to_path_buf(), basename_hint, kind, &metadata))
}

fn plain_kind(metadata: &Metadata) -> EntryKind {
    if metadata.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    }
}

fn link_target_path(link: &Path, target: &Path) -> PathBuf {
    match link.parent() {
        Some(parent) => parent.join(target),
        None => target.to_path_buf(),
    }
}

fn classify_target(
    link: &Path,
    target: &Path,
    metadata: std::io::Result<Metadata>,
) -> CoreResult<TargetKind> {
    match metadata {
        Ok(m) if m.file_type().is_symlink() => Err(CoreError::RecursiveSymlink {
            path: link.to_path_buf(),
            target: target.to_path_buf(),
        }),
        Ok(m) if m.is_dir() => Ok(TargetKind::Directory),
        Ok(_) => Ok(TargetKind::File),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(TargetKind::Missing),
        Err(e) => Err(CoreError::io(link, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn resolves_regular_file() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("test.txt");
        fs::write(&file_path, "hello").unwrap();

        let entry = resolve(&file_path, None).unwrap();

        assert_eq!(entry.basename(), "test.txt");
        assert_eq!(entry.kind(), &EntryKind::File);
        assert_eq!(entry.size(), 5);
        assert!(entry.is_file());
        assert!(!entry.is_dir());
        assert!(!entry.is_symlink());
        assert!(entry.link_target().is_none());
        assert!(entry.modified().is_some());
    }

    #[test]
    fn resolves_directory() {
        let tmp = TempDir::new().unwrap();
        let dir_path = tmp.path().join("subdir");
        fs::create_dir(&dir_path).unwrap();
        fs::write(dir_path.join("a.txt"), "data").unwrap();

        let entry = resolve(&dir_path, None).unwrap();

        assert_eq!(entry.kind(), &EntryKind::Directory);
        assert_eq!(entry.size(), 0);
        assert!(entry.is_dir());
        assert!(entry.is_traversable());
    }

    #[test]
    fn basename_hint_wins() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("real.txt");
        fs::write(&file_path, "").unwrap();

        let entry = resolve(&file_path, Some("hinted")).unwrap();
        assert_eq!(entry.basename(), "hinted");
    }

    #[test]
    fn unicode_basename() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("한글파일.txt");
        fs::write(&file_path, "내용").unwrap();

        let entry = resolve(&file_path, None).unwrap();
        assert_eq!(entry.basename(), "한글파일.txt");
    }

    #[test]
    fn missing_path_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");

        let err = resolve(&missing, None).unwrap_err();
        assert!(matches!(err, CoreError::Io { ref path, .. } if path == &missing));
    }

    #[test]
    fn depth_matches_parent_plus_one() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("f");
        fs::write(&file_path, "").unwrap();

        let entry = resolve(&file_path, None).unwrap();
        assert_eq!(entry.depth(), depth_of(tmp.path()) + 1);
    }

    #[test]
    fn dotted_path_is_normalized() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("f.txt"), "").unwrap();

        let entry = resolve(&tmp.path().join("sub/../f.txt"), None).unwrap();

        assert_eq!(entry.path(), tmp.path().join("f.txt"));
        assert_eq!(entry.basename(), "f.txt");
        assert_eq!(entry.depth(), depth_of(tmp.path()) + 1);
    }

    #[test]
    fn relative_path_becomes_absolute() {
        let entry = resolve(Path::new("Cargo.toml"), None).unwrap();

        assert!(entry.path().is_absolute());
        assert_eq!(entry.path(), normalize(entry.path()).unwrap());
        assert_eq!(entry.basename(), "Cargo.toml");
    }

    #[test]
    fn hinted_basename_is_nfc() {
        let tmp = TempDir::new().unwrap();
        let decomposed = "cafe\u{301}.txt";
        let file_path = tmp.path().join(decomposed);
        fs::write(&file_path, "").unwrap();

        let hinted = resolve(&file_path, Some(decomposed)).unwrap();
        let plain = resolve(&file_path, None).unwrap();

        assert_eq!(hinted.basename(), "caf\u{e9}.txt");
        assert_eq!(hinted.basename(), plain.basename());
    }

    #[cfg(unix)]
    mod symlinks {
        use super::*;
        use std::os::unix::fs::symlink;

        #[test]
        fn link_to_file() {
            let tmp = TempDir::new().unwrap();
            let target = tmp.path().join("target.txt");
            fs::write(&target, "data").unwrap();
            let link = tmp.path().join("link.txt");
            symlink(&target, &link).unwrap();

            let entry = resolve(&link, None).unwrap();

            assert!(entry.is_symlink());
            assert!(entry.is_file());
            assert!(!entry.is_dir());
            assert!(!entry.is_traversable());
            assert_eq!(entry.link_target(), Some(target.as_path()));
        }

        #[test]
        fn link_to_directory() {
            let tmp = TempDir::new().unwrap();
            let target = tmp.path().join("dir");
            fs::create_dir(&target).unwrap();
            let link = tmp.path().join("link");
            symlink(&target, &link).unwrap();

            let entry = resolve(&link, None).unwrap();

            assert!(entry.is_symlink());
            assert!(entry.is_dir());
            assert!(!entry.is_traversable());
        }

        #[test]
        fn relative_link_resolves_against_link_directory() {
            let tmp = TempDir::new().unwrap();
            fs::create_dir(tmp.path().join("sub")).unwrap();
            fs::create_dir(tmp.path().join("sub/inner")).unwrap();
            let link = tmp.path().join("sub/rel");
            symlink("inner", &link).unwrap();

            let entry = resolve(&link, None).unwrap();

            assert_eq!(entry.link_target(), Some(Path::new("inner")));
            assert!(entry.is_dir());
        }

        #[test]
        fn broken_link_is_file_kind() {
            let tmp = TempDir::new().unwrap();
            let link = tmp.path().join("dangling");
            symlink(tmp.path().join("gone"), &link).unwrap();

            let entry = resolve(&link, None).unwrap();

            assert!(entry.is_broken_link());
            assert!(entry.is_file());
            assert!(!entry.is_dir());
            match entry.kind() {
                EntryKind::Symlink(info) => {
                    assert_eq!(info.resolved(), TargetKind::Missing);
                    assert!(info.resolved_is_file());
                }
                other => panic!("expected symlink, got {other:?}"),
            }
        }

        #[test]
        fn link_to_link_is_rejected() {
            let tmp = TempDir::new().unwrap();
            let file = tmp.path().join("file");
            fs::write(&file, "x").unwrap();
            let first = tmp.path().join("first");
            symlink(&file, &first).unwrap();
            let second = tmp.path().join("second");
            symlink(&first, &second).unwrap();

            let err = resolve(&second, None).unwrap_err();
            assert!(matches!(err, CoreError::RecursiveSymlink { ref path, .. } if path == &second));
        }

        #[test]
        fn self_referencing_link_does_not_loop() {
            let tmp = TempDir::new().unwrap();
            let link = tmp.path().join("ouroboros");
            symlink(&link, &link).unwrap();

            let err = resolve(&link, None).unwrap_err();
            assert!(matches!(err, CoreError::RecursiveSymlink { .. }));
        }

        #[tokio::test]
        async fn async_resolution_matches_sync() {
            let tmp = TempDir::new().unwrap();
            let target = tmp.path().join("dir");
            fs::create_dir(&target).unwrap();
            let link = tmp.path().join("link");
            symlink(&target, &link).unwrap();
            let dangling = tmp.path().join("dangling");
            symlink(tmp.path().join("gone"), &dangling).unwrap();

            for path in [&target, &link, &dangling] {
                let sync = resolve(path, None).unwrap();
                let asynchronous = resolve_async(path, None).await.unwrap();
                assert_eq!(sync.kind(), asynchronous.kind());
                assert_eq!(sync.basename(), asynchronous.basename());
            }
        }

        #[tokio::test]
        async fn async_link_to_link_is_rejected() {
            let tmp = TempDir::new().unwrap();
            let file = tmp.path().join("file");
            fs::write(&file, "x").unwrap();
            let first = tmp.path().join("first");
            symlink(&file, &first).unwrap();
            let second = tmp.path().join("second");
            symlink(&first, &second).unwrap();

            let err = resolve_async(&second, None).await.unwrap_err();
            assert!(matches!(err, CoreError::RecursiveSymlink { .. }));
        }
    }
}
