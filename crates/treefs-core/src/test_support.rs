//! Shared on-disk fixtures for unit tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Entries a walk of [`fixture`] records, root included.
pub(crate) const FIXTURE_ENTRIES: usize = if cfg!(unix) { 241 } else { 240 };

/// Populated depth buckets in a walk of [`fixture`].
pub(crate) const FIXTURE_BUCKETS: usize = 5;

/// Regular files in [`fixture`]: 5 in the root and in each of the 39 directories.
pub(crate) const FIXTURE_FILES: usize = 200;

pub(crate) struct Fixture {
    _tmp: TempDir,
    pub root: PathBuf,
}

/// Builds the regression tree:
///
/// ```text
/// test-dir/
///   file-{1..5}.txt
///   {A,B,C}/file-{1..5}.txt
///   {A,B,C}/{a,b,c}/file-{1..5}.txt
///   {A,B,C}/{a,b,c}/{1,2,3}/file-{1..5}.txt
///   link-A-c-1 -> test-dir/A/c/1   (unix only)
/// ```
pub(crate) fn fixture() -> Fixture {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("test-dir");
    fs::create_dir(&root).unwrap();
    write_files(&root);

    for first in ["A", "B", "C"] {
        let level1 = root.join(first);
        fs::create_dir(&level1).unwrap();
        write_files(&level1);
        for second in ["a", "b", "c"] {
            let level2 = level1.join(second);
            fs::create_dir(&level2).unwrap();
            write_files(&level2);
            for third in ["1", "2", "3"] {
                let level3 = level2.join(third);
                fs::create_dir(&level3).unwrap();
                write_files(&level3);
            }
        }
    }

    #[cfg(unix)]
    std::os::unix::fs::symlink(root.join("A/c/1"), root.join("link-A-c-1")).unwrap();

    Fixture { _tmp: tmp, root }
}

fn write_files(dir: &Path) {
    for i in 1..=5 {
        let path = dir.join(format!("file-{i}.txt"));
        fs::write(&path, format!("file-{i}.txt [{}]", path.display())).unwrap();
    }
}
