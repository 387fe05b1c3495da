//! Lazy, depth-first entry discovery.
//!
//! A directory's children are produced in listing order before any of its
//! subdirectories is explored; subdirectories are then explored one at a
//! time, each to completion before the next sibling. Symlinked directories are
//! produced as entries but never descended into.
//!
//! The sync form is an [`Iterator`]; the async form, [`EntryStream`], runs
//! every filesystem call as one step of a [`Sequencer`] and can be cancelled
//! mid-sequence. Every constructor starts a fresh traversal.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures::Stream;
use tokio_util::sync::CancellationToken;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::{resolve, resolve_async, Entry};
use crate::fs::list::{read_names, read_names_async};
use crate::sequencer::{SequenceState, Sequencer};
use crate::tree::walker::{validate_root, validate_root_async};

/// Calls `predicate` on each immediate child of `dir` until it returns `true`.
///
/// Children are resolved one at a time, so nothing past the match is stat'ed.
/// Does not descend.
///
/// # Errors
///
/// Returns [`CoreError::Io`] if `dir` cannot be read, or the error of the
/// first child that fails to resolve before a match is found.
pub fn find<P>(dir: &Path, mut predicate: P) -> CoreResult<Option<Entry>>
where
    P: FnMut(&Entry) -> bool,
{
    for name in read_names(dir)? {
        let basename = name.to_string_lossy();
        let entry = resolve(&dir.join(&name), Some(&*basename))?;
        if predicate(&entry) {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}

/// Walks `root` depth-first and returns the first entry accepted by `predicate`.
///
/// With `file_only`, directories are descended into but never offered to the
/// predicate.
///
/// # Errors
///
/// - [`CoreError::NotFound`] / [`CoreError::NotADirectory`]: invalid root.
/// - [`CoreError::Io`] / [`CoreError::RecursiveSymlink`]: a step failed before
///   a match was found.
pub fn find_recurse<P>(root: &Path, file_only: bool, mut predicate: P) -> CoreResult<Option<Entry>>
where
    P: FnMut(&Entry) -> bool,
{
    for entry in FindRecurse::new(root, file_only) {
        let entry = entry?;
        if predicate(&entry) {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}

/// Async counterpart of [`find_recurse`]. Scanning stops, and the traversal is
/// cancelled, as soon as `predicate` accepts an entry.
///
/// Returns `Ok(None)` if nothing matched or `cancel` fired first.
pub async fn find_recurse_async<P>(
    root: &Path,
    file_only: bool,
    cancel: &CancellationToken,
    mut predicate: P,
) -> CoreResult<Option<Entry>>
where
    P: FnMut(&Entry) -> bool,
{
    let mut stream = EntryStream::recursive(root, file_only, cancel);
    while let Some(entry) = stream.next().await {
        let entry = entry?;
        if predicate(&entry) {
            stream.cancel();
            return Ok(Some(entry));
        }
    }
    Ok(None)
}

/// Traversal bookkeeping shared by the sync and async finders.
#[derive(Debug)]
struct Frontier {
    recursive: bool,
    file_only: bool,
    pending: Vec<PathBuf>,
    current: Option<DirCursor>,
}

#[derive(Debug)]
struct DirCursor {
    dir: PathBuf,
    names: std::vec::IntoIter<OsString>,
    subdirs: Vec<PathBuf>,
}

impl Frontier {
    fn new(root: PathBuf, recursive: bool, file_only: bool) -> Self {
        Self {
            recursive,
            file_only,
            pending: vec![root],
            current: None,
        }
    }

    /// Next directory to list, once the current one is exhausted.
    fn next_dir(&mut self) -> Option<PathBuf> {
        self.pending.pop()
    }

    fn open(&mut self, dir: PathBuf, names: Vec<OsString>) {
        self.current = Some(DirCursor {
            dir,
            names: names.into_iter(),
            subdirs: Vec::new(),
        });
    }

    /// Next child path and basename of the open directory. When the directory
    /// runs out, its subdirectories are scheduled so the first one is explored
    /// next.
    fn next_child(&mut self) -> Option<(PathBuf, String)> {
        let cursor = self.current.as_mut()?;
        match cursor.names.next() {
            Some(name) => {
                let basename = name.to_string_lossy().into_owned();
                Some((cursor.dir.join(&name), basename))
            }
            None => {
                if let Some(done) = self.current.take() {
                    self.pending.extend(done.subdirs.into_iter().rev());
                }
                None
            }
        }
    }

    /// Records `entry` for descent if needed and decides whether it is emitted.
    fn accept(&mut self, entry: Entry) -> Option<Entry> {
        if self.recursive && entry.is_traversable() {
            if let Some(cursor) = self.current.as_mut() {
                cursor.subdirs.push(entry.path().to_path_buf());
            }
        }
        if self.file_only && entry.is_dir() {
            return None;
        }
        Some(entry)
    }
}

/// Lazy, depth-first iterator over every descendant of a root.
///
/// The root is validated on the first call to `next`. After an error the
/// iterator is fused.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use treefs_core::FindRecurse;
///
/// for entry in FindRecurse::new(Path::new("src"), true) {
///     println!("{}", entry.unwrap().path().display());
/// }
/// ```
#[derive(Debug)]
pub struct FindRecurse {
    root: PathBuf,
    frontier: Option<Frontier>,
    file_only: bool,
    finished: bool,
}

impl FindRecurse {
    pub fn new(root: &Path, file_only: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            frontier: None,
            file_only,
            finished: false,
        }
    }

    fn advance(&mut self) -> CoreResult<Option<Entry>> {
        if self.frontier.is_none() {
            let root = validate_root(&self.root)?;
            self.frontier = Some(Frontier::new(root.path().to_path_buf(), true, self.file_only));
        }
        let Some(frontier) = self.frontier.as_mut() else {
            return Ok(None);
        };

        loop {
            if let Some((path, basename)) = frontier.next_child() {
                let entry = resolve(&path, Some(basename.as_str()))?;
                if let Some(entry) = frontier.accept(entry) {
                    return Ok(Some(entry));
                }
                continue;
            }
            let Some(dir) = frontier.next_dir() else {
                return Ok(None);
            };
            tracing::trace!(dir = %dir.display(), "exploring directory");
            let names = read_names(&dir)?;
            frontier.open(dir, names);
        }
    }
}

impl Iterator for FindRecurse {
    type Item = CoreResult<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.advance() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for FindRecurse {}

/// Cancellable async sequence of entries, one filesystem call at a time.
///
/// The stream ends (`next` returns `None`) when the traversal completes, is
/// cancelled, or after it has yielded an error. [`EntryStream::state`] tells
/// these apart: a cancelled stream never reports [`SequenceState::Completed`].
#[derive(Debug)]
pub struct EntryStream {
    root: PathBuf,
    validate: bool,
    recursive: bool,
    file_only: bool,
    frontier: Option<Frontier>,
    seq: Sequencer,
}

impl EntryStream {
    /// Streams the immediate children of `dir` (the async form of [`find`]).
    pub fn children(dir: &Path, cancel: &CancellationToken) -> Self {
        Self {
            root: dir.to_path_buf(),
            validate: false,
            recursive: false,
            file_only: false,
            frontier: None,
            seq: Sequencer::new(cancel),
        }
    }

    /// Streams every descendant of `root`, depth-first. The root is validated
    /// on the first call to [`EntryStream::next`].
    pub fn recursive(root: &Path, file_only: bool, cancel: &CancellationToken) -> Self {
        Self {
            root: root.to_path_buf(),
            validate: true,
            recursive: true,
            file_only,
            frontier: None,
            seq: Sequencer::new(cancel),
        }
    }

    pub fn state(&self) -> SequenceState {
        self.seq.state()
    }

    /// Stops the traversal. The in-flight call, if any, is disarmed and no
    /// further entry is produced.
    pub fn cancel(&mut self) {
        self.seq.cancel();
    }

    /// Produces the next entry.
    pub async fn next(&mut self) -> Option<CoreResult<Entry>> {
        if self.seq.state().is_terminal() {
            return None;
        }
        match self.advance().await {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.seq.complete();
                None
            }
            Err(CoreError::Cancelled) => None,
            Err(e) => Some(Err(e)),
        }
    }

    /// Adapts this traversal into a [`futures::Stream`].
    pub fn into_stream(self) -> impl Stream<Item = CoreResult<Entry>> {
        futures::stream::unfold(self, |mut stream| async move {
            let item = stream.next().await?;
            Some((item, stream))
        })
    }

    async fn advance(&mut self) -> CoreResult<Option<Entry>> {
        if self.frontier.is_none() {
            let root = if self.validate {
                let root = self.seq.run_next(validate_root_async(&self.root)).await?;
                root.path().to_path_buf()
            } else {
                self.root.clone()
            };
            self.frontier = Some(Frontier::new(root, self.recursive, self.file_only));
        }
        let Some(frontier) = self.frontier.as_mut() else {
            return Ok(None);
        };

        loop {
            if let Some((path, basename)) = frontier.next_child() {
                let entry = self
                    .seq
                    .run_next(resolve_async(&path, Some(basename.as_str())))
                    .await?;
                if let Some(entry) = frontier.accept(entry) {
                    return Ok(Some(entry));
                }
                continue;
            }
            let Some(dir) = frontier.next_dir() else {
                return Ok(None);
            };
            tracing::trace!(dir = %dir.display(), "exploring directory");
            let names = self.seq.run_next(read_names_async(&dir)).await?;
            frontier.open(dir, names);
        }
    }
}
