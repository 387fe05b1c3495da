//! treefs core library: sequential, cancellable filesystem traversal.
//!
//! `treefs-core` resolves filesystem entries (following at most one symlink
//! hop), walks directory subtrees into depth-indexed snapshots, finds entries
//! lazily depth-first, and deletes subtrees bottom-up. Every asynchronous
//! operation runs one filesystem call at a time under an explicit
//! [`tokio_util::sync::CancellationToken`].
//!
//! # Modules
//!
//! - [`fs`]: entries, symlink resolution, directory listing, path depth.
//! - [`sequencer`]: one-step-at-a-time execution with cancellation ([`Sequencer`]).
//! - [`tree`]: walking ([`walk`]), deleting ([`remove_tree`]) and the
//!   parent/child view ([`Hierarchy`]).
//! - [`find`]: shallow and recursive search ([`FindRecurse`], [`EntryStream`]).
//! - [`index`]: per-directory index sources and index-file cleanup.
//! - [`config`]: TOML configuration ([`Config`]).
//! - [`error`]: unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod config;
pub mod error;
pub mod find;
pub mod fs;
pub mod index;
pub mod sequencer;
pub mod tree;

#[cfg(test)]
mod test_support;

pub use config::settings::{Config, IndexConfig};
pub use error::{CoreError, CoreResult};
pub use find::{find, find_recurse, find_recurse_async, EntryStream, FindRecurse};
pub use fs::entry::{resolve, resolve_async, Entry, EntryKind, LinkInfo, TargetKind};
pub use fs::list::{list_directory, list_directory_async};
pub use fs::path::{depth_of, normalize, segment_count};
pub use index::{
    collect_index_sources, collect_index_sources_sync, remove_index_files, IndexSources,
};
pub use sequencer::{SequenceState, Sequencer};
pub use tree::delete::{delete_tree, delete_tree_async, remove_tree, remove_tree_async};
pub use tree::depth::DepthTree;
pub use tree::hierarchy::{Hierarchy, TreeNode};
pub use tree::walker::{validate_root, validate_root_async, walk, walk_async};
