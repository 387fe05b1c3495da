//! Filesystem primitives.
//!
//! This module provides the resolved node type ([`entry::Entry`]), one-hop
//! symlink resolution ([`entry::resolve`]), directory listing
//! ([`list::list_directory`]) and the path arithmetic every traversal uses to
//! assign depths ([`path::segment_count`]).

pub mod entry;
pub mod list;
pub mod path;

pub use entry::{EntryKind, LinkInfo, TargetKind};
