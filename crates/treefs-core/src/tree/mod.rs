//! Whole-subtree operations.
//!
//! [`walker::walk`] snapshots a directory into a [`depth::DepthTree`],
//! [`delete::delete_tree`] removes such a snapshot bottom-up, and
//! [`hierarchy::Hierarchy`] reshapes it into parent/child form.

pub mod delete;
pub mod depth;
pub mod hierarchy;
pub mod walker;
