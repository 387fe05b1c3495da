//! Parent/child view of a [`DepthTree`].
//!
//! The hierarchy is an arena of nodes that borrow the tree's [`Entry`]
//! values. Nodes refer to each other by index, so the upward link from a
//! child to its parent is a plain lookup and never owns anything.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::Entry;
use crate::tree::depth::DepthTree;

#[derive(Debug)]
struct Node<'a> {
    entry: &'a Entry,
    depth: usize,
    parent: Option<usize>,
    files: Vec<usize>,
    dirs: Vec<usize>,
}

/// Hierarchical view built once from a fully materialized [`DepthTree`].
///
/// Children keep the order of their depth bucket; sorting for display is up
/// to the consumer.
#[derive(Debug)]
pub struct Hierarchy<'a> {
    nodes: Vec<Node<'a>>,
}

impl<'a> Hierarchy<'a> {
    /// Builds the hierarchy in a single top-down pass.
    ///
    /// The root is the only entry at the lowest populated depth. Each node's
    /// children are the entries one level deeper whose parent directory is the
    /// node's path. Directories (including links to directories) recurse;
    /// files do not. Entries whose parent never appears are left out.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedTree`] if the tree is empty or its lowest
    /// bucket does not hold exactly one entry.
    pub fn build(tree: &'a DepthTree) -> CoreResult<Self> {
        let (root_depth, root_bucket) = tree
            .buckets()
            .next()
            .ok_or_else(|| CoreError::MalformedTree("tree has no entries".to_string()))?;
        if root_bucket.len() != 1 {
            return Err(CoreError::MalformedTree(format!(
                "expected one root at depth {root_depth}, found {}",
                root_bucket.len()
            )));
        }

        let by_parent = index_by_parent(tree);
        let mut nodes = vec![Node {
            entry: &root_bucket[0],
            depth: *root_depth,
            parent: None,
            files: Vec::new(),
            dirs: Vec::new(),
        }];

        let mut pending = vec![0usize];
        while let Some(parent_id) = pending.pop() {
            let depth = nodes[parent_id].depth + 1;
            let parent_entry: &'a Entry = nodes[parent_id].entry;
            let parent_path = parent_entry.path();
            let Some(children) = by_parent.get(&(depth, parent_path)) else {
                continue;
            };

            for &child in children {
                let child_id = nodes.len();
                nodes.push(Node {
                    entry: child,
                    depth,
                    parent: Some(parent_id),
                    files: Vec::new(),
                    dirs: Vec::new(),
                });
                if child.is_dir() {
                    nodes[parent_id].dirs.push(child_id);
                    pending.push(child_id);
                } else {
                    nodes[parent_id].files.push(child_id);
                }
            }
        }

        Ok(Self { nodes })
    }

    /// The root node.
    pub fn root(&self) -> TreeNode<'_, 'a> {
        TreeNode { hierarchy: self, id: 0 }
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every file node, in no particular order.
    pub fn files(&self) -> impl Iterator<Item = &'a Entry> + '_ {
        self.nodes
            .iter()
            .flat_map(|node| node.files.iter())
            .map(|&id| self.nodes[id].entry)
    }
}

/// Groups each bucket's entries by `(depth, parent directory)`, keeping
/// bucket order within a group.
fn index_by_parent(tree: &DepthTree) -> HashMap<(usize, &Path), Vec<&Entry>> {
    let mut index: HashMap<(usize, &Path), Vec<&Entry>> = HashMap::new();
    for (depth, bucket) in tree.buckets() {
        for entry in bucket {
            if let Some(parent) = entry.path().parent() {
                index.entry((*depth, parent)).or_default().push(entry);
            }
        }
    }
    index
}

/// A read-only cursor onto one node of a [`Hierarchy`].
#[derive(Debug, Clone, Copy)]
pub struct TreeNode<'h, 'a> {
    hierarchy: &'h Hierarchy<'a>,
    id: usize,
}

impl<'h, 'a> TreeNode<'h, 'a> {
    pub fn entry(&self) -> &'a Entry {
        self.node().entry
    }

    pub fn depth(&self) -> usize {
        self.node().depth
    }

    /// The enclosing directory node; `None` for the root.
    pub fn parent(&self) -> Option<TreeNode<'h, 'a>> {
        let hierarchy = self.hierarchy;
        self.node().parent.map(|id| TreeNode { hierarchy, id })
    }

    /// Child file nodes, in bucket order.
    pub fn files(&self) -> impl Iterator<Item = TreeNode<'h, 'a>> + 'h {
        let hierarchy = self.hierarchy;
        self.node()
            .files
            .iter()
            .map(move |&id| TreeNode { hierarchy, id })
    }

    /// Child directory nodes, in bucket order.
    pub fn dirs(&self) -> impl Iterator<Item = TreeNode<'h, 'a>> + 'h {
        let hierarchy = self.hierarchy;
        self.node()
            .dirs
            .iter()
            .map(move |&id| TreeNode { hierarchy, id })
    }

    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }

    fn node(&self) -> &'h Node<'a> {
        &self.hierarchy.nodes[self.id]
    }
}
