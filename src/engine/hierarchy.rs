//! Block hierarchy discovery.
//!
//! Blocks reference each other by name through a "declares children"
//! attribute; the [`HierarchyBuilder`] walks those references depth-first
//! from a root block and records, for every reachable block, its path from
//! the root and its depth. The node set must form a strict tree: a child
//! reference that revisits an already-recorded node is malformed input and
//! fails the build rather than looping or silently re-parenting.

use crate::engine::locator::Block;
use crate::error::{Result, TfSculptError};
use std::collections::HashMap;

/// A node in the block hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyNode {
    /// The block's name.
    pub name: String,
    /// Names from the root down to this node, inclusive.
    pub path: Vec<String>,
    /// Distance from the root; always `path.len() - 1`.
    pub depth: usize,
    /// Declared children, in declaration order.
    pub children: Vec<String>,
}

impl HierarchyNode {
    /// The ancestor name at `depth` along this node's path, if the path
    /// reaches that deep.
    #[must_use]
    pub fn ancestor_at(&self, depth: usize) -> Option<&str> {
        self.path.get(depth).map(String::as_str)
    }
}

/// The tree of blocks connected by declared child references.
///
/// Nodes iterate in insertion order (the depth-first discovery order),
/// which downstream partitioning relies on for deterministic output.
#[derive(Debug, Default)]
pub struct Hierarchy {
    nodes: HashMap<String, HierarchyNode>,
    order: Vec<String>,
}

impl Hierarchy {
    /// Look up a node by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HierarchyNode> {
        self.nodes.get(name)
    }

    /// Whether a node with `name` has been recorded.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Iterate nodes in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.order.iter().filter_map(|name| self.nodes.get(name))
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the hierarchy holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Deepest recorded depth, or 0 for an empty hierarchy.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.nodes.values().map(|n| n.depth).max().unwrap_or(0)
    }

    fn insert(&mut self, node: HierarchyNode) {
        self.order.push(node.name.clone());
        self.nodes.insert(node.name.clone(), node);
    }
}

/// Builds a [`Hierarchy`] from a text buffer.
///
/// The builder is generic over two caller-supplied functions: `locate`
/// fetches a named block from the buffer, and `children` reads the
/// declared child names out of a block's body. Both are domain knowledge
/// (the specific header shape and child-reference attribute of the
/// configuration dialect) that the engine stays agnostic of.
pub struct HierarchyBuilder<L, C>
where
    L: Fn(&str, &str) -> Option<Block>,
    C: Fn(&str) -> Vec<String>,
{
    locate: L,
    children: C,
}

impl<L, C> HierarchyBuilder<L, C>
where
    L: Fn(&str, &str) -> Option<Block>,
    C: Fn(&str) -> Vec<String>,
{
    /// Create a builder from a block lookup and a child-reference extractor.
    #[must_use]
    pub fn new(locate: L, children: C) -> Self {
        Self { locate, children }
    }

    /// Build the hierarchy rooted at `root`.
    ///
    /// A child whose block cannot be located is still recorded (with no
    /// children of its own) and the walk continues with its siblings; the
    /// partial result is usable.
    ///
    /// # Errors
    ///
    /// Returns `MalformedHierarchy` if a child reference revisits an
    /// already-recorded node (a cycle or duplicate parent).
    pub fn build(&self, text: &str, root: &str) -> Result<Hierarchy> {
        let mut hierarchy = Hierarchy::default();
        self.walk(text, root, vec![root.to_string()], &mut hierarchy)?;
        tracing::debug!(
            root = %root,
            nodes = hierarchy.len(),
            max_depth = hierarchy.max_depth(),
            "hierarchy built"
        );
        Ok(hierarchy)
    }

    fn walk(
        &self,
        text: &str,
        name: &str,
        path: Vec<String>,
        hierarchy: &mut Hierarchy,
    ) -> Result<()> {
        if hierarchy.contains(name) {
            return Err(TfSculptError::MalformedHierarchy {
                name: name.to_string(),
                message: "child reference revisits an existing node (cycle or duplicate parent)"
                    .to_string(),
                src_path: file!(),
                src_line: line!(),
            });
        }

        let depth = path.len() - 1;
        let block = (self.locate)(text, name);
        let children = match &block {
            Some(b) => (self.children)(b.body(text)),
            None => {
                tracing::warn!(
                    name = %name,
                    depth = depth,
                    "referenced block not found, recording leaf node"
                );
                Vec::new()
            }
        };

        hierarchy.insert(HierarchyNode {
            name: name.to_string(),
            path: path.clone(),
            depth,
            children: children.clone(),
        });

        for child in children {
            let mut child_path = path.clone();
            child_path.push(child.clone());
            self.walk(text, &child, child_path, hierarchy)?;
        }

        Ok(())
    }
}
