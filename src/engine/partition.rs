//! Depth-based partition planning.
//!
//! Every hierarchy node is assigned to exactly one output partition (one
//! file). Nodes at or above the depth cutoff key their own partition;
//! deeper nodes fold into the partition of their ancestor exactly at the
//! cutoff. Partition keys run through a caller-supplied normalization
//! (the domain's short-name convention).

use crate::engine::hierarchy::Hierarchy;
use std::collections::HashMap;

/// The partition assignment for a hierarchy: node name to partition key.
///
/// Partition keys iterate in first-seen order over the hierarchy's
/// discovery order, so repeated runs over identical input produce
/// identical file sets.
#[derive(Debug, Default)]
pub struct PartitionAssignment {
    by_node: HashMap<String, String>,
    key_order: Vec<String>,
}

impl PartitionAssignment {
    /// The partition key assigned to `node`, if the node exists.
    #[must_use]
    pub fn partition_for(&self, node: &str) -> Option<&str> {
        self.by_node.get(node).map(String::as_str)
    }

    /// Iterate partition keys in first-seen order.
    pub fn partitions(&self) -> impl Iterator<Item = &str> {
        self.key_order.iter().map(String::as_str)
    }

    /// Number of distinct partitions.
    #[must_use]
    pub fn partition_count(&self) -> usize {
        self.key_order.len()
    }

    /// Number of assigned nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    /// Whether no nodes have been assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }

    fn assign(&mut self, node: String, key: String) {
        if !self.key_order.contains(&key) {
            self.key_order.push(key.clone());
        }
        self.by_node.insert(node, key);
    }
}

/// Assign every node of `hierarchy` to a partition at depth cutoff
/// `max_depth`, normalizing key names through `normalize`.
///
/// A node with `depth <= max_depth` keys its own normalized name; a
/// deeper node keys the normalized name of its ancestor exactly at
/// `max_depth`. With `max_depth == 0` this yields one partition for the
/// root and one per direct child subtree; with `max_depth >=` the tree
/// depth every node gets its own partition.
pub fn assign_partitions<N>(
    hierarchy: &Hierarchy,
    max_depth: usize,
    normalize: N,
) -> PartitionAssignment
where
    N: Fn(&str) -> String,
{
    let mut assignment = PartitionAssignment::default();

    for node in hierarchy.iter() {
        let owner = if node.depth <= max_depth {
            node.name.as_str()
        } else {
            // path is always at least depth + 1 long, so the cutoff
            // ancestor exists for any node deeper than the cutoff
            node.ancestor_at(max_depth)
                .expect("node deeper than cutoff has an ancestor at the cutoff")
        };
        assignment.assign(node.name.clone(), normalize(owner));
    }

    tracing::debug!(
        nodes = assignment.len(),
        partitions = assignment.partition_count(),
        max_depth = max_depth,
        "partitions assigned"
    );
    assignment
}
