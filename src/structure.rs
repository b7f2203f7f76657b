//! Pure tree algorithms over a site's structure.
//!
//! Every operation here is copy-on-write: the caller's tree is never
//! mutated. Searches are depth-first, preorder, and short-circuit on the
//! first match.
//!
//! # Paths
//!
//! `compute_paths` flattens a tree into one `/`-joined id-path per node:
//!
//! ```text
//! home                 /home
//! ├── blog             /home/blog
//! │   └── hello        /home/blog/hello
//! └── about            /home/about
//! ```

use crate::data::types::{ItemId, StructureNode};
use crate::error::Error;

// ============================================================================
// Validation
// ============================================================================

/// Check structural invariants: every `key` unique within the tree.
///
/// # Errors
/// [`Error::Validation`] naming the first duplicate key found.
pub fn validate(tree: &[StructureNode]) -> Result<(), Error> {
    let mut seen = std::collections::BTreeSet::new();
    fn walk<'a>(
        nodes: &'a [StructureNode],
        seen: &mut std::collections::BTreeSet<&'a str>,
    ) -> Result<(), Error> {
        for node in nodes {
            if !seen.insert(&node.key) {
                return Err(Error::Validation(format!(
                    "duplicate structure key `{}`",
                    node.key
                )));
            }
            walk(&node.children, seen)?;
        }
        Ok(())
    }
    walk(tree, &mut seen)
}

// ============================================================================
// Traversal
// ============================================================================

/// Flatten a tree into `/`-joined id-paths, one per node, in depth-first
/// preorder. The leading slash stands for the synthetic root.
pub fn compute_paths(tree: &[StructureNode]) -> Vec<String> {
    fn walk(node: &StructureNode, prefix: &str, out: &mut Vec<String>) {
        let path = format!("{prefix}/{}", node.key);
        out.push(path.clone());
        for child in &node.children {
            walk(child, &path, out);
        }
    }

    let mut out = Vec::new();
    for node in tree {
        walk(node, "", &mut out);
    }
    out
}

/// Root-to-immediate-parent id chain for a node.
///
/// Empty when the node is a root itself or is absent from the tree.
pub fn ancestor_ids(node_id: &str, tree: &[StructureNode]) -> Vec<ItemId> {
    fn chain(node_id: &str, nodes: &[StructureNode]) -> Option<Vec<ItemId>> {
        for node in nodes {
            if node.key == node_id {
                return Some(vec![node.key.clone()]);
            }
            if let Some(mut found) = chain(node_id, &node.children) {
                found.insert(0, node.key.clone());
                return Some(found);
            }
        }
        None
    }

    match chain(node_id, tree) {
        Some(mut ids) => {
            ids.pop();
            ids
        }
        None => Vec::new(),
    }
}

/// First node with the given key, depth-first.
pub fn find<'a>(node_id: &str, tree: &'a [StructureNode]) -> Option<&'a StructureNode> {
    find_where(|node| node.key == node_id, tree)
}

/// Parent of the node with the given key, depth-first. Absent for roots
/// and unknown keys.
pub fn find_parent<'a>(node_id: &str, tree: &'a [StructureNode]) -> Option<&'a StructureNode> {
    for node in tree {
        if node.children.iter().any(|child| child.key == node_id) {
            return Some(node);
        }
        if let Some(parent) = find_parent(node_id, &node.children) {
            return Some(parent);
        }
    }
    None
}

/// First node matching the predicate, depth-first preorder,
/// short-circuiting.
pub fn find_where<'a, F>(predicate: F, tree: &'a [StructureNode]) -> Option<&'a StructureNode>
where
    F: Fn(&StructureNode) -> bool,
{
    fn walk<'a>(
        nodes: &'a [StructureNode],
        predicate: &impl Fn(&StructureNode) -> bool,
    ) -> Option<&'a StructureNode> {
        for node in nodes {
            if predicate(node) {
                return Some(node);
            }
            if let Some(found) = walk(&node.children, predicate) {
                return Some(found);
            }
        }
        None
    }
    walk(tree, &predicate)
}

// ============================================================================
// Mutation (copy-on-write)
// ============================================================================

/// Return a new tree with `new_node` appended to `parent_id`'s children.
///
/// Not idempotent: invoking twice with identical arguments appends two
/// children. This mirrors how callers use it (the caller decides whether
/// a key may appear twice; `validate` catches the duplicate afterwards).
///
/// # Errors
/// [`Error::Validation`] when `parent_id` is not in the tree.
pub fn insert_child(
    tree: &[StructureNode],
    new_node: StructureNode,
    parent_id: &str,
) -> Result<Vec<StructureNode>, Error> {
    fn insert(
        nodes: &[StructureNode],
        new_node: &StructureNode,
        parent_id: &str,
        inserted: &mut bool,
    ) -> Vec<StructureNode> {
        nodes
            .iter()
            .map(|node| {
                let mut children = insert(&node.children, new_node, parent_id, inserted);
                if node.key == parent_id {
                    children.push(new_node.clone());
                    *inserted = true;
                }
                StructureNode {
                    key: node.key.clone(),
                    children,
                    title: node.title.clone(),
                }
            })
            .collect()
    }

    let mut inserted = false;
    let next = insert(tree, &new_node, parent_id, &mut inserted);
    if !inserted {
        return Err(Error::Validation(format!(
            "parent node `{parent_id}` not found"
        )));
    }
    Ok(next)
}

/// Return a new tree with every node whose key appears in `ids` filtered
/// out of every children list, preserving the remaining order. Keys not
/// present in the tree are ignored.
pub fn remove_nodes(tree: &[StructureNode], ids: &[ItemId]) -> Vec<StructureNode> {
    tree.iter()
        .filter(|node| !ids.contains(&node.key))
        .map(|node| StructureNode {
            key: node.key.clone(),
            children: remove_nodes(&node.children, ids),
            title: node.title.clone(),
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
