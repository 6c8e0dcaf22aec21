//! File tree adapter.
//!
//! The backend describes an uploaded project as a nested directory/file
//! structure. Tree views want something slightly different: every node needs
//! a stable id, and directory-ness must be derivable from the shape alone.
//! This module converts one into the other.

use serde::{Deserialize, Serialize};

/// A node of the file tree as returned by the backend.
///
/// `children` is kept as an `Option` because an absent list and an empty
/// list are treated differently at the root (see [`adapt`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTreeNode {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub is_dir: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileTreeNode>>,
}

impl FileTreeNode {
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self { name: name.into(), path: Some(path.into()), is_dir: false, children: None }
    }

    pub fn dir(
        name: impl Into<String>,
        path: impl Into<String>,
        children: Vec<FileTreeNode>,
    ) -> Self {
        Self { name: name.into(), path: Some(path.into()), is_dir: true, children: Some(children) }
    }

    /// Directory flag after applying the "children imply directory" rule.
    pub fn is_effective_dir(&self) -> bool {
        self.is_dir || self.children.as_ref().is_some_and(|c| !c.is_empty())
    }
}

/// The `fileTree` payload: either a single (root) node or a bare list of nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileTree {
    Nodes(Vec<FileTreeNode>),
    Node(FileTreeNode),
}

impl FileTree {
    /// Name of the root node, when the tree is a single node with a name.
    pub fn root_name(&self) -> Option<&str> {
        match self {
            FileTree::Node(node) if !node.name.is_empty() => Some(node.name.as_str()),
            _ => None,
        }
    }

    /// Top-level children of a rooted tree (or the bare list).
    pub fn top_level(&self) -> &[FileTreeNode] {
        match self {
            FileTree::Nodes(nodes) => nodes,
            FileTree::Node(node) => node.children.as_deref().unwrap_or(&[]),
        }
    }
}

/// Tree-view-ready node with a stable id and a forced directory flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeViewNode {
    pub id: String,
    pub name: String,
    pub path: Option<String>,
    pub is_dir: bool,
    pub children: Vec<TreeViewNode>,
}

impl TreeViewNode {
    /// Depth-first search by id.
    pub fn find(&self, id: &str) -> Option<&TreeViewNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// Convert a single node: id is the path (falling back to the name), and any
/// node with at least one child is a directory regardless of its flag.
pub fn adapt_node(node: &FileTreeNode) -> TreeViewNode {
    let id = node.path.clone().unwrap_or_else(|| node.name.clone());
    let children: Vec<TreeViewNode> = match &node.children {
        Some(children) if !children.is_empty() => children.iter().map(adapt_node).collect(),
        _ => Vec::new(),
    };
    let is_dir = node.is_dir || !children.is_empty();
    TreeViewNode { id, name: node.name.clone(), path: node.path.clone(), is_dir, children }
}

/// Build the list of tree-view roots for a backend file tree.
///
/// - A root object with a `children` list shows its children as roots; if
///   that list holds exactly one directory, the directory itself becomes the
///   single root.
/// - A bare list maps each element to a root.
/// - A root object without `children` is shown as-is.
pub fn adapt(tree: &FileTree) -> Vec<TreeViewNode> {
    match tree {
        FileTree::Nodes(nodes) => nodes.iter().map(adapt_node).collect(),
        FileTree::Node(root) => match &root.children {
            Some(children) if children.len() == 1 && children[0].is_effective_dir() => {
                vec![adapt_node(&children[0])]
            }
            Some(children) => children.iter().map(adapt_node).collect(),
            None => vec![adapt_node(root)],
        },
    }
}

/// Find a node by id across a list of roots.
pub fn find<'a>(roots: &'a [TreeViewNode], id: &str) -> Option<&'a TreeViewNode> {
    roots.iter().find_map(|root| root.find(id))
}

/// All file (non-directory) nodes, depth-first in display order.
pub fn files(roots: &[TreeViewNode]) -> Vec<&TreeViewNode> {
    fn walk<'a>(node: &'a TreeViewNode, out: &mut Vec<&'a TreeViewNode>) {
        if node.is_dir {
            for child in &node.children {
                walk(child, out);
            }
        } else {
            out.push(node);
        }
    }

    let mut out = Vec::new();
    for root in roots {
        walk(root, &mut out);
    }
    out
}

/// Case-insensitive check for a `.java` source file.
pub fn is_java(path: &str) -> bool {
    path.to_ascii_lowercase().ends_with(".java")
}

/// Render the tree as indented text lines (two spaces per level, `/` suffix for dirs).
pub fn render_lines(roots: &[TreeViewNode]) -> Vec<String> {
    fn walk(node: &TreeViewNode, depth: usize, out: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        if node.is_dir {
            out.push(format!("{indent}{}/", node.name));
            for child in &node.children {
                walk(child, depth + 1, out);
            }
        } else {
            out.push(format!("{indent}{}", node.name));
        }
    }

    let mut out = Vec::new();
    for root in roots {
        walk(root, 0, &mut out);
    }
    out
}
