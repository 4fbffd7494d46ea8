//! # Mount Projector
//!
//! Derives the nested directory/file description the sandbox mount
//! contract expects from the current tree snapshot. Pure and total: every
//! node in the tree appears in the output, and empty folders project to an
//! empty directory map rather than being dropped.

use crate::domain::types::{FileContents, FileNode, FileTree, MountDescription, MountEntry};

/// Projects a tree snapshot into a [`MountDescription`].
pub fn project(tree: &FileTree) -> MountDescription {
    tree.roots
        .iter()
        .map(|node| (node.name().to_string(), project_node(node)))
        .collect()
}

fn project_node(node: &FileNode) -> MountEntry {
    match node {
        FileNode::File { content, .. } => MountEntry::File {
            file: FileContents {
                contents: content.clone(),
            },
        },
        FileNode::Folder { children, .. } => MountEntry::Directory {
            directory: children
                .iter()
                .map(|child| (child.name().to_string(), project_node(child)))
                .collect(),
        },
    }
}
