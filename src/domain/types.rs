#![allow(dead_code)]
//! # Domain Types
//!
//! Common data structures shared by the parser, the step sequencer,
//! the tree reconciler and the mount projector.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One typed operation decoded from a model response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Action {
    /// Untagged prose from the response, surfaced to the user as-is.
    Description(String),
    /// Write `content` verbatim at the forward-slash delimited `path`.
    CreateFile { path: String, content: String },
    /// Shell command intended for the sandbox runtime.
    RunCommand { command: String },
}

/// Lifecycle of a step in the project history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
}

/// An [`Action`] plus lifecycle status, held in insertion order.
/// Steps are append-only: later model turns concatenate, never reorder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Ordinal insertion position. The only ordering there is.
    pub id: usize,
    pub action: Action,
    pub status: StepStatus,
}

/// A node in the virtual project tree.
///
/// `path` is always the full `/`-rooted path: parent path + `/` + `name`.
/// The reconciler builds nodes so this holds by construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum FileNode {
    File {
        name: String,
        path: String,
        content: String,
    },
    Folder {
        name: String,
        path: String,
        /// Insertion-ordered, names unique within one folder.
        children: Vec<FileNode>,
    },
}

impl FileNode {
    pub fn name(&self) -> &str {
        match self {
            FileNode::File { name, .. } | FileNode::Folder { name, .. } => name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            FileNode::File { path, .. } | FileNode::Folder { path, .. } => path,
        }
    }
}

/// The virtual project tree. Published as an immutable snapshot
/// (`Arc<FileTree>`); only the reconciler produces new snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FileTree {
    pub roots: Vec<FileNode>,
}

impl FileTree {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Looks up a node by its `/`-rooted path.
    pub fn find(&self, path: &str) -> Option<&FileNode> {
        fn walk<'a>(nodes: &'a [FileNode], path: &str) -> Option<&'a FileNode> {
            for node in nodes {
                if node.path() == path {
                    return Some(node);
                }
                if let FileNode::Folder { children, .. } = node {
                    let prefix = format!("{}/", node.path());
                    if path.starts_with(&prefix) {
                        return walk(children, path);
                    }
                }
            }
            None
        }
        walk(&self.roots, path)
    }
}

/// File payload inside a mount description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileContents {
    pub contents: String,
}

/// One entry of the mount description consumed by the sandbox.
///
/// Serializes to the sandbox wire shape: `{"file":{"contents":...}}` for
/// files, `{"directory":{<name>:<entry>}}` for folders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MountEntry {
    File { file: FileContents },
    Directory { directory: BTreeMap<String, MountEntry> },
}

/// The full nested directory/file description handed to the sandbox mount.
pub type MountDescription = BTreeMap<String, MountEntry>;

/// Role of one turn in the model conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A single conversation turn sent to the model backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}
