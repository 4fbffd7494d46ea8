//! # Tree Reconciler
//!
//! Folds pending `CreateFile` steps into the virtual project tree. Each
//! pass works on a copy seeded from the previous snapshot and publishes a
//! whole new tree; snapshots held by readers are never mutated in place.
//! Intermediate folders are created on demand; a later write to an
//! existing file path overwrites its content.

use crate::domain::types::{Action, FileNode, FileTree, Step, StepStatus};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    /// A path component collided with an existing node of the other kind.
    /// The offending step is skipped; the tree is never coerced.
    #[error("path `{path}` collides with an existing {existing}")]
    Conflict { path: String, existing: &'static str },
}

/// Applies every pending `CreateFile` step to `tree`, in step order.
///
/// Returns the new snapshot when at least one step was applied, `None`
/// when nothing was pending — the guard that stops the steps-changed /
/// tree-changed notification cycle from re-triggering forever. On `Some`,
/// every step in the sequence is marked `Completed` (the sequencer tracks
/// no finer granularity than pending/completed), which also makes a
/// repeat pass a no-op.
pub fn reconcile(steps: &mut [Step], tree: &FileTree) -> Option<FileTree> {
    let mut applied = false;
    let mut next = tree.clone();

    for step in steps.iter_mut() {
        if step.status != StepStatus::Pending {
            continue;
        }
        let Action::CreateFile { path, content } = &step.action else {
            continue;
        };
        step.status = StepStatus::InProgress;
        applied = true;
        if let Err(e) = insert_file(&mut next.roots, "", path, content) {
            tracing::warn!(step = step.id, "skipping conflicting step: {e}");
        }
    }

    if !applied {
        return None;
    }

    for step in steps.iter_mut() {
        step.status = StepStatus::Completed;
    }
    Some(next)
}

/// Walks one path segment at a time from `siblings`, creating folders for
/// the intermediate segments and writing a file at the last one.
/// `prefix` is the `/`-rooted path of the parent folder ("" at the root),
/// so every created node carries its full path by construction.
fn insert_file(
    siblings: &mut Vec<FileNode>,
    prefix: &str,
    remaining: &str,
    content: &str,
) -> Result<(), TreeError> {
    let mut segments = remaining.split('/').filter(|s| !s.is_empty());
    let Some(segment) = segments.next() else {
        // Empty path is a no-op, not an error.
        return Ok(());
    };
    let rest = segments.collect::<Vec<_>>().join("/");
    let node_path = format!("{prefix}/{segment}");
    let existing = siblings.iter().position(|n| n.path() == node_path);

    if rest.is_empty() {
        match existing {
            Some(idx) => match &mut siblings[idx] {
                FileNode::File { content: c, .. } => *c = content.to_string(),
                FileNode::Folder { .. } => {
                    return Err(TreeError::Conflict {
                        path: node_path,
                        existing: "folder",
                    });
                }
            },
            None => siblings.push(FileNode::File {
                name: segment.to_string(),
                path: node_path,
                content: content.to_string(),
            }),
        }
        return Ok(());
    }

    let idx = match existing {
        Some(idx) => idx,
        None => {
            siblings.push(FileNode::Folder {
                name: segment.to_string(),
                path: node_path.clone(),
                children: Vec::new(),
            });
            siblings.len() - 1
        }
    };
    match &mut siblings[idx] {
        FileNode::Folder { children, .. } => insert_file(children, &node_path, &rest, content),
        FileNode::File { .. } => Err(TreeError::Conflict {
            path: node_path,
            existing: "file",
        }),
    }
}
