//! # Local Sandbox
//!
//! Mount target that materializes a mount description under a jailed root
//! directory on the local filesystem. The mount is a full republish: the
//! description is written top-down, overwriting files that already exist.
//! Entry names are validated so nothing escapes the root.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::traits::SandboxHost;
use crate::domain::types::{MountDescription, MountEntry};

pub struct LocalSandbox {
    root_dir: PathBuf,
}

impl LocalSandbox {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root_dir: PathBuf = root.into();
        fs::create_dir_all(&root_dir)
            .with_context(|| format!("failed to create sandbox root {}", root_dir.display()))?;
        // Resolve to an absolute path so the jail check is meaningful.
        let root_dir = root_dir
            .canonicalize()
            .with_context(|| format!("failed to resolve sandbox root {}", root_dir.display()))?;
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// A mount entry name must be a single plain path component.
    fn validate_name(name: &str) -> Result<()> {
        if name.is_empty() || name == "." || name == ".." {
            bail!("invalid mount entry name {name:?}");
        }
        if name.contains('/') || name.contains('\\') {
            bail!("mount entry name {name:?} must not contain path separators");
        }
        Ok(())
    }

    fn write_entry(&self, dir: &Path, name: &str, entry: &MountEntry) -> Result<()> {
        Self::validate_name(name)?;
        let target = dir.join(name);
        match entry {
            MountEntry::File { file } => {
                fs::write(&target, &file.contents)
                    .with_context(|| format!("failed to write {}", target.display()))?;
            }
            MountEntry::Directory { directory } => {
                fs::create_dir_all(&target)
                    .with_context(|| format!("failed to create {}", target.display()))?;
                for (child_name, child) in directory {
                    self.write_entry(&target, child_name, child)?;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SandboxHost for LocalSandbox {
    async fn mount(&self, description: &MountDescription) -> Result<()> {
        for (name, entry) in description {
            self.write_entry(&self.root_dir, name, entry)?;
        }
        tracing::debug!(
            entries = description.len(),
            root = %self.root_dir.display(),
            "mounted project tree"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{mount, tree};
    use crate::domain::types::{Action, FileTree, Step, StepStatus};

    fn description_of(writes: &[(&str, &str)]) -> MountDescription {
        let mut steps: Vec<Step> = writes
            .iter()
            .enumerate()
            .map(|(id, (path, content))| Step {
                id,
                action: Action::CreateFile {
                    path: path.to_string(),
                    content: content.to_string(),
                },
                status: StepStatus::Pending,
            })
            .collect();
        let tree = tree::reconcile(&mut steps, &FileTree::default()).unwrap();
        mount::project(&tree)
    }

    #[tokio::test]
    async fn mount_materializes_nested_structure() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = LocalSandbox::new(dir.path()).unwrap();

        let description = description_of(&[
            ("index.html", "HI"),
            ("src/app.js", "console.log(1)"),
        ]);
        sandbox.mount(&description).await.unwrap();

        let root = sandbox.root_dir();
        assert_eq!(fs::read_to_string(root.join("index.html")).unwrap(), "HI");
        assert_eq!(
            fs::read_to_string(root.join("src/app.js")).unwrap(),
            "console.log(1)"
        );
    }

    #[tokio::test]
    async fn remount_overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = LocalSandbox::new(dir.path()).unwrap();

        sandbox
            .mount(&description_of(&[("a.txt", "v1")]))
            .await
            .unwrap();
        sandbox
            .mount(&description_of(&[("a.txt", "v2")]))
            .await
            .unwrap();

        assert_eq!(
            fs::read_to_string(sandbox.root_dir().join("a.txt")).unwrap(),
            "v2"
        );
    }

    #[tokio::test]
    async fn entry_names_with_separators_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = LocalSandbox::new(dir.path()).unwrap();

        let mut description = MountDescription::new();
        description.insert(
            "../escape.txt".to_string(),
            MountEntry::File {
                file: crate::domain::types::FileContents {
                    contents: "nope".to_string(),
                },
            },
        );
        assert!(sandbox.mount(&description).await.is_err());
        assert!(!dir.path().parent().unwrap().join("escape.txt").exists());
    }
}
