//! # Domain Traits
//!
//! Abstract interfaces for the external collaborators (model backend,
//! sandbox). Implemented in the Infrastructure layer.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::types::{ChatMessage, MountDescription};

/// Abstract interface for the model-invocation backend.
///
/// Takes the ordered conversation so far and returns the next assistant
/// turn as one text blob, to be fed to the action parser.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Abstract interface for the sandbox mount target.
///
/// The core republishes the full mount description whenever the tree
/// changes; command execution and preview URLs are not part of this
/// contract.
#[async_trait]
pub trait SandboxHost: Send + Sync {
    async fn mount(&self, description: &MountDescription) -> Result<()>;
}
