//! # Session Coordinator
//!
//! Single owner of one build session's state: the conversation transcript,
//! the step history and the current tree snapshot. State changes flow
//! through explicit handlers (`on_steps_changed`, `on_tree_changed`) with
//! idempotent bodies, so the steps-changed / tree-changed cycle terminates:
//! a reconciliation pass that selects no pending file writes mutates
//! nothing. Readers observe tree snapshots over a watch channel.

use anyhow::{Result, bail};
use std::sync::Arc;
use tokio::sync::watch;

use crate::application::{mount, parsing, steps::StepSequencer, tree};
use crate::domain::traits::{ModelBackend, SandboxHost};
use crate::domain::types::{ChatMessage, FileTree, Step};
use crate::prompts;

pub struct Session {
    backend: Arc<dyn ModelBackend>,
    sandbox: Arc<dyn SandboxHost>,
    sequencer: StepSequencer,
    tree: Arc<FileTree>,
    tree_tx: watch::Sender<Arc<FileTree>>,
    messages: Vec<ChatMessage>,
    in_flight: bool,
    last_error: Option<String>,
}

impl Session {
    pub fn new(backend: Arc<dyn ModelBackend>, sandbox: Arc<dyn SandboxHost>) -> Self {
        let tree = Arc::new(FileTree::default());
        let (tree_tx, _) = watch::channel(tree.clone());
        Self {
            backend,
            sandbox,
            sequencer: StepSequencer::new(),
            tree,
            tree_tx,
            messages: Vec::new(),
            in_flight: false,
            last_error: None,
        }
    }

    /// Seeds the session from the built-in starter template: the template
    /// payload runs through the same parse path as a model response, and
    /// is recorded as a user turn so the model sees the scaffold it is
    /// building on.
    pub async fn bootstrap(&mut self) {
        self.messages
            .push(ChatMessage::user(prompts::template_turn()));
        self.ingest(prompts::REACT_TEMPLATE).await;
    }

    /// Sends one user prompt to the model backend and folds the response
    /// into the session. One request in flight per session: callers get an
    /// error (and should keep input disabled) until the previous call
    /// resolved. A failed call appends no steps and mutates no tree.
    pub async fn submit(&mut self, prompt: &str) -> Result<()> {
        if self.in_flight {
            bail!("a model request is already in flight");
        }

        let mut request = self.messages.clone();
        request.push(ChatMessage::user(prompt));

        self.in_flight = true;
        let result = self.backend.complete(&request).await;
        self.in_flight = false;

        match result {
            Ok(response) => {
                self.last_error = None;
                self.messages = request;
                self.messages.push(ChatMessage::assistant(response.clone()));
                self.ingest(&response).await;
                Ok(())
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Parse → append → reconcile → re-project, synchronously to
    /// completion. The only await point is the sandbox mount hand-off.
    async fn ingest(&mut self, response: &str) {
        let actions = parsing::parse_actions(response);
        if actions.is_empty() {
            return;
        }
        self.sequencer.append(actions);
        self.on_steps_changed().await;
    }

    async fn on_steps_changed(&mut self) {
        if let Some(next) = tree::reconcile(self.sequencer.steps_mut(), &self.tree) {
            self.tree = Arc::new(next);
            self.on_tree_changed().await;
        }
    }

    async fn on_tree_changed(&mut self) {
        let _ = self.tree_tx.send(self.tree.clone());
        let description = mount::project(&self.tree);
        // Fire and forget: the core does not verify the mount succeeded.
        if let Err(e) = self.sandbox.mount(&description).await {
            tracing::warn!("sandbox mount failed: {e:#}");
        }
    }

    pub fn steps(&self) -> &[Step] {
        self.sequencer.steps()
    }

    pub fn tree(&self) -> Arc<FileTree> {
        self.tree.clone()
    }

    /// Watch-channel subscription for tree snapshots (UI, projector).
    pub fn subscribe_tree(&self) -> watch::Receiver<Arc<FileTree>> {
        self.tree_tx.subscribe()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
