//! # Main Entry Point
//!
//! Wires the pipeline together: configuration, logging, the model backend,
//! the local sandbox and one interactive build session. The console loop
//! here is a stand-in for the chat UI; the interesting work happens in the
//! application layer.

mod application;
mod config;
mod domain;
mod infrastructure;
mod prompts;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::session::Session;
use crate::config::AppConfig;
use crate::domain::types::{Action, FileNode, Step};
use crate::infrastructure::backend::AnthropicBackend;
use crate::infrastructure::sandbox::LocalSandbox;

#[derive(Parser)]
#[command(
    name = "webforge",
    about = "Build a runnable web app from a natural-language description"
)]
struct Cli {
    /// Initial app description. Further prompts are read interactively.
    prompt: Vec<String>,

    #[arg(long, default_value = "data/config.yaml")]
    config: PathBuf,

    /// Overrides `sandbox.root_dir` from the config file.
    #[arg(long)]
    sandbox_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    // 1. Logging Setup
    if !std::path::Path::new("data").exists() {
        fs::create_dir("data").context("Failed to create data directory")?;
    }
    let file_appender = tracing_appender::rolling::never("data", "session.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hyper=warn,reqwest=warn"));

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    tracing::info!("Starting webforge...");

    // 2. Collaborators
    let sandbox_root = cli
        .sandbox_dir
        .unwrap_or_else(|| PathBuf::from(&config.sandbox.root_dir));
    let sandbox = Arc::new(LocalSandbox::new(sandbox_root)?);
    println!("Project mounts to {}", sandbox.root_dir().display());

    let backend = Arc::new(AnthropicBackend::new(config.backend.clone()));

    // 3. Session
    let mut session = Session::new(backend, sandbox);
    session.bootstrap().await;
    println!("Starter template mounted ({} files).", count_files(&session));

    if !cli.prompt.is_empty() {
        run_turn(&mut session, &cli.prompt.join(" ")).await;
    }

    // 4. Interactive loop. One request in flight: the prompt only comes
    // back once the previous submission resolved.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        if prompt == "exit" || prompt == "quit" {
            break;
        }
        run_turn(&mut session, prompt).await;
    }

    Ok(())
}

async fn run_turn(session: &mut Session, prompt: &str) {
    let seen = session.steps().len();
    match session.submit(prompt).await {
        Ok(()) => {
            print_steps(&session.steps()[seen..]);
            print_tree(&session.tree().roots, 0);
        }
        Err(e) => {
            tracing::error!("model request failed: {e:#}");
            eprintln!("Service error: {e:#}");
            eprintln!("Nothing was changed. You can retry the same prompt.");
        }
    }
}

fn print_steps(steps: &[Step]) {
    for step in steps {
        match &step.action {
            Action::Description(text) => println!("{text}\n"),
            Action::CreateFile { path, .. } => println!("  + {path}"),
            Action::RunCommand { command } => {
                println!("  $ {command}  (run this inside the sandbox)");
            }
        }
    }
}

fn print_tree(nodes: &[FileNode], depth: usize) {
    for node in nodes {
        let indent = "  ".repeat(depth + 1);
        match node {
            FileNode::File { name, .. } => println!("{indent}{name}"),
            FileNode::Folder { name, children, .. } => {
                println!("{indent}{name}/");
                print_tree(children, depth + 1);
            }
        }
    }
}

fn count_files(session: &Session) -> usize {
    fn walk(nodes: &[FileNode]) -> usize {
        nodes
            .iter()
            .map(|n| match n {
                FileNode::File { .. } => 1,
                FileNode::Folder { children, .. } => walk(children),
            })
            .sum()
    }
    walk(&session.tree().roots)
}
