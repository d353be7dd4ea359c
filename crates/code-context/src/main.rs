//! # Code Context CLI (`codectx`)
//!
//! Exercises the retrieval-augmentation engine against a local
//! directory: chunk a single file, inspect semantic search results,
//! or assemble the full prompt a chat assistant would receive.
//!
//! ## Usage
//!
//! ```bash
//! codectx chunk src/server.ts
//! codectx search ./my-project "where is the auth middleware?"
//! codectx context ./my-project "how does login work?"
//! ```
//!
//! Embedding is configured via a TOML file (`--config`); without one,
//! the provider is disabled and `context` falls back to raw file
//! previews. The OpenAI credential is taken from `OPENAI_API_KEY` and
//! passed into the provider per invocation.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use code_context::config::{load_config, Config};
use code_context::context::{build_context_prompt, search_fragments};
use code_context::embedding::create_provider;
use code_context::loader::{language_from_extension, load_directory};
use code_context::pipeline::generate_embeddings_for_session;
use code_context_core::chunk::chunk_source;
use code_context_core::language::{extract_dependencies, extract_exports};
use code_context_core::store::memory::InMemoryFileStore;

/// Code Context — retrieval-augmentation engine for chat assistants.
#[derive(Parser)]
#[command(
    name = "codectx",
    about = "Chunk source files, embed them, and assemble bounded prompt context",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Optional; without it the
    /// embedding provider is disabled.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk a single source file and print its fragments,
    /// dependencies, and exports.
    Chunk {
        /// Path to the source file.
        path: PathBuf,
    },

    /// Run semantic search over a directory and print the match
    /// report as JSON. Requires an embedding provider.
    Search {
        /// Directory to load as the session's files.
        dir: PathBuf,

        /// The search query string.
        query: String,
    },

    /// Assemble and print the prompt for a query over a directory.
    Context {
        /// Directory to load as the session's files.
        dir: PathBuf,

        /// The user's question.
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Chunk { path } => run_chunk(&path),
        Commands::Search { dir, query } => run_search(&config, &dir, &query).await,
        Commands::Context { dir, query } => run_context(&config, &dir, &query).await,
    }
}

fn run_chunk(path: &std::path::Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let language = path
        .extension()
        .map(|e| language_from_extension(&e.to_string_lossy()))
        .unwrap_or_else(|| "text".to_string());

    let fragments = chunk_source("file", &content, &language);
    println!("{} ({}, {} fragments)", path.display(), language, fragments.len());
    for fragment in &fragments {
        println!(
            "  {:>4}-{:<4} {:<9} {}",
            fragment.start_line,
            fragment.end_line,
            fragment.kind.as_str(),
            fragment.text.lines().next().unwrap_or("")
        );
    }

    let deps = extract_dependencies(&content, &language);
    if !deps.is_empty() {
        println!("dependencies: {}", deps.join(", "));
    }
    let exports = extract_exports(&content, &language);
    if !exports.is_empty() {
        println!("exports: {}", exports.join(", "));
    }

    Ok(())
}

async fn run_search(config: &Config, dir: &std::path::Path, query: &str) -> Result<()> {
    let store = InMemoryFileStore::new();
    let session_id = "cli";
    load_directory(&store, session_id, dir).await?;

    let credential = std::env::var("OPENAI_API_KEY").ok();
    let provider = create_provider(&config.embedding, credential.as_deref())?;

    let report = generate_embeddings_for_session(
        &store,
        provider.as_ref(),
        config.embedding.batch_size,
        session_id,
    )
    .await?;
    eprintln!(
        "embedded {} fragments across {} files ({} failed)",
        report.fragments_embedded, report.files_processed, report.files_failed
    );

    let search = search_fragments(&store, provider.as_ref(), config, session_id, query).await?;
    println!("{}", serde_json::to_string_pretty(&search)?);
    Ok(())
}

async fn run_context(config: &Config, dir: &std::path::Path, query: &str) -> Result<()> {
    let store = InMemoryFileStore::new();
    let session_id = "cli";
    load_directory(&store, session_id, dir).await?;

    let credential = std::env::var("OPENAI_API_KEY").ok();
    let provider = create_provider(&config.embedding, credential.as_deref())?;

    if config.embedding.is_enabled() {
        generate_embeddings_for_session(
            &store,
            provider.as_ref(),
            config.embedding.batch_size,
            session_id,
        )
        .await?;
    }

    let prompt = build_context_prompt(&store, provider.as_ref(), config, session_id, query).await?;
    println!("{}", prompt);
    Ok(())
}
