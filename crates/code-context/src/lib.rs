//! # Code Context
//!
//! Retrieval-augmentation engine for chat assistants. Given a
//! natural-language query and a set of previously uploaded source
//! files, it retrieves the most relevant code fragments and assembles
//! them into a bounded-size context block for a downstream language
//! model.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌────────────┐
//! │ Chunker  │──▶│ FileStore  │◀──│  Pipeline   │──▶ EmbeddingProvider
//! └──────────┘   └─────┬─────┘   └────────────┘
//!                      │
//!                      ▼
//!               ┌─────────────┐   ┌────────────┐
//!               │   Ranker    │──▶│ Assembler   │──▶ prompt text
//!               └─────────────┘   └────────────┘
//! ```
//!
//! Write path: uploads are chunked and stored; the pipeline attaches
//! embedding vectors fragment by fragment, skipping failures. Read
//! path: a query is embedded, ranked against the session's fragments,
//! and assembled into a prompt. Context building never fails the chat
//! path — every quality-affecting error degrades to a lesser prompt.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`embedding`] | Concrete embedding providers (OpenAI, Ollama, disabled) |
//! | [`pipeline`] | Best-effort bulk embedding of files and sessions |
//! | [`context`] | Per-query context building and semantic search |
//! | [`loader`] | Directory loader used by the CLI |

pub mod config;
pub mod context;
pub mod embedding;
pub mod loader;
pub mod pipeline;
