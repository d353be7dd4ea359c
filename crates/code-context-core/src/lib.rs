//! # Code Context Core
//!
//! Shared logic for Code Context: data models, structural chunking,
//! file store abstraction, similarity ranking, and context assembly.
//!
//! This crate contains no tokio, reqwest, filesystem I/O, or other
//! runtime-heavy dependencies. Everything here is either a pure
//! function or an abstraction over capabilities the application
//! crate supplies (storage backends, embedding providers).

pub mod assemble;
pub mod chunk;
pub mod embedding;
pub mod language;
pub mod models;
pub mod rank;
pub mod store;
