//! Core data models used throughout Code Context.
//!
//! These types represent the uploaded source files and the structural
//! fragments that flow through the chunking, embedding, and retrieval
//! pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structural kind of a [`Fragment`], derived from the boundary
/// pattern that opened it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentKind {
    Function,
    Class,
    Interface,
    Block,
    Other,
}

impl FragmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FragmentKind::Function => "function",
            FragmentKind::Class => "class",
            FragmentKind::Interface => "interface",
            FragmentKind::Block => "block",
            FragmentKind::Other => "other",
        }
    }
}

impl std::fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structurally meaningful slice of a source file — the unit of
/// retrieval.
///
/// Fragments within a file are produced in line order and do not
/// overlap. Line numbers are 1-based and `end_line` is inclusive.
/// The `embedding` is absent until the embedding pipeline has run
/// (and stays absent for fragments whose provider call failed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    /// Identifier unique within the owning file (`<file_id>#<index>`).
    pub id: String,
    /// The literal text span.
    pub text: String,
    /// First line of the span (1-based).
    pub start_line: usize,
    /// Last line of the span (1-based, inclusive).
    pub end_line: usize,
    /// Structural kind detected at the opening boundary.
    pub kind: FragmentKind,
    /// SHA-256 of `text`, for staleness detection and determinism checks.
    pub hash: String,
    /// Embedding vector, present only after successful generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Fragment {
    /// Number of lines covered by this fragment.
    pub fn line_span(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

/// An uploaded source file together with its chunked fragments.
///
/// The upload workflow owns creation; the core reads files and
/// augments their fragments with embedding vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub id: String,
    /// Owning chat session, if the file has been associated with one.
    pub session_id: Option<String>,
    /// Display name (usually the original filename).
    pub name: String,
    /// Detected language tag, e.g. `"typescript"` or `"python"`.
    pub language: String,
    /// Full text content.
    pub content: String,
    /// Ordered, non-overlapping fragments covering the content.
    pub fragments: Vec<Fragment>,
    pub uploaded_at: DateTime<Utc>,
}

impl SourceFile {
    /// Number of lines in the file's content.
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }

    /// Whether any fragment carries an embedding vector.
    pub fn has_embeddings(&self) -> bool {
        self.fragments.iter().any(|f| f.embedding.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_kind_as_str() {
        assert_eq!(FragmentKind::Function.as_str(), "function");
        assert_eq!(FragmentKind::Other.as_str(), "other");
    }

    #[test]
    fn test_line_span_inclusive() {
        let frag = Fragment {
            id: "f#0".to_string(),
            text: String::new(),
            start_line: 10,
            end_line: 80,
            kind: FragmentKind::Function,
            hash: String::new(),
            embedding: None,
        };
        assert_eq!(frag.line_span(), 71);
    }
}
