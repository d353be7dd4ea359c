//! Similarity ranking over embedded fragments.
//!
//! Given a query vector and a session's files, scores every fragment
//! that carries an embedding and returns an ordered top-k. This is a
//! pure, synchronous computation: cost is O(candidates × vector
//! length), which is acceptable because the candidate set is one
//! session's files, never a global index.
//!
//! Fragments without a vector are excluded from the candidate set
//! entirely — they are not scored as zero, they are simply absent.
//! Ties are broken by stable input order (first-seen file, then
//! first-seen fragment) so results are reproducible.

use serde::Serialize;

use crate::embedding::cosine_similarity;
use crate::models::{FragmentKind, SourceFile};

/// Characters of fragment text carried into a match for display.
pub const SNIPPET_CHARS: usize = 240;

/// A scored (file, fragment) pair produced by [`find_similar`].
///
/// Flattens the fields a caller needs for presentation or direct
/// serialization, so no store round-trip is required afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct RankedMatch {
    pub file_id: String,
    pub file_name: String,
    pub fragment_id: String,
    pub kind: FragmentKind,
    pub start_line: usize,
    pub end_line: usize,
    /// Cosine similarity; in `[-1, 1]`, typically `[0, 1]` for
    /// natural-language and code embeddings.
    pub similarity: f32,
    /// Leading text of the fragment, capped at [`SNIPPET_CHARS`].
    pub snippet: String,
}

/// The reusable reporting shape for semantic-search endpoints:
/// the ordered matches plus the original query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub query: String,
    pub matches: Vec<RankedMatch>,
}

/// Score every embedded fragment across `files` against `query_vec`
/// and return the top `limit` matches, best first.
///
/// The output length never exceeds `min(limit, candidate count)`.
/// Mismatched vector lengths and zero-magnitude vectors score 0
/// (see [`cosine_similarity`]); an empty candidate set yields an
/// empty result, not an error.
pub fn find_similar(query_vec: &[f32], files: &[SourceFile], limit: usize) -> Vec<RankedMatch> {
    let mut matches: Vec<RankedMatch> = Vec::new();

    for file in files {
        for fragment in &file.fragments {
            let Some(vector) = &fragment.embedding else {
                continue;
            };
            let similarity = cosine_similarity(query_vec, vector);
            matches.push(RankedMatch {
                file_id: file.id.clone(),
                file_name: file.name.clone(),
                fragment_id: fragment.id.clone(),
                kind: fragment.kind,
                start_line: fragment.start_line,
                end_line: fragment.end_line,
                similarity,
                snippet: fragment.text.chars().take(SNIPPET_CHARS).collect(),
            });
        }
    }

    // Stable sort: equal scores keep first-seen file/fragment order.
    matches.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(limit);
    matches
}
