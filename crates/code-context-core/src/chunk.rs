//! Structural source chunker.
//!
//! Splits a source file's text into [`Fragment`]s along structural
//! boundaries (function, class, and interface declarations) so each
//! fragment is a meaningful unit of retrieval.
//!
//! # Algorithm
//!
//! 1. Resolve the language tag to a [`LanguageFamily`] once, up front.
//! 2. Scan lines in a single pass. When a line matches one of the
//!    family's boundary patterns, close the open fragment at the
//!    previous line and open a new one of the matched kind.
//! 3. Every line, matched or not, is appended to the open fragment.
//! 4. At end of input, close and emit the last open fragment.
//!
//! If no boundary is found anywhere, the scan degenerates to a single
//! fragment of kind `other` spanning the whole file, so every file
//! always has at least one fragment. Empty content yields one empty
//! `other` fragment.
//!
//! Each fragment's identifier is `<file_id>#<index>`, and its hash is
//! the SHA-256 of its text, which makes chunking fully deterministic:
//! identical `(content, language)` input produces identical fragments.

use sha2::{Digest, Sha256};

use crate::language::LanguageFamily;
use crate::models::{Fragment, FragmentKind};

/// Split source content into ordered, non-overlapping fragments.
///
/// # Guarantees
///
/// - At least one fragment is always returned.
/// - Fragments are in line order and partition `[1, line_count]`.
/// - Identical input yields identical output (no randomness).
pub fn chunk_source(file_id: &str, content: &str, language: &str) -> Vec<Fragment> {
    let family = LanguageFamily::from_tag(language);
    let lines: Vec<&str> = content.lines().collect();

    if lines.is_empty() {
        return vec![make_fragment(file_id, 0, FragmentKind::Other, 1, 1, "")];
    }

    struct OpenFragment {
        kind: FragmentKind,
        start_line: usize,
        text: String,
    }

    let mut fragments = Vec::new();
    let mut open: Option<OpenFragment> = None;
    let mut index = 0usize;

    for (i, line) in lines.iter().enumerate() {
        let line_no = i + 1;

        if let Some(kind) = family.match_boundary(line) {
            if let Some(prev) = open.take() {
                fragments.push(make_fragment(
                    file_id,
                    index,
                    prev.kind,
                    prev.start_line,
                    line_no - 1,
                    &prev.text,
                ));
                index += 1;
            }
            open = Some(OpenFragment {
                kind,
                start_line: line_no,
                text: String::new(),
            });
        } else if open.is_none() {
            // Leading lines before the first boundary.
            open = Some(OpenFragment {
                kind: FragmentKind::Other,
                start_line: line_no,
                text: String::new(),
            });
        }

        let current = open.as_mut().expect("a fragment is always open here");
        if !current.text.is_empty() {
            current.text.push('\n');
        }
        current.text.push_str(line);
    }

    if let Some(last) = open.take() {
        fragments.push(make_fragment(
            file_id,
            index,
            last.kind,
            last.start_line,
            lines.len(),
            &last.text,
        ));
    }

    fragments
}

fn make_fragment(
    file_id: &str,
    index: usize,
    kind: FragmentKind,
    start_line: usize,
    end_line: usize,
    text: &str,
) -> Fragment {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Fragment {
        id: format!("{}#{}", file_id, index),
        text: text.to_string(),
        start_line,
        end_line,
        kind,
        hash,
        embedding: None,
    }
}
