//! Context assembly and prompt rendering.
//!
//! Combines ranked fragment matches (or raw file previews when no
//! matches exist) with a project summary into a single bounded
//! [`AssembledContext`], then renders it as the text block handed to
//! the downstream language model.
//!
//! An `AssembledContext` is constructed fresh per query and never
//! persisted. The prompt is bounded regardless of uploaded file size:
//! matches carry capped snippets, and raw previews are hard-truncated
//! at [`PREVIEW_CHAR_BUDGET`] characters with an explicit marker.

use serde::Serialize;

use crate::models::SourceFile;
use crate::rank::RankedMatch;

/// Matches rendered into the prompt (the ranker may return more).
pub const PROMPT_MATCH_LIMIT: usize = 5;
/// Raw-file previews included when no matches exist.
pub const PREVIEW_FILE_LIMIT: usize = 3;
/// Hard cap on characters of any one file's content in the prompt.
pub const PREVIEW_CHAR_BUDGET: usize = 2000;
/// Appended to previews that hit the character budget.
pub const TRUNCATION_MARKER: &str = "[Content truncated]";

/// Filename substrings that mark a file as a project entry point.
const MAIN_FILE_MARKERS: &[&str] = &["index", "main", "app"];

/// Aggregate facts about a session's files.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub file_count: usize,
    /// Distinct language tags, in first-seen order.
    pub languages: Vec<String>,
    /// Sum of line counts across all files.
    pub total_lines: usize,
    /// Files whose name suggests an entry point (`index`, `main`, `app`).
    pub main_files: Vec<String>,
}

/// A length-bounded slice of one file's raw content, used as
/// fallback grounding when no ranked matches exist.
#[derive(Debug, Clone, Serialize)]
pub struct FilePreview {
    pub file_name: String,
    /// At most [`PREVIEW_CHAR_BUDGET`] characters.
    pub content: String,
    pub truncated: bool,
}

/// Everything needed to render one query's prompt. Built fresh per
/// query, discarded after [`build_prompt`].
#[derive(Debug, Clone, Serialize)]
pub struct AssembledContext {
    pub query: String,
    pub summary: ProjectSummary,
    pub matches: Vec<RankedMatch>,
    pub previews: Vec<FilePreview>,
}

impl AssembledContext {
    /// An explicitly-empty context for a session with no files.
    pub fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            summary: ProjectSummary {
                file_count: 0,
                languages: Vec::new(),
                total_lines: 0,
                main_files: Vec::new(),
            },
            matches: Vec::new(),
            previews: Vec::new(),
        }
    }
}

/// Build the project summary for a set of files.
pub fn build_summary(files: &[SourceFile]) -> ProjectSummary {
    let mut languages: Vec<String> = Vec::new();
    for file in files {
        if !languages.contains(&file.language) {
            languages.push(file.language.clone());
        }
    }

    let main_files = files
        .iter()
        .filter(|f| {
            let lower = f.name.to_lowercase();
            MAIN_FILE_MARKERS.iter().any(|m| lower.contains(m))
        })
        .map(|f| f.name.clone())
        .collect();

    ProjectSummary {
        file_count: files.len(),
        languages,
        total_lines: files.iter().map(|f| f.line_count()).sum(),
        main_files,
    }
}

/// Combine files and ranked matches into an [`AssembledContext`].
///
/// When `matches` is empty but files exist, up to
/// [`PREVIEW_FILE_LIMIT`] raw previews are included instead, so the
/// assistant still has some grounding.
pub fn assemble_context(
    query: &str,
    files: &[SourceFile],
    matches: Vec<RankedMatch>,
) -> AssembledContext {
    if files.is_empty() {
        return AssembledContext::empty(query);
    }

    let previews = if matches.is_empty() {
        files
            .iter()
            .take(PREVIEW_FILE_LIMIT)
            .map(make_preview)
            .collect()
    } else {
        Vec::new()
    };

    AssembledContext {
        query: query.to_string(),
        summary: build_summary(files),
        matches,
        previews,
    }
}

fn make_preview(file: &SourceFile) -> FilePreview {
    let truncated = file.content.chars().count() > PREVIEW_CHAR_BUDGET;
    let content = if truncated {
        file.content.chars().take(PREVIEW_CHAR_BUDGET).collect()
    } else {
        file.content.clone()
    };
    FilePreview {
        file_name: file.name.clone(),
        content,
        truncated,
    }
}

/// Render the prompt text handed to the language model.
///
/// A context with zero files renders as the raw query, unchanged.
/// Otherwise: project overview, then up to [`PROMPT_MATCH_LIMIT`]
/// matches (or the previews), then the original query under a
/// delimited "User Question" heading so the model can tell
/// instructions from context.
pub fn build_prompt(context: &AssembledContext) -> String {
    if context.summary.file_count == 0 {
        return context.query.clone();
    }

    let mut out = String::new();
    out.push_str("# Project Context\n\n");
    out.push_str(&format!("Files: {}\n", context.summary.file_count));
    out.push_str(&format!(
        "Languages: {}\n",
        context.summary.languages.join(", ")
    ));
    out.push_str(&format!("Total lines: {}\n", context.summary.total_lines));
    if !context.summary.main_files.is_empty() {
        out.push_str(&format!(
            "Main files: {}\n",
            context.summary.main_files.join(", ")
        ));
    }
    out.push('\n');

    if !context.matches.is_empty() {
        out.push_str("## Relevant Code\n\n");
        for m in context.matches.iter().take(PROMPT_MATCH_LIMIT) {
            out.push_str(&format!(
                "### {} — {} (lines {}-{}, similarity {:.2})\n",
                m.file_name, m.kind, m.start_line, m.end_line, m.similarity
            ));
            out.push_str(&m.snippet);
            out.push_str("\n\n");
        }
    } else if !context.previews.is_empty() {
        out.push_str("## File Contents\n\n");
        for p in &context.previews {
            out.push_str(&format!("### {}\n", p.file_name));
            out.push_str(&p.content);
            if p.truncated {
                out.push('\n');
                out.push_str(TRUNCATION_MARKER);
            }
            out.push_str("\n\n");
        }
    }

    out.push_str("## User Question\n\n");
    out.push_str(&context.query);
    out
}
