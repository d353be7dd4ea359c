//! Directory loader used by the CLI.
//!
//! Walks a directory, reads recognized source files, detects their
//! language from the file extension, chunks them, and saves them into
//! a [`FileStore`] under a session. This stands in for the upload
//! workflow the engine normally sits behind.

use anyhow::{bail, Result};
use chrono::Utc;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;
use walkdir::WalkDir;

use code_context_core::chunk::chunk_source;
use code_context_core::models::SourceFile;
use code_context_core::store::FileStore;

const SKIP_DIRS: &[&str] = &[".git", "target", "node_modules", "__pycache__", "dist"];

/// Map a file extension to a language tag. Unknown extensions get the
/// extension itself as the tag, which the chunker treats as generic.
pub fn language_from_extension(ext: &str) -> String {
    match ext.to_ascii_lowercase().as_str() {
        "ts" | "tsx" => "typescript".to_string(),
        "js" | "jsx" | "mjs" => "javascript".to_string(),
        "py" => "python".to_string(),
        "rs" => "rust".to_string(),
        "go" => "go".to_string(),
        other => other.to_string(),
    }
}

/// Load every UTF-8 source file under `root` into the store as
/// session files. Returns the loaded files in deterministic
/// (path-sorted) order.
pub async fn load_directory<S: FileStore + ?Sized>(
    store: &S,
    session_id: &str,
    root: &Path,
) -> Result<Vec<SourceFile>> {
    if !root.is_dir() {
        bail!("Not a directory: {}", root.display());
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let skip = entry
            .path()
            .components()
            .any(|c| SKIP_DIRS.contains(&c.as_os_str().to_string_lossy().as_ref()));
        if !skip {
            paths.push(entry.path().to_path_buf());
        }
    }
    paths.sort();

    let mut files = Vec::new();
    for path in paths {
        // Binary and non-UTF-8 files are skipped, not errors.
        let Ok(content) = std::fs::read_to_string(&path) else {
            debug!(path = %path.display(), "skipping non-UTF-8 file");
            continue;
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let language = path
            .extension()
            .map(|e| language_from_extension(&e.to_string_lossy()))
            .unwrap_or_else(|| "text".to_string());

        let id = Uuid::new_v4().to_string();
        let file = SourceFile {
            fragments: chunk_source(&id, &content, &language),
            id,
            session_id: Some(session_id.to_string()),
            name,
            language,
            content,
            uploaded_at: Utc::now(),
        };

        store.save_file(&file).await?;
        files.push(file);
    }

    Ok(files)
}
