//! Best-effort bulk embedding of files and sessions.
//!
//! Two levels of the same partial-failure policy, implemented once as
//! [`map_best_effort`]:
//!
//! - per fragment: a failed provider call skips that fragment (its
//!   vector stays absent) and the rest of the file continues;
//! - per file: a failed file is logged and the rest of the session
//!   continues.
//!
//! Fragments are embedded in batches of the configured size; a failed
//! batch is retried fragment by fragment so one bad fragment cannot
//! take down its batchmates.
//!
//! Code context is a best-effort enhancement of the chat path, never
//! a hard requirement, so nothing here aborts a batch. Only store
//! write failures propagate.

use anyhow::{bail, Result};
use std::future::Future;
use tracing::warn;

use code_context_core::embedding::EmbeddingProvider;
use code_context_core::models::SourceFile;
use code_context_core::store::FileStore;

/// Outcome of a best-effort map: index-tagged successes and failures.
pub struct BestEffort<U> {
    pub successes: Vec<(usize, U)>,
    pub failures: Vec<(usize, anyhow::Error)>,
}

/// Apply `f` to every item, collecting successes and failures instead
/// of stopping at the first error. Items run sequentially, in order,
/// which keeps provider-call ordering predictable in logs.
pub async fn map_best_effort<T, U, F, Fut>(
    items: impl IntoIterator<Item = T>,
    mut f: F,
) -> BestEffort<U>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<U>>,
{
    let mut successes = Vec::new();
    let mut failures = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        match f(item).await {
            Ok(value) => successes.push((index, value)),
            Err(err) => failures.push((index, err)),
        }
    }

    BestEffort {
        successes,
        failures,
    }
}

/// Embed every fragment of one file and persist the result.
///
/// Recomputes and overwrites vectors for all fragments (idempotent:
/// the same provider output and fragment text produce the same stored
/// state). Fragments are embedded in batches of `batch_size`; when a
/// batch call fails, its fragments are retried one by one, and only
/// the individually-failing fragments are skipped. A skipped fragment
/// never aborts the file. The file is saved once at the end with
/// whatever subset of fragments now carry vectors.
///
/// Returns the number of fragments embedded. Only the final store
/// write can fail.
pub async fn generate_embeddings_for_file<S: FileStore + ?Sized>(
    store: &S,
    provider: &dyn EmbeddingProvider,
    batch_size: usize,
    file: &mut SourceFile,
) -> Result<usize> {
    // Full recompute: drop any vectors from a previous run first.
    for fragment in file.fragments.iter_mut() {
        fragment.embedding = None;
    }

    let texts: Vec<String> = file.fragments.iter().map(|f| f.text.clone()).collect();
    let batch_size = batch_size.max(1);
    let mut embedded = 0usize;

    for (batch_index, batch) in texts.chunks(batch_size).enumerate() {
        let base = batch_index * batch_size;

        let batch_result = provider.embed_batch(batch).await.and_then(|vectors| {
            if vectors.len() == batch.len() {
                Ok(vectors)
            } else {
                bail!(
                    "provider returned {} vectors for {} inputs",
                    vectors.len(),
                    batch.len()
                )
            }
        });

        match batch_result {
            Ok(vectors) => {
                for (offset, vector) in vectors.into_iter().enumerate() {
                    file.fragments[base + offset].embedding = Some(vector);
                    embedded += 1;
                }
            }
            Err(err) => {
                warn!(
                    file = %file.name,
                    batch = batch_index,
                    error = %err,
                    "batch embedding failed; retrying fragments individually"
                );
                let outcome = map_best_effort(batch.to_vec(), |text| async move {
                    provider.embed(&text).await
                })
                .await;

                for (offset, err) in &outcome.failures {
                    warn!(
                        file = %file.name,
                        fragment = base + *offset,
                        error = %err,
                        "fragment embedding failed; skipping"
                    );
                }
                for (offset, vector) in outcome.successes {
                    file.fragments[base + offset].embedding = Some(vector);
                    embedded += 1;
                }
            }
        }
    }

    store.save_file(file).await?;
    Ok(embedded)
}

/// Summary of a session-wide embedding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEmbedReport {
    pub files_processed: usize,
    pub fragments_embedded: usize,
    pub files_failed: usize,
}

/// Embed every file belonging to a session, fire-and-continue.
///
/// A single file's failure (store write included) is logged and does
/// not stop processing of the remaining files. Listing the session's
/// files is the only hard failure.
pub async fn generate_embeddings_for_session<S: FileStore + ?Sized>(
    store: &S,
    provider: &dyn EmbeddingProvider,
    batch_size: usize,
    session_id: &str,
) -> Result<SessionEmbedReport> {
    let files = store.list_files_for_session(session_id).await?;
    let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();

    let outcome = map_best_effort(files, |mut file| async move {
        generate_embeddings_for_file(store, provider, batch_size, &mut file).await
    })
    .await;

    for (index, err) in &outcome.failures {
        warn!(
            session = session_id,
            file = %names[*index],
            error = %err,
            "file embedding failed; continuing with remaining files"
        );
    }

    Ok(SessionEmbedReport {
        files_processed: outcome.successes.len(),
        fragments_embedded: outcome.successes.iter().map(|(_, n)| n).sum(),
        files_failed: outcome.failures.len(),
    })
}
