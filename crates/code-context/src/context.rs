//! Per-query context building.
//!
//! The read path of the engine: resolve the session's files, embed
//! the query, rank fragments, and hand everything to the core
//! assembler. Context augmentation is optional, never load-bearing —
//! any provider or ranking failure is logged and the builder degrades
//! to a prompt without matches (or, with no files at all, to the raw
//! query). Only file-store failures propagate.

use anyhow::Result;
use tracing::{debug, warn};

use code_context_core::assemble::{assemble_context, build_prompt, AssembledContext};
use code_context_core::embedding::EmbeddingProvider;
use code_context_core::models::SourceFile;
use code_context_core::rank::{find_similar, RankedMatch, SearchReport};
use code_context_core::store::FileStore;

use crate::config::Config;

/// Build the assembled context for one query against one session.
///
/// If the session has no files and `context.claim_unassigned_files`
/// is enabled, files without any session association are claimed
/// once (compatibility fallback for uploads that raced session
/// creation). A session that is still empty yields an explicitly
/// empty context, not an error.
pub async fn build_context<S: FileStore + ?Sized>(
    store: &S,
    provider: &dyn EmbeddingProvider,
    config: &Config,
    session_id: &str,
    query: &str,
) -> Result<AssembledContext> {
    let mut files = store.list_files_for_session(session_id).await?;

    if files.is_empty() && config.context.claim_unassigned_files {
        let orphans = store.list_files_without_session().await?;
        if !orphans.is_empty() {
            let ids: Vec<String> = orphans.iter().map(|f| f.id.clone()).collect();
            store.reassign_files_to_session(&ids, session_id).await?;
            warn!(
                session = session_id,
                count = ids.len(),
                "claimed unassigned files into session"
            );
            files = store.list_files_for_session(session_id).await?;
        }
    }

    if files.is_empty() {
        debug!(session = session_id, "no files for session; empty context");
        return Ok(AssembledContext::empty(query));
    }

    let matches = match rank_query(provider, config, query, &files).await {
        Ok(matches) => matches,
        Err(err) => {
            warn!(
                session = session_id,
                error = %err,
                "query embedding failed; building context without matches"
            );
            Vec::new()
        }
    };

    Ok(assemble_context(query, &files, matches))
}

/// Convenience: build the context and render it in one call.
pub async fn build_context_prompt<S: FileStore + ?Sized>(
    store: &S,
    provider: &dyn EmbeddingProvider,
    config: &Config,
    session_id: &str,
    query: &str,
) -> Result<String> {
    let context = build_context(store, provider, config, session_id, query).await?;
    Ok(build_prompt(&context))
}

/// Semantic search over a session's fragments: the serializable
/// report shape consumed by search endpoints. Degrades to an empty
/// match list on provider failure, like [`build_context`].
pub async fn search_fragments<S: FileStore + ?Sized>(
    store: &S,
    provider: &dyn EmbeddingProvider,
    config: &Config,
    session_id: &str,
    query: &str,
) -> Result<SearchReport> {
    let files = store.list_files_for_session(session_id).await?;

    let matches = match rank_query(provider, config, query, &files).await {
        Ok(matches) => matches,
        Err(err) => {
            warn!(session = session_id, error = %err, "semantic search degraded to no matches");
            Vec::new()
        }
    };

    Ok(SearchReport {
        query: query.to_string(),
        matches,
    })
}

/// Embed the query and rank the session's fragments against it.
/// Similarities are rounded to two decimals for presentation.
async fn rank_query(
    provider: &dyn EmbeddingProvider,
    config: &Config,
    query: &str,
    files: &[SourceFile],
) -> Result<Vec<RankedMatch>> {
    if !config.embedding.is_enabled() {
        return Ok(Vec::new());
    }

    let query_vec = provider.embed(query).await?;
    let mut matches = find_similar(&query_vec, files, config.context.match_limit);
    for m in &mut matches {
        m.similarity = (m.similarity * 100.0).round() / 100.0;
    }

    debug!(
        candidates = files.iter().map(|f| f.fragments.len()).sum::<usize>(),
        matches = matches.len(),
        "ranked session fragments"
    );
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use async_trait::async_trait;
    use chrono::Utc;
    use code_context_core::chunk::chunk_source;
    use code_context_core::store::memory::InMemoryFileStore;

    struct AlwaysFailingProvider;

    #[async_trait]
    impl EmbeddingProvider for AlwaysFailingProvider {
        fn model_name(&self) -> &str {
            "failing"
        }
        fn dims(&self) -> usize {
            0
        }
        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            bail!("provider is down")
        }
    }

    /// Embeds any text as a fixed unit vector so every fragment ties.
    struct ConstantProvider;

    #[async_trait]
    impl EmbeddingProvider for ConstantProvider {
        fn model_name(&self) -> &str {
            "constant"
        }
        fn dims(&self) -> usize {
            2
        }
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    fn enabled_config() -> Config {
        let mut config = Config::default();
        config.embedding.provider = "test".to_string();
        config.embedding.model = Some("test".to_string());
        config.embedding.dims = Some(2);
        config
    }

    fn make_file(id: &str, session: Option<&str>, content: &str) -> SourceFile {
        SourceFile {
            id: id.to_string(),
            session_id: session.map(|s| s.to_string()),
            name: format!("{}.py", id),
            language: "python".to_string(),
            content: content.to_string(),
            fragments: chunk_source(id, content, "python"),
            uploaded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_empty_session_prompt_is_raw_query() {
        let store = InMemoryFileStore::new();
        let prompt = build_context_prompt(
            &store,
            &AlwaysFailingProvider,
            &enabled_config(),
            "s1",
            "hello",
        )
        .await
        .unwrap();
        assert_eq!(prompt, "hello");
    }

    #[tokio::test]
    async fn test_failing_provider_degrades_to_previews() {
        let store = InMemoryFileStore::new();
        store
            .save_file(&make_file("a", Some("s1"), "def f():\n    pass"))
            .await
            .unwrap();

        let prompt = build_context_prompt(
            &store,
            &AlwaysFailingProvider,
            &enabled_config(),
            "s1",
            "what is f?",
        )
        .await
        .unwrap();

        assert!(prompt.contains("# Project Context"));
        assert!(prompt.contains("## File Contents"));
        assert!(prompt.contains("## User Question\n\nwhat is f?"));
    }

    #[tokio::test]
    async fn test_disabled_embedding_skips_ranking() {
        let store = InMemoryFileStore::new();
        let mut file = make_file("a", Some("s1"), "def f():\n    pass");
        file.fragments[0].embedding = Some(vec![1.0, 0.0]);
        store.save_file(&file).await.unwrap();

        let context = build_context(
            &store,
            &ConstantProvider,
            &Config::default(),
            "s1",
            "query",
        )
        .await
        .unwrap();
        // Disabled config: no matches even though vectors exist.
        assert!(context.matches.is_empty());
        assert!(!context.previews.is_empty());
    }

    #[tokio::test]
    async fn test_matches_found_with_embedded_fragments() {
        let store = InMemoryFileStore::new();
        let mut file = make_file("a", Some("s1"), "def f():\n    pass");
        for fragment in &mut file.fragments {
            fragment.embedding = Some(vec![1.0, 0.0]);
        }
        store.save_file(&file).await.unwrap();

        let context = build_context(&store, &ConstantProvider, &enabled_config(), "s1", "query")
            .await
            .unwrap();
        assert_eq!(context.matches.len(), 1);
        assert!((context.matches[0].similarity - 1.0).abs() < 1e-6);
        assert!(context.previews.is_empty());
    }

    #[tokio::test]
    async fn test_similarity_rounded_to_two_decimals() {
        let store = InMemoryFileStore::new();
        let mut file = make_file("a", Some("s1"), "def f():\n    pass");
        // cos([1,0], [3,4]) = 0.6 exactly; use something irrational.
        file.fragments[0].embedding = Some(vec![1.0, 1.0]);
        store.save_file(&file).await.unwrap();

        let context = build_context(&store, &ConstantProvider, &enabled_config(), "s1", "q")
            .await
            .unwrap();
        // cos([1,0],[1,1]) = 0.7071... rounds to 0.71.
        assert!((context.matches[0].similarity - 0.71).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_claim_unassigned_disabled_by_default() {
        let store = InMemoryFileStore::new();
        store
            .save_file(&make_file("orphan", None, "def f():\n    pass"))
            .await
            .unwrap();

        let context = build_context(&store, &ConstantProvider, &enabled_config(), "s1", "q")
            .await
            .unwrap();
        assert_eq!(context.summary.file_count, 0);
        assert!(store
            .get_file("orphan")
            .await
            .unwrap()
            .unwrap()
            .session_id
            .is_none());
    }

    #[tokio::test]
    async fn test_claim_unassigned_when_enabled() {
        let store = InMemoryFileStore::new();
        store
            .save_file(&make_file("orphan", None, "def f():\n    pass"))
            .await
            .unwrap();

        let mut config = enabled_config();
        config.context.claim_unassigned_files = true;

        let context = build_context(&store, &ConstantProvider, &config, "s1", "q")
            .await
            .unwrap();
        assert_eq!(context.summary.file_count, 1);
        assert_eq!(
            store
                .get_file("orphan")
                .await
                .unwrap()
                .unwrap()
                .session_id
                .as_deref(),
            Some("s1")
        );
    }

    #[tokio::test]
    async fn test_claim_does_not_steal_from_other_sessions() {
        let store = InMemoryFileStore::new();
        store
            .save_file(&make_file("owned", Some("s2"), "def f():\n    pass"))
            .await
            .unwrap();

        let mut config = enabled_config();
        config.context.claim_unassigned_files = true;

        let context = build_context(&store, &ConstantProvider, &config, "s1", "q")
            .await
            .unwrap();
        assert_eq!(context.summary.file_count, 0);
    }

    #[tokio::test]
    async fn test_search_report_degrades_gracefully() {
        let store = InMemoryFileStore::new();
        store
            .save_file(&make_file("a", Some("s1"), "def f():\n    pass"))
            .await
            .unwrap();

        let report = search_fragments(
            &store,
            &AlwaysFailingProvider,
            &enabled_config(),
            "s1",
            "find f",
        )
        .await
        .unwrap();
        assert_eq!(report.query, "find f");
        assert!(report.matches.is_empty());
    }
}
