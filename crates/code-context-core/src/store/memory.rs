//! In-memory [`FileStore`] implementation for tests and the CLI.
//!
//! Uses a `Vec` behind `std::sync::RwLock` for thread safety; listing
//! preserves insertion (upload) order, which keeps ranking tie-breaks
//! deterministic. Saving replaces the whole record, so writes to the
//! same file serialize on the lock.

use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::SourceFile;

use super::FileStore;

/// In-memory file store.
pub struct InMemoryFileStore {
    files: RwLock<Vec<SourceFile>>,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(Vec::new()),
        }
    }

    /// Total number of stored files (test helper).
    pub fn len(&self) -> usize {
        self.files.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryFileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn list_files_for_session(&self, session_id: &str) -> Result<Vec<SourceFile>> {
        let files = self.files.read().unwrap();
        Ok(files
            .iter()
            .filter(|f| f.session_id.as_deref() == Some(session_id))
            .cloned()
            .collect())
    }

    async fn list_files_without_session(&self) -> Result<Vec<SourceFile>> {
        let files = self.files.read().unwrap();
        Ok(files
            .iter()
            .filter(|f| f.session_id.is_none())
            .cloned()
            .collect())
    }

    async fn reassign_files_to_session(&self, file_ids: &[String], session_id: &str) -> Result<()> {
        let mut files = self.files.write().unwrap();
        for file in files.iter_mut() {
            if file_ids.contains(&file.id) {
                file.session_id = Some(session_id.to_string());
            }
        }
        Ok(())
    }

    async fn save_file(&self, file: &SourceFile) -> Result<()> {
        let mut files = self.files.write().unwrap();
        match files.iter_mut().find(|f| f.id == file.id) {
            Some(existing) => *existing = file.clone(),
            None => files.push(file.clone()),
        }
        Ok(())
    }

    async fn get_file(&self, id: &str) -> Result<Option<SourceFile>> {
        let files = self.files.read().unwrap();
        Ok(files.iter().find(|f| f.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_file(id: &str, session: Option<&str>) -> SourceFile {
        SourceFile {
            id: id.to_string(),
            session_id: session.map(|s| s.to_string()),
            name: format!("{}.ts", id),
            language: "typescript".to_string(),
            content: "content".to_string(),
            fragments: Vec::new(),
            uploaded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_and_list_by_session() {
        let store = InMemoryFileStore::new();
        store.save_file(&make_file("a", Some("s1"))).await.unwrap();
        store.save_file(&make_file("b", Some("s2"))).await.unwrap();
        store.save_file(&make_file("c", Some("s1"))).await.unwrap();

        let files = store.list_files_for_session("s1").await.unwrap();
        let ids: Vec<&str> = files.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_save_overwrites_whole_record() {
        let store = InMemoryFileStore::new();
        store.save_file(&make_file("a", Some("s1"))).await.unwrap();

        let mut updated = make_file("a", Some("s1"));
        updated.content = "new content".to_string();
        store.save_file(&updated).await.unwrap();

        assert_eq!(store.len(), 1);
        let fetched = store.get_file("a").await.unwrap().unwrap();
        assert_eq!(fetched.content, "new content");
    }

    #[tokio::test]
    async fn test_reassign_orphans() {
        let store = InMemoryFileStore::new();
        store.save_file(&make_file("a", None)).await.unwrap();
        store.save_file(&make_file("b", None)).await.unwrap();

        let orphans = store.list_files_without_session().await.unwrap();
        assert_eq!(orphans.len(), 2);

        let ids: Vec<String> = orphans.iter().map(|f| f.id.clone()).collect();
        store.reassign_files_to_session(&ids, "s1").await.unwrap();

        assert!(store.list_files_without_session().await.unwrap().is_empty());
        assert_eq!(store.list_files_for_session("s1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_missing_file() {
        let store = InMemoryFileStore::new();
        assert!(store.get_file("nope").await.unwrap().is_none());
    }
}
