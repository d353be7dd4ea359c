//! Storage abstraction for uploaded source files.
//!
//! The [`FileStore`] trait defines the storage operations the
//! embedding pipeline and context builder need, enabling pluggable
//! backends. The core never touches raw file bytes or a database
//! directly; it reads [`SourceFile`] records and writes them back
//! with fragment vectors attached.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.
//! Writes to the same file record must be serialized by the backend;
//! writes to different files may proceed concurrently.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::SourceFile;

/// Abstract storage backend for session files.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`list_files_for_session`](FileStore::list_files_for_session) | All files owned by a session |
/// | [`list_files_without_session`](FileStore::list_files_without_session) | Orphan files with no session |
/// | [`reassign_files_to_session`](FileStore::reassign_files_to_session) | Claim files into a session |
/// | [`save_file`](FileStore::save_file) | Overwrite a whole file record |
/// | [`get_file`](FileStore::get_file) | Fetch one file by id |
#[async_trait]
pub trait FileStore: Send + Sync {
    /// List every file belonging to a session, in upload order.
    async fn list_files_for_session(&self, session_id: &str) -> Result<Vec<SourceFile>>;

    /// List files that have no session association.
    async fn list_files_without_session(&self) -> Result<Vec<SourceFile>>;

    /// Assign the given files to a session. Unknown ids are ignored.
    async fn reassign_files_to_session(&self, file_ids: &[String], session_id: &str) -> Result<()>;

    /// Persist a file, overwriting the whole record including its
    /// fragment list (and any vectors the fragments carry).
    async fn save_file(&self, file: &SourceFile) -> Result<()>;

    /// Fetch a single file by id.
    async fn get_file(&self, id: &str) -> Result<Option<SourceFile>>;
}
