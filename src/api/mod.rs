use async_trait::async_trait;
use thiserror::Error;

use crate::model::{DataNode, DataObject, Page, Run, Task, TaskAttempt, Template};

pub mod http;
pub mod retry;

/// Fetch failure taxonomy. `NotFound` means the id has no entity behind it
/// (render an empty/removed state); `Transport` covers network and server
/// failures (render a retryable error state).
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("transport error: {0}")]
    Transport(String),
}

impl FetchError {
    pub fn not_found(kind: &'static str, id: &str) -> Self {
        FetchError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Only transport failures are worth retrying; a missing entity stays
    /// missing no matter how often we ask.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Which file listing to request. The backend distinguishes files by how
/// they entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSource {
    Imported,
    Result,
    Log,
}

impl FileSource {
    pub fn query_value(&self) -> &'static str {
        match self {
            FileSource::Imported => "imported",
            FileSource::Result => "result",
            FileSource::Log => "log",
        }
    }
}

/// One read per entity kind, by id. Implementations perform no retries and
/// no caching; they return the backend's record as-is or a `FetchError`.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn fetch_run(&self, id: &str) -> FetchResult<Run>;
    async fn fetch_task(&self, id: &str) -> FetchResult<Task>;
    async fn fetch_task_attempt(&self, id: &str) -> FetchResult<TaskAttempt>;
    async fn fetch_template(&self, id: &str) -> FetchResult<Template>;
    async fn fetch_data_node(&self, uuid: &str) -> FetchResult<DataNode>;
    async fn fetch_data_object(&self, uuid: &str) -> FetchResult<DataObject>;

    /// Top-level runs only (`?parent_only`), paginated.
    async fn list_runs(&self, limit: u32, offset: u32) -> FetchResult<Page<Run>>;
    /// Imported templates (`?imported`), paginated.
    async fn list_templates(&self, limit: u32, offset: u32) -> FetchResult<Page<Template>>;
    async fn list_files(
        &self,
        source: FileSource,
        limit: u32,
        offset: u32,
    ) -> FetchResult<Page<DataObject>>;
}
