use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::{Backend, FetchError, FetchResult, FileSource};
use crate::model::{DataNode, DataObject, Page, Run, Task, TaskAttempt, Template};
use crate::state::Config;

/// reqwest-backed implementation of [`Backend`] against the workflow
/// server's REST API. Filters and pagination parameters are passed through
/// verbatim; this layer interprets nothing but the status code.
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let base = Url::parse(&cfg.api_base)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;
        Ok(Self { client, base })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        kind: &'static str,
        id: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> FetchResult<T> {
        let url = self
            .base
            .join(path)
            .map_err(|e| FetchError::Transport(format!("bad url {}: {}", path, e)))?;
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        match resp.status() {
            StatusCode::NOT_FOUND => Err(FetchError::not_found(kind, id)),
            status if !status.is_success() => Err(FetchError::Transport(format!(
                "{} {}: server returned {}",
                kind, id, status
            ))),
            _ => resp
                .json::<T>()
                .await
                .map_err(|e| FetchError::Transport(format!("{} {}: {}", kind, id, e))),
        }
    }

    async fn get_entity<T: DeserializeOwned>(
        &self,
        kind: &'static str,
        collection: &str,
        id: &str,
    ) -> FetchResult<T> {
        self.get_json(kind, id, &format!("api/{}/{}/", collection, id), &[])
            .await
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_run(&self, id: &str) -> FetchResult<Run> {
        self.get_entity("run", "runs", id).await
    }

    async fn fetch_task(&self, id: &str) -> FetchResult<Task> {
        self.get_entity("task", "tasks", id).await
    }

    async fn fetch_task_attempt(&self, id: &str) -> FetchResult<TaskAttempt> {
        self.get_entity("task-attempt", "task-attempts", id).await
    }

    async fn fetch_template(&self, id: &str) -> FetchResult<Template> {
        self.get_entity("template", "templates", id).await
    }

    async fn fetch_data_node(&self, uuid: &str) -> FetchResult<DataNode> {
        self.get_entity("data-node", "data-nodes", uuid).await
    }

    async fn fetch_data_object(&self, uuid: &str) -> FetchResult<DataObject> {
        self.get_entity("file", "data-objects", uuid).await
    }

    async fn list_runs(&self, limit: u32, offset: u32) -> FetchResult<Page<Run>> {
        self.get_json(
            "run list",
            "",
            "api/runs/",
            &[
                ("parent_only", String::new()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ],
        )
        .await
    }

    async fn list_templates(&self, limit: u32, offset: u32) -> FetchResult<Page<Template>> {
        self.get_json(
            "template list",
            "",
            "api/templates/",
            &[
                ("imported", String::new()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ],
        )
        .await
    }

    async fn list_files(
        &self,
        source: FileSource,
        limit: u32,
        offset: u32,
    ) -> FetchResult<Page<DataObject>> {
        self.get_json(
            "file list",
            "",
            "api/data-objects/",
            &[
                ("source_type", source.query_value().to_string()),
                ("type", "file".to_string()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ],
        )
        .await
    }
}
