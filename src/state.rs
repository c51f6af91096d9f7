//! Runtime configuration and the Active-Entity Cache.
//!
//! `ActiveData` is an explicit object owned by the caller, not ambient
//! global state. Each entity kind has one slot; setting a slot replaces it
//! wholesale. Commits are gated on a per-slot generation counter so a
//! response that arrives after a newer navigation is discarded instead of
//! clobbering the newer entity.

use std::sync::{Arc, Mutex};

use crate::api::{Backend, FetchResult};
use crate::expand::{expand_run, expand_task, expand_task_attempt};
use crate::model::{DataObject, RunNode, TaskAttempt, TaskNode, Template};
use crate::resolve::resolve_channels;

#[derive(Clone)]
pub struct Config {
    pub api_base: String,
    pub run_id: Option<String>,
    pub poll_secs: u64,
    pub page_limit: u32,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_base: std::env::var("API_BASE")
                .unwrap_or_else(|_| "http://127.0.0.1:8000/".to_string()),
            run_id: std::env::var("RUN_ID").ok(),
            poll_secs: std::env::var("POLL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            page_limit: std::env::var("PAGE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}

#[derive(Default)]
struct ActiveSlots {
    run: Option<Arc<RunNode>>,
    run_gen: u64,
    task: Option<Arc<TaskNode>>,
    task_gen: u64,
    task_attempt: Option<Arc<TaskAttempt>>,
    task_attempt_gen: u64,
    template: Option<Arc<Template>>,
    template_gen: u64,
    file: Option<Arc<DataObject>>,
    file_gen: u64,
}

/// Point-in-time view of all slots. Cheap to clone; entities are shared
/// behind `Arc`.
#[derive(Clone, Default)]
pub struct ActiveSnapshot {
    pub run: Option<Arc<RunNode>>,
    pub task: Option<Arc<TaskNode>>,
    pub task_attempt: Option<Arc<TaskAttempt>>,
    pub template: Option<Arc<Template>>,
    pub file: Option<Arc<DataObject>>,
}

/// Per-kind "currently viewed" holder. Setting one kind's slot leaves the
/// others alone, so breadcrumb context spanning kinds survives navigation.
pub struct ActiveData {
    inner: Mutex<ActiveSlots>,
}

impl Default for ActiveData {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveData {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ActiveSlots::default()),
        }
    }

    pub fn snapshot(&self) -> ActiveSnapshot {
        let slots = self.inner.lock().expect("active data lock");
        ActiveSnapshot {
            run: slots.run.clone(),
            task: slots.task.clone(),
            task_attempt: slots.task_attempt.clone(),
            template: slots.template.clone(),
            file: slots.file.clone(),
        }
    }

    /// Expand `id` and make it the active run. The slot is cleared up
    /// front (we navigated away from the old run) and the result commits
    /// only if no newer `set_active_run` started in the meantime.
    pub async fn set_active_run(&self, backend: &dyn Backend, id: &str) -> FetchResult<()> {
        let gen = {
            let mut slots = self.inner.lock().expect("active data lock");
            slots.run = None;
            slots.run_gen += 1;
            slots.run_gen
        };
        let node = expand_run(backend, id).await?;
        let mut slots = self.inner.lock().expect("active data lock");
        if slots.run_gen == gen {
            slots.run = Some(Arc::new(node));
        }
        Ok(())
    }

    pub async fn set_active_task(&self, backend: &dyn Backend, id: &str) -> FetchResult<()> {
        let gen = {
            let mut slots = self.inner.lock().expect("active data lock");
            slots.task = None;
            slots.task_gen += 1;
            slots.task_gen
        };
        let node = expand_task(backend, id).await?;
        let mut slots = self.inner.lock().expect("active data lock");
        if slots.task_gen == gen {
            slots.task = Some(Arc::new(node));
        }
        Ok(())
    }

    pub async fn set_active_task_attempt(
        &self,
        backend: &dyn Backend,
        id: &str,
    ) -> FetchResult<()> {
        let gen = {
            let mut slots = self.inner.lock().expect("active data lock");
            slots.task_attempt = None;
            slots.task_attempt_gen += 1;
            slots.task_attempt_gen
        };
        let attempt = expand_task_attempt(backend, id).await?;
        let mut slots = self.inner.lock().expect("active data lock");
        if slots.task_attempt_gen == gen {
            slots.task_attempt = Some(Arc::new(attempt));
        }
        Ok(())
    }

    /// Templates carry fixed-input channels analogous to a run's inputs;
    /// they are resolved before the slot commits.
    pub async fn set_active_template(&self, backend: &dyn Backend, id: &str) -> FetchResult<()> {
        let gen = {
            let mut slots = self.inner.lock().expect("active data lock");
            slots.template = None;
            slots.template_gen += 1;
            slots.template_gen
        };
        let mut template = backend.fetch_template(id).await?;
        resolve_channels(backend, &mut template.fixed_inputs).await;
        let mut slots = self.inner.lock().expect("active data lock");
        if slots.template_gen == gen {
            slots.template = Some(Arc::new(template));
        }
        Ok(())
    }

    pub async fn set_active_file(&self, backend: &dyn Backend, id: &str) -> FetchResult<()> {
        let gen = {
            let mut slots = self.inner.lock().expect("active data lock");
            slots.file = None;
            slots.file_gen += 1;
            slots.file_gen
        };
        let file = backend.fetch_data_object(id).await?;
        let mut slots = self.inner.lock().expect("active data lock");
        if slots.file_gen == gen {
            slots.file = Some(Arc::new(file));
        }
        Ok(())
    }
}
