//! Tree Expander: turn a partially-populated root record into a fully
//! expanded tree by refetching each child placeholder and resolving
//! channels along the way.
//!
//! Only the root fetch is fatal. Every descendant fetch lands in a
//! declared-order [`Slot`]: expanded on success, a [`FailedChild`] marker
//! on failure, so a dead branch never takes the rest of the tree with it.
//! Independent children expand concurrently; the joined results are placed
//! back in declared order regardless of completion order.

use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt;

use crate::api::{Backend, FetchResult};
use crate::model::{FailedChild, Run, RunChildren, RunNode, Slot, Task, TaskAttempt, TaskNode};
use crate::resolve::resolve_channels;

/// Expand a run and everything below it. An error here means the root
/// itself could not be fetched; partial failures below the root are
/// recorded in the returned tree instead.
pub async fn expand_run(backend: &dyn Backend, id: &str) -> FetchResult<RunNode> {
    let run = backend.fetch_run(id).await?;
    Ok(expand_run_record(backend, run).await)
}

/// Expand a task and its attempts.
pub async fn expand_task(backend: &dyn Backend, id: &str) -> FetchResult<TaskNode> {
    let task = backend.fetch_task(id).await?;
    Ok(expand_task_record(backend, task).await)
}

/// Fetch a single attempt and resolve its channels. Attempts are leaves,
/// so there is nothing further to expand.
pub async fn expand_task_attempt(backend: &dyn Backend, id: &str) -> FetchResult<TaskAttempt> {
    let mut attempt = backend.fetch_task_attempt(id).await?;
    resolve_channels(backend, &mut attempt.inputs).await;
    resolve_channels(backend, &mut attempt.outputs).await;
    Ok(attempt)
}

fn expand_run_record<'a>(backend: &'a dyn Backend, mut run: Run) -> BoxFuture<'a, RunNode> {
    async move {
        resolve_channels(backend, &mut run.inputs).await;
        resolve_channels(backend, &mut run.outputs).await;

        // A run nests steps or tasks, never both. Decide which once, here;
        // the flattener dispatches on the resulting tag.
        let steps = run.steps.take().filter(|s| !s.is_empty());
        let tasks = run.tasks.take().filter(|t| !t.is_empty());
        let children = if let Some(steps) = steps {
            let slots = join_all(steps.into_iter().map(|stub| expand_step(backend, stub))).await;
            RunChildren::Steps(slots)
        } else if let Some(tasks) = tasks {
            let slots = join_all(tasks.into_iter().map(|stub| expand_task_stub(backend, stub))).await;
            RunChildren::Tasks(slots)
        } else {
            RunChildren::None
        };

        RunNode { run, children }
    }
    .boxed()
}

async fn expand_step(backend: &dyn Backend, stub: Run) -> Slot<RunNode> {
    match backend.fetch_run(&stub.uuid).await {
        Ok(full) => Slot::Expanded(expand_run_record(backend, full).await),
        Err(e) => Slot::Failed(FailedChild {
            uuid: stub.uuid,
            name: stub.name,
            error: e.to_string(),
        }),
    }
}

async fn expand_task_stub(backend: &dyn Backend, stub: Task) -> Slot<TaskNode> {
    match backend.fetch_task(&stub.uuid).await {
        Ok(full) => Slot::Expanded(expand_task_record(backend, full).await),
        Err(e) => Slot::Failed(FailedChild {
            uuid: stub.uuid,
            name: String::new(),
            error: e.to_string(),
        }),
    }
}

async fn expand_task_record(backend: &dyn Backend, mut task: Task) -> TaskNode {
    resolve_channels(backend, &mut task.inputs).await;
    resolve_channels(backend, &mut task.outputs).await;

    let stubs = task.all_task_attempts.take().unwrap_or_default();
    let attempts = join_all(
        stubs
            .into_iter()
            .map(|stub| expand_attempt_stub(backend, stub)),
    )
    .await;

    TaskNode { task, attempts }
}

async fn expand_attempt_stub(backend: &dyn Backend, stub: TaskAttempt) -> Slot<TaskAttempt> {
    match backend.fetch_task_attempt(&stub.uuid).await {
        Ok(mut full) => {
            resolve_channels(backend, &mut full.inputs).await;
            resolve_channels(backend, &mut full.outputs).await;
            Slot::Expanded(full)
        }
        Err(e) => Slot::Failed(FailedChild {
            uuid: stub.uuid,
            name: String::new(),
            error: e.to_string(),
        }),
    }
}
