//! Wire types for the workflow backend's JSON resources, plus the tagged
//! tree types the expander produces.
//!
//! Only the subset of fields the resolution engine depends on is modeled;
//! everything else the backend returns is ignored on deserialization or
//! carried opaquely as `serde_json::Value`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Execution status shared by runs, tasks, and task attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Waiting,
    Running,
    Finished,
    Failed,
    Killed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Waiting => "waiting",
            Status::Running => "running",
            Status::Finished => "finished",
            Status::Failed => "failed",
            Status::Killed => "killed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Finished | Status::Failed | Status::Killed)
    }
}

/// A named input/output slot carrying a reference to a data node.
///
/// `data` is `None` when nothing is bound to the slot (valid, left alone),
/// a bare `{uuid}` stub before resolution, or the full payload after.
/// `fetch_error` is client-side only: set when resolving this channel's
/// reference failed, cleared on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub channel: String,
    #[serde(rename = "type", default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub data: Option<DataNode>,
    #[serde(skip)]
    pub fetch_error: Option<String>,
}

/// A value or tree of values passed through channels.
///
/// `contents` absent means the node is an unresolved reference that must be
/// fetched by uuid before its payload can be inspected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataNode {
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<DataContents>,
}

/// Payload of a resolved data node: either an ordered list of child nodes
/// (themselves possibly unresolved stubs) or a leaf JSON value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataContents {
    Branch(Vec<DataNode>),
    Leaf(Value),
}

impl DataNode {
    /// True once this node and every node below it carries a payload.
    pub fn is_resolved(&self) -> bool {
        match &self.contents {
            None => false,
            Some(DataContents::Leaf(_)) => true,
            Some(DataContents::Branch(children)) => children.iter().all(|c| c.is_resolved()),
        }
    }
}

/// A run as the backend returns it. Child entries under `steps` / `tasks`
/// in a fetched parent are partial records (uuid, name, status); the
/// expander refetches each by uuid before descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    pub status: Status,
    #[serde(default)]
    pub datetime_created: Option<String>,
    #[serde(default)]
    pub datetime_finished: Option<String>,
    #[serde(default)]
    pub is_leaf: bool,
    #[serde(default)]
    pub inputs: Vec<Channel>,
    #[serde(default)]
    pub outputs: Vec<Channel>,
    #[serde(default)]
    pub steps: Option<Vec<Run>>,
    #[serde(default)]
    pub tasks: Option<Vec<Task>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub uuid: String,
    pub status: Status,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub datetime_created: Option<String>,
    #[serde(default)]
    pub datetime_finished: Option<String>,
    #[serde(default)]
    pub inputs: Vec<Channel>,
    #[serde(default)]
    pub outputs: Vec<Channel>,
    #[serde(default)]
    pub all_task_attempts: Option<Vec<TaskAttempt>>,
}

/// One execution try of a task. Leaf of the hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAttempt {
    pub uuid: String,
    pub status: Status,
    #[serde(default)]
    pub datetime_created: Option<String>,
    #[serde(default)]
    pub datetime_finished: Option<String>,
    #[serde(default)]
    pub inputs: Vec<Channel>,
    #[serde(default)]
    pub outputs: Vec<Channel>,
    #[serde(default)]
    pub log_files: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fixed_inputs: Vec<Channel>,
}

/// A file or other stored value; `value` is passed through unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataObject {
    pub uuid: String,
    #[serde(rename = "type", default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub value: Value,
}

/// One page of a list endpoint: `{results: [...], count: N}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub count: u64,
}

// ---------------------------------------------------------------------------
// Expanded tree
// ---------------------------------------------------------------------------

/// What kind of node a tree/flat entry is. Steps are runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Run,
    Task,
    TaskAttempt,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Run => "run",
            NodeKind::Task => "task",
            NodeKind::TaskAttempt => "task-attempt",
        }
    }
}

/// Declared-order outcome of expanding one child: either the fully
/// expanded node or a record of why the fetch failed. Failed children are
/// kept in place so sibling order is a property of the data, not of
/// completion order.
#[derive(Debug, Clone)]
pub enum Slot<T> {
    Expanded(T),
    Failed(FailedChild),
}

impl<T> Slot<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, Slot::Failed(_))
    }
}

/// Placeholder left where a child could not be fetched.
#[derive(Debug, Clone)]
pub struct FailedChild {
    pub uuid: String,
    pub name: String,
    pub error: String,
}

/// A run's children, decided once at expansion time. The backend never
/// populates steps and tasks on the same run; the expander branches here
/// and the flattener dispatches on the same tag.
#[derive(Debug, Clone)]
pub enum RunChildren {
    Steps(Vec<Slot<RunNode>>),
    Tasks(Vec<Slot<TaskNode>>),
    None,
}

/// A fully expanded run. `run.steps` / `run.tasks` placeholders are taken
/// out of the record during expansion; `children` is the only
/// representation of the subtree.
#[derive(Debug, Clone)]
pub struct RunNode {
    pub run: Run,
    pub children: RunChildren,
}

#[derive(Debug, Clone)]
pub struct TaskNode {
    pub task: Task,
    pub attempts: Vec<Slot<TaskAttempt>>,
}

impl RunNode {
    /// Number of slots anywhere in this subtree that failed to expand.
    /// Nonzero means the view should surface a partial-expansion marker.
    pub fn failure_count(&self) -> usize {
        match &self.children {
            RunChildren::Steps(steps) => steps
                .iter()
                .map(|s| match s {
                    Slot::Expanded(node) => node.failure_count(),
                    Slot::Failed(_) => 1,
                })
                .sum(),
            RunChildren::Tasks(tasks) => tasks
                .iter()
                .map(|s| match s {
                    Slot::Expanded(node) => node.failure_count(),
                    Slot::Failed(_) => 1,
                })
                .sum(),
            RunChildren::None => 0,
        }
    }
}

impl TaskNode {
    pub fn failure_count(&self) -> usize {
        self.attempts.iter().filter(|s| s.is_failed()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn run_with_step_stubs_deserializes() {
        let raw = json!({
            "uuid": "r1",
            "name": "align",
            "status": "running",
            "inputs": [
                {"channel": "input_file", "type": "file", "data": {"uuid": "d1"}},
                {"channel": "threads", "type": "integer", "data": null}
            ],
            "outputs": [],
            "steps": [
                {"uuid": "s1", "name": "index", "status": "finished"},
                {"uuid": "s2", "name": "map", "status": "waiting"}
            ]
        });
        let run: Run = serde_json::from_value(raw).unwrap();
        assert_eq!(run.status, Status::Running);
        let steps = run.steps.as_ref().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].uuid, "s2");
        assert!(run.tasks.is_none());
        // bound reference is an unresolved stub
        let d = run.inputs[0].data.as_ref().unwrap();
        assert_eq!(d.uuid, "d1");
        assert!(!d.is_resolved());
        // null data means nothing bound, not an error
        assert!(run.inputs[1].data.is_none());
    }

    #[test]
    fn leaf_run_with_tasks_deserializes() {
        let raw = json!({
            "uuid": "r2",
            "status": "finished",
            "is_leaf": true,
            "tasks": [{"uuid": "t1", "status": "finished"}]
        });
        let run: Run = serde_json::from_value(raw).unwrap();
        assert!(run.is_leaf);
        assert_eq!(run.tasks.unwrap()[0].uuid, "t1");
        assert!(run.steps.is_none());
    }

    #[test]
    fn data_contents_branch_vs_leaf() {
        let branch: DataNode = serde_json::from_value(json!({
            "uuid": "d1",
            "contents": [{"uuid": "d2"}, {"uuid": "d3", "contents": 7}]
        }))
        .unwrap();
        match branch.contents.as_ref().unwrap() {
            DataContents::Branch(children) => {
                assert_eq!(children.len(), 2);
                assert!(!children[0].is_resolved());
                assert!(children[1].is_resolved());
            }
            DataContents::Leaf(_) => panic!("expected branch"),
        }
        assert!(!branch.is_resolved());

        let leaf: DataNode = serde_json::from_value(json!({
            "uuid": "d4",
            "contents": {"filename": "reads.fastq", "md5": "abc"}
        }))
        .unwrap();
        assert!(leaf.is_resolved());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let res: Result<Status, _> = serde_json::from_value(json!("paused"));
        assert!(res.is_err());
    }

    #[test]
    fn page_shape() {
        let page: Page<Run> = serde_json::from_value(json!({
            "count": 1,
            "results": [{"uuid": "r1", "status": "waiting"}]
        }))
        .unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].uuid, "r1");
    }
}
