//! Flattener: turn an expanded tree into the ordered, depth-annotated row
//! sequence a collapsible list view renders.
//!
//! Pure and total: no I/O, no side effects, an empty tree yields an empty
//! vec, and repeated calls yield identical output. The root itself is
//! excluded; direct children sit at level 1. Failed slots become rows with
//! the error attached rather than being dropped, so the view can mark dead
//! branches inline.

use crate::model::{FailedChild, NodeKind, RunChildren, RunNode, Slot, TaskAttempt, TaskNode};

/// One row of the flat view.
#[derive(Debug, Clone)]
pub struct FlatRow<'a> {
    pub kind: NodeKind,
    pub level: usize,
    pub entry: FlatEntry<'a>,
}

#[derive(Debug, Clone)]
pub enum FlatEntry<'a> {
    Run(&'a RunNode),
    Task(&'a TaskNode),
    Attempt(&'a TaskAttempt),
    Failed(&'a FailedChild),
}

impl<'a> FlatRow<'a> {
    pub fn uuid(&self) -> &str {
        match &self.entry {
            FlatEntry::Run(node) => &node.run.uuid,
            FlatEntry::Task(node) => &node.task.uuid,
            FlatEntry::Attempt(attempt) => &attempt.uuid,
            FlatEntry::Failed(failed) => &failed.uuid,
        }
    }

    /// Display label: name where the backend provides one, uuid otherwise.
    pub fn label(&self) -> &str {
        let name = match &self.entry {
            FlatEntry::Run(node) => node.run.name.as_str(),
            FlatEntry::Failed(failed) => failed.name.as_str(),
            _ => "",
        };
        if name.is_empty() {
            self.uuid()
        } else {
            name
        }
    }

    pub fn status_str(&self) -> &'static str {
        match &self.entry {
            FlatEntry::Run(node) => node.run.status.as_str(),
            FlatEntry::Task(node) => node.task.status.as_str(),
            FlatEntry::Attempt(attempt) => attempt.status.as_str(),
            FlatEntry::Failed(_) => "unavailable",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.entry {
            FlatEntry::Failed(failed) => Some(failed.error.as_str()),
            _ => None,
        }
    }
}

/// Depth-first flattening of the tree below `root`, preserving each
/// level's declared child order.
pub fn flatten(root: &RunNode) -> Vec<FlatRow<'_>> {
    let mut rows = Vec::new();
    push_children(root, 1, &mut rows);
    rows
}

fn push_children<'a>(node: &'a RunNode, level: usize, rows: &mut Vec<FlatRow<'a>>) {
    match &node.children {
        RunChildren::Steps(steps) => {
            for slot in steps {
                match slot {
                    Slot::Expanded(step) => {
                        rows.push(FlatRow {
                            kind: NodeKind::Run,
                            level,
                            entry: FlatEntry::Run(step),
                        });
                        push_children(step, level + 1, rows);
                    }
                    Slot::Failed(failed) => rows.push(FlatRow {
                        kind: NodeKind::Run,
                        level,
                        entry: FlatEntry::Failed(failed),
                    }),
                }
            }
        }
        RunChildren::Tasks(tasks) => {
            for slot in tasks {
                match slot {
                    Slot::Expanded(task) => {
                        rows.push(FlatRow {
                            kind: NodeKind::Task,
                            level,
                            entry: FlatEntry::Task(task),
                        });
                        push_attempts(task, level + 1, rows);
                    }
                    Slot::Failed(failed) => rows.push(FlatRow {
                        kind: NodeKind::Task,
                        level,
                        entry: FlatEntry::Failed(failed),
                    }),
                }
            }
        }
        RunChildren::None => {}
    }
}

fn push_attempts<'a>(task: &'a TaskNode, level: usize, rows: &mut Vec<FlatRow<'a>>) {
    for slot in &task.attempts {
        match slot {
            Slot::Expanded(attempt) => rows.push(FlatRow {
                kind: NodeKind::TaskAttempt,
                level,
                entry: FlatEntry::Attempt(attempt),
            }),
            Slot::Failed(failed) => rows.push(FlatRow {
                kind: NodeKind::TaskAttempt,
                level,
                entry: FlatEntry::Failed(failed),
            }),
        }
    }
}
