//! Client engine for a workflow-execution REST backend.
//!
//! Fetches runs, tasks, task attempts, templates, and data objects;
//! recursively resolves channel references and child placeholders into
//! fully populated trees; and flattens those trees into the ordered,
//! depth-annotated rows a collapsible list view renders.

pub mod api;
pub mod expand;
pub mod flatten;
pub mod logging;
pub mod model;
pub mod resolve;
pub mod state;
