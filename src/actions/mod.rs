//! Data pipeline execution
//!
//! The viewer only sees the [`DataFrameProvider`] trait: the current frame
//! handle, an execution status and change notifications. [`ActionsStore`]
//! is the production implementation backed by a worker thread.

mod store;
mod worker;

pub use store::ActionsStore;

use crate::data::{ActionsState, DfHandle};
use crate::error::Result;
use crate::store::SubscriptionId;

/// Execution status of the data pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExecStatus {
    /// Nothing has been run (or there is no source)
    #[default]
    Idle,
    Running,
    Done,
    Failed(String),
}

impl ExecStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, ExecStatus::Running)
    }
}

/// What subscribers observe after every execution change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecSnapshot {
    pub df: Option<DfHandle>,
    pub status: ExecStatus,
}

/// Execution lifecycle events
#[derive(Debug, Clone)]
pub enum ExecEvent {
    Started,
    Finished(DfHandle),
    Failed(String),
    /// Forget the current frame (a new state file was loaded)
    Cleared,
}

/// Reducer for [`ExecSnapshot`]. A running or failed pipeline keeps showing
/// the last frame it produced.
pub fn reduce_exec(snapshot: &ExecSnapshot, event: ExecEvent) -> Result<ExecSnapshot> {
    Ok(match event {
        ExecEvent::Started => ExecSnapshot {
            df: snapshot.df.clone(),
            status: ExecStatus::Running,
        },
        ExecEvent::Finished(df) => ExecSnapshot {
            df: Some(df),
            status: ExecStatus::Done,
        },
        ExecEvent::Failed(msg) => ExecSnapshot {
            df: snapshot.df.clone(),
            status: ExecStatus::Failed(msg),
        },
        ExecEvent::Cleared => ExecSnapshot::default(),
    })
}

/// Source of the frame the viewer renders against
pub trait DataFrameProvider {
    /// Pipeline description currently loaded
    fn actions(&self) -> &ActionsState;

    /// Replace the pipeline (dropping the current frame) and start running it
    fn load_actions(&mut self, state: ActionsState);

    fn dataframe(&self) -> Option<DfHandle>;

    fn status(&self) -> ExecStatus;

    fn subscribe(&mut self, on_change: Box<dyn FnMut(&ExecSnapshot)>) -> SubscriptionId;

    /// Pick up finished work. Returns true if the snapshot changed.
    fn poll(&mut self) -> bool;
}
