//! Production [`DataFrameProvider`] backed by a background worker

use super::worker::{BackgroundWorker, WorkerRequest, WorkerResult};
use super::{DataFrameProvider, ExecEvent, ExecSnapshot, ExecStatus, reduce_exec};
use crate::data::{ActionsState, DfHandle};
use crate::store::{Store, SubscriptionId};

/// Owns the pipeline description and runs it on a [`BackgroundWorker`]
///
/// Every run gets a generation number. Results from older generations are
/// dropped in [`poll`](DataFrameProvider::poll), so loading a new pipeline
/// supersedes whatever was still in flight.
pub struct ActionsStore {
    state: ActionsState,
    exec: Store<ExecSnapshot, ExecEvent>,
    worker: BackgroundWorker,
    generation: u64,
}

impl ActionsStore {
    pub fn new() -> Self {
        Self::with_worker(BackgroundWorker::spawn())
    }

    pub fn with_worker(worker: BackgroundWorker) -> Self {
        Self {
            state: ActionsState::default(),
            exec: Store::new(ExecSnapshot::default(), reduce_exec),
            worker,
            generation: 0,
        }
    }

    /// Replace the pipeline but keep showing the current frame until the
    /// new run finishes
    pub fn update_actions(&mut self, state: ActionsState) {
        self.state = state;
        self.execute();
    }

    /// Run the current pipeline again
    pub fn execute(&mut self) {
        if self.state.source.is_none() {
            tracing::debug!("no data source, skipping execution");
            return;
        }
        self.generation += 1;
        tracing::info!(generation = self.generation, "starting pipeline");
        self.apply(ExecEvent::Started);
        let sent = self.worker.request(WorkerRequest::Execute {
            generation: self.generation,
            state: self.state.clone(),
        });
        if let Err(e) = sent {
            tracing::error!(error = %e, "could not start pipeline");
            self.apply(ExecEvent::Failed(e.user_message()));
        }
    }

    fn apply(&mut self, event: ExecEvent) {
        if let Err(e) = self.exec.dispatch(event) {
            tracing::error!(error = %e, "execution state update failed");
        }
    }
}

impl Default for ActionsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataFrameProvider for ActionsStore {
    fn actions(&self) -> &ActionsState {
        &self.state
    }

    fn load_actions(&mut self, state: ActionsState) {
        // Invalidate anything still in flight before clearing
        self.generation += 1;
        self.apply(ExecEvent::Cleared);
        self.update_actions(state);
    }

    fn dataframe(&self) -> Option<DfHandle> {
        self.exec.state().df.clone()
    }

    fn status(&self) -> ExecStatus {
        self.exec.state().status.clone()
    }

    fn subscribe(&mut self, on_change: Box<dyn FnMut(&ExecSnapshot)>) -> SubscriptionId {
        self.exec.subscribe(on_change)
    }

    fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            let result = match self.worker.poll() {
                Ok(Some(result)) => result,
                Ok(None) => break,
                Err(e) => {
                    // Nothing will ever answer the run in flight
                    if self.status().is_running() {
                        tracing::error!(error = %e, "pipeline worker stopped");
                        self.apply(ExecEvent::Failed(e.user_message()));
                        changed = true;
                    }
                    break;
                }
            };
            if result.generation() != self.generation {
                tracing::debug!(
                    stale = result.generation(),
                    current = self.generation,
                    "dropping stale pipeline result"
                );
                continue;
            }
            match result {
                WorkerResult::Executed { df, .. } => {
                    tracing::info!(rows = df.height(), cols = df.width(), "pipeline finished");
                    self.apply(ExecEvent::Finished(DfHandle::new(df)));
                }
                WorkerResult::Error { msg, .. } => {
                    tracing::warn!(error = %msg, "pipeline failed");
                    self.apply(ExecEvent::Failed(msg));
                }
            }
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;
    use std::time::{Duration, Instant};
    use tempfile::{Builder, NamedTempFile};

    fn csv(rows: &[(&str, f64)]) -> NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "region,amount").unwrap();
        for (region, amount) in rows {
            writeln!(file, "{},{}", region, amount).unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn settle(store: &mut ActionsStore) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while store.status().is_running() {
            store.poll();
            assert!(Instant::now() < deadline, "pipeline did not settle");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_load_runs_pipeline() {
        let file = csv(&[("north", 1.0), ("south", 2.0)]);
        let mut store = ActionsStore::new();
        let statuses = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&statuses);
        store.subscribe(Box::new(move |s: &ExecSnapshot| sink.borrow_mut().push(s.status.clone())));

        store.load_actions(ActionsState::from_source(file.path()));
        assert!(store.status().is_running());
        settle(&mut store);

        assert_eq!(store.status(), ExecStatus::Done);
        assert_eq!(store.dataframe().unwrap().height(), 2);
        assert_eq!(
            *statuses.borrow(),
            vec![ExecStatus::Idle, ExecStatus::Running, ExecStatus::Done]
        );
    }

    #[test]
    fn test_newer_load_supersedes() {
        let first = csv(&[("a", 1.0)]);
        let second = csv(&[("b", 1.0), ("c", 2.0), ("d", 3.0)]);
        let mut store = ActionsStore::new();

        store.load_actions(ActionsState::from_source(first.path()));
        store.load_actions(ActionsState::from_source(second.path()));
        settle(&mut store);

        // Give the first (stale) result time to arrive, then make sure it is ignored
        std::thread::sleep(Duration::from_millis(50));
        store.poll();
        assert_eq!(store.dataframe().unwrap().height(), 3);
    }

    #[test]
    fn test_failure_status() {
        let mut store = ActionsStore::new();
        store.load_actions(ActionsState::from_source("/definitely/missing.csv"));
        settle(&mut store);

        assert!(matches!(store.status(), ExecStatus::Failed(_)));
        assert!(store.dataframe().is_none());
    }

    #[test]
    fn test_pipeline_panic_is_a_failure() {
        fn exploding(_: &ActionsState) -> crate::error::Result<polars::prelude::DataFrame> {
            panic!("corrupt input")
        }

        let mut store = ActionsStore::with_worker(BackgroundWorker::spawn_with(exploding));
        store.load_actions(ActionsState::from_source("data.csv"));
        settle(&mut store);

        assert_eq!(
            store.status(),
            ExecStatus::Failed("Pipeline panicked: corrupt input".to_string())
        );
    }

    #[test]
    fn test_stopped_worker_does_not_hang() {
        let worker = BackgroundWorker::spawn();
        worker.request(WorkerRequest::Shutdown).unwrap();

        // Whether the request is refused or never answered, the run ends
        let mut store = ActionsStore::with_worker(worker);
        store.load_actions(ActionsState::from_source("data.csv"));
        settle(&mut store);

        assert!(matches!(store.status(), ExecStatus::Failed(_)));
        assert!(store.dataframe().is_none());
    }

    #[test]
    fn test_no_source_stays_idle() {
        let mut store = ActionsStore::new();
        store.load_actions(ActionsState::default());
        assert_eq!(store.status(), ExecStatus::Idle);
        assert!(!store.poll());
    }
}
