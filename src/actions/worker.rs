//! Background worker that runs data pipelines off the UI thread

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};

use polars::prelude::DataFrame;

use crate::data::ActionsState;
use crate::data::pipeline;
use crate::error::{PlotError, Result, panic_message};

/// Function the worker runs for every `Execute` request
pub type Executor = fn(&ActionsState) -> Result<DataFrame>;

/// Requests that can be sent to the background worker
pub enum WorkerRequest {
    /// Run the pipeline described by `state`
    Execute { generation: u64, state: ActionsState },
    /// Shutdown the worker
    Shutdown,
}

/// Results returned from the background worker
pub enum WorkerResult {
    /// Pipeline finished
    Executed { generation: u64, df: DataFrame },
    /// Pipeline failed or panicked
    Error { generation: u64, msg: String },
}

impl WorkerResult {
    pub fn generation(&self) -> u64 {
        match self {
            WorkerResult::Executed { generation, .. } | WorkerResult::Error { generation, .. } => {
                *generation
            }
        }
    }
}

/// Background worker that processes requests off the main thread
pub struct BackgroundWorker {
    tx: Sender<WorkerRequest>,
    rx: Receiver<WorkerResult>,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundWorker {
    /// Spawn a worker running the polars pipeline
    pub fn spawn() -> Self {
        Self::spawn_with(pipeline::execute)
    }

    /// Spawn a worker thread that answers `Execute` requests with `execute`
    pub fn spawn_with(execute: Executor) -> Self {
        let (req_tx, req_rx) = channel::<WorkerRequest>();
        let (res_tx, res_rx) = channel::<WorkerResult>();

        let handle = thread::spawn(move || {
            Self::worker_loop(req_rx, res_tx, execute);
        });

        Self {
            tx: req_tx,
            rx: res_rx,
            handle: Some(handle),
        }
    }

    fn worker_loop(rx: Receiver<WorkerRequest>, tx: Sender<WorkerResult>, execute: Executor) {
        while let Ok(request) = rx.recv() {
            let result = match request {
                WorkerRequest::Execute { generation, state } => {
                    match panic::catch_unwind(AssertUnwindSafe(|| execute(&state))) {
                        Ok(Ok(df)) => WorkerResult::Executed { generation, df },
                        Ok(Err(e)) => WorkerResult::Error {
                            generation,
                            msg: e.user_message(),
                        },
                        Err(payload) => {
                            let msg = panic_message(payload.as_ref());
                            tracing::error!(generation, error = %msg, "pipeline panicked");
                            WorkerResult::Error {
                                generation,
                                msg: format!("Pipeline panicked: {}", msg),
                            }
                        }
                    }
                }
                WorkerRequest::Shutdown => break,
            };

            if tx.send(result).is_err() {
                break;
            }
        }
    }

    /// Send a request to the worker (non-blocking)
    pub fn request(&self, req: WorkerRequest) -> Result<()> {
        self.tx.send(req).map_err(|_| PlotError::WorkerStopped)
    }

    /// Poll for completed work (non-blocking). A worker thread that has
    /// exited is an error, not an empty queue.
    pub fn poll(&self) -> Result<Option<WorkerResult>> {
        match self.rx.try_recv() {
            Ok(result) => Ok(Some(result)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(PlotError::WorkerStopped),
        }
    }
}

impl Drop for BackgroundWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(WorkerRequest::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use std::io::Write;
    use std::time::{Duration, Instant};
    use tempfile::Builder;

    fn wait_for(worker: &BackgroundWorker) -> WorkerResult {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = worker.poll().unwrap() {
                return result;
            }
            assert!(Instant::now() < deadline, "worker did not answer");
            thread::sleep(Duration::from_millis(10));
        }
    }

    fn execute(worker: &BackgroundWorker, generation: u64, source: &str) {
        worker
            .request(WorkerRequest::Execute {
                generation,
                state: ActionsState::from_source(source),
            })
            .unwrap();
    }

    #[test]
    fn test_worker_executes_pipeline() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "x,y").unwrap();
        writeln!(file, "1,2").unwrap();
        writeln!(file, "3,4").unwrap();
        file.flush().unwrap();

        let worker = BackgroundWorker::spawn();
        worker
            .request(WorkerRequest::Execute {
                generation: 7,
                state: ActionsState::from_source(file.path()),
            })
            .unwrap();

        match wait_for(&worker) {
            WorkerResult::Executed { generation, df } => {
                assert_eq!(generation, 7);
                assert_eq!(df.height(), 2);
            }
            WorkerResult::Error { msg, .. } => panic!("Expected Executed result, got {msg}"),
        }
    }

    #[test]
    fn test_worker_reports_errors() {
        let worker = BackgroundWorker::spawn();
        execute(&worker, 1, "/definitely/missing.csv");

        let result = wait_for(&worker);
        assert_eq!(result.generation(), 1);
        assert!(matches!(result, WorkerResult::Error { .. }));
    }

    #[test]
    fn test_panicking_pipeline_keeps_worker_alive() {
        fn flaky(state: &ActionsState) -> Result<DataFrame> {
            match state.source.as_deref().and_then(|p| p.to_str()) {
                Some("explode.csv") => panic!("reader blew up"),
                _ => Ok(df!("a" => [1, 2, 3])?),
            }
        }

        let worker = BackgroundWorker::spawn_with(flaky);
        execute(&worker, 1, "explode.csv");
        match wait_for(&worker) {
            WorkerResult::Error { generation, msg } => {
                assert_eq!(generation, 1);
                assert_eq!(msg, "Pipeline panicked: reader blew up");
            }
            WorkerResult::Executed { .. } => panic!("Expected the panic to be reported"),
        }

        execute(&worker, 2, "fine.csv");
        match wait_for(&worker) {
            WorkerResult::Executed { generation, df } => {
                assert_eq!(generation, 2);
                assert_eq!(df.height(), 3);
            }
            WorkerResult::Error { msg, .. } => panic!("Expected Executed result, got {msg}"),
        }
    }

    #[test]
    fn test_stopped_worker_is_an_error() {
        let worker = BackgroundWorker::spawn();
        worker.request(WorkerRequest::Shutdown).unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        while !matches!(worker.poll(), Err(PlotError::WorkerStopped)) {
            assert!(Instant::now() < deadline, "worker did not stop");
            thread::sleep(Duration::from_millis(10));
        }

        let sent = worker.request(WorkerRequest::Execute {
            generation: 1,
            state: ActionsState::default(),
        });
        assert!(matches!(sent, Err(PlotError::WorkerStopped)));
    }
}
