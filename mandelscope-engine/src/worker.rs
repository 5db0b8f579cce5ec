//! Background recomputation with stale-result suppression.
//!
//! Each request gets a sequence number and bumps the shared
//! [`ComputeCancel`] generation, so an older computation still running
//! stops at its next row. Results are tagged with their sequence number
//! and only the one matching the newest request is ever handed back.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, warn};

use mandelscope_core::{Bounds, EscapeParams};

use crate::compute::{compute_cancellable, ComputeCancel};
use crate::error::EngineError;
use crate::grid::EscapeGrid;

struct Job {
    seq: u64,
    generation: u64,
    width: u32,
    height: u32,
    bounds: Bounds,
    params: EscapeParams,
}

struct Done {
    seq: u64,
    grid: crate::Result<EscapeGrid>,
}

/// Owns one compute thread. At most one computation is in flight; a newer
/// request supersedes whatever is queued or running.
pub struct RecomputeWorker {
    tx: Option<mpsc::Sender<Job>>,
    rx: mpsc::Receiver<Done>,
    cancel: Arc<ComputeCancel>,
    latest: u64,
    pending: bool,
    handle: Option<JoinHandle<()>>,
}

impl RecomputeWorker {
    pub fn spawn() -> crate::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (done_tx, done_rx) = mpsc::channel::<Done>();
        let cancel = Arc::new(ComputeCancel::new());
        let worker_cancel = Arc::clone(&cancel);

        let handle = std::thread::Builder::new()
            .name("recompute-worker".into())
            .spawn(move || run(job_rx, done_tx, &worker_cancel))
            .map_err(EngineError::WorkerSpawn)?;

        Ok(Self {
            tx: Some(job_tx),
            rx: done_rx,
            cancel,
            latest: 0,
            pending: false,
            handle: Some(handle),
        })
    }

    /// Queue a computation and return its sequence number. Anything older
    /// is cancelled.
    pub fn request(
        &mut self,
        width: u32,
        height: u32,
        bounds: Bounds,
        params: EscapeParams,
    ) -> crate::Result<u64> {
        let generation = self.cancel.cancel();
        let seq = self.latest + 1;
        let job = Job {
            seq,
            generation,
            width,
            height,
            bounds,
            params,
        };
        self.tx
            .as_ref()
            .ok_or(EngineError::WorkerDisconnected)?
            .send(job)
            .map_err(|_| EngineError::WorkerDisconnected)?;
        self.latest = seq;
        self.pending = true;
        debug!(seq, generation, "Recompute requested");
        Ok(seq)
    }

    /// Sequence number of the newest request, 0 before the first one.
    pub fn latest_seq(&self) -> u64 {
        self.latest
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Rows finished by the running computation as `(done, total)`.
    pub fn progress(&self) -> (usize, usize) {
        self.cancel.progress()
    }

    /// Stop the running computation. Its result, if it still arrives, is
    /// dropped.
    pub fn cancel_in_flight(&mut self) {
        if self.pending {
            self.cancel.cancel();
            self.pending = false;
            debug!(seq = self.latest, "Recompute cancelled");
        }
    }

    /// Non-blocking poll for the newest result.
    pub fn try_latest(&mut self) -> crate::Result<Option<EscapeGrid>> {
        while self.pending {
            match self.rx.try_recv() {
                Ok(done) => {
                    if let Some(grid) = self.accept(done) {
                        return grid.map(Some);
                    }
                }
                Err(mpsc::TryRecvError::Empty) => return Ok(None),
                Err(mpsc::TryRecvError::Disconnected) => {
                    return Err(EngineError::WorkerDisconnected)
                }
            }
        }
        Ok(None)
    }

    /// Block until the newest request finishes. `Ok(None)` if nothing is
    /// pending.
    pub fn wait_latest(&mut self) -> crate::Result<Option<EscapeGrid>> {
        while self.pending {
            let done = self
                .rx
                .recv()
                .map_err(|_| EngineError::WorkerDisconnected)?;
            if let Some(grid) = self.accept(done) {
                return grid.map(Some);
            }
        }
        Ok(None)
    }

    fn accept(&mut self, done: Done) -> Option<crate::Result<EscapeGrid>> {
        if done.seq != self.latest {
            debug!(seq = done.seq, latest = self.latest, "Discarding stale grid");
            return None;
        }
        self.pending = false;
        Some(done.grid)
    }
}

impl Drop for RecomputeWorker {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Recompute worker panicked");
            }
        }
    }
}

fn run(rx: mpsc::Receiver<Job>, tx: mpsc::Sender<Done>, cancel: &ComputeCancel) {
    debug!("Recompute worker started");
    while let Ok(mut job) = rx.recv() {
        // Only the newest queued job matters.
        while let Ok(newer) = rx.try_recv() {
            job = newer;
        }
        if cancel.generation() != job.generation {
            continue;
        }
        let grid = match compute_cancellable(
            job.width,
            job.height,
            &job.bounds,
            &job.params,
            cancel,
            job.generation,
        ) {
            Ok(Some(grid)) => Ok(grid),
            Ok(None) => {
                debug!(seq = job.seq, "Recompute superseded");
                continue;
            }
            Err(e) => Err(e),
        };
        if tx.send(Done { seq: job.seq, grid }).is_err() {
            break;
        }
    }
    debug!("Recompute worker exiting");
}
