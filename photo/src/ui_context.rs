//! The single context that owns display state.
//!
//! Every write to a photo's image after a load and every notification goes
//! through [`UiContext::dispatch`]. Jobs run one at a time, in the order they
//! were dispatched, wherever the matching [`UiLoop`] is driven.

use std::cell::Cell;

use tokio::sync::mpsc;
use tracing::warn;

type Job = Box<dyn FnOnce() + Send + 'static>;

thread_local! {
    static RUNNING_UI_JOB: Cell<bool> = const { Cell::new(false) };
}

#[derive(Clone)]
pub struct UiContext {
    sender: mpsc::UnboundedSender<Job>,
}

pub struct UiLoop {
    receiver: mpsc::UnboundedReceiver<Job>,
}

pub fn ui_context() -> (UiContext, UiLoop) {
    let (sender, receiver) = mpsc::unbounded_channel();

    (UiContext { sender }, UiLoop { receiver })
}

impl UiContext {
    /// Queues `job` for the UI loop. Returns false when the loop is gone and
    /// the job was dropped without running.
    pub fn dispatch(&self, job: impl FnOnce() + Send + 'static) -> bool {
        if self.sender.send(Box::new(job)).is_err() {
            warn!("UI loop has shut down, dropping job");
            return false;
        }

        true
    }

    /// True while the calling thread is running a job from a [`UiLoop`].
    pub fn is_current() -> bool {
        RUNNING_UI_JOB.with(Cell::get)
    }
}

/// Marks the current thread as running a UI job until dropped, including
/// when the job unwinds.
struct RunningJob;

impl RunningJob {
    fn enter() -> Self {
        RUNNING_UI_JOB.with(|running| running.set(true));
        RunningJob
    }
}

impl Drop for RunningJob {
    fn drop(&mut self) {
        RUNNING_UI_JOB.with(|running| running.set(false));
    }
}

impl UiLoop {
    fn run_job(job: Job) {
        let _running = RunningJob::enter();
        job();
    }

    /// Runs jobs until every [`UiContext`] handle has been dropped.
    pub async fn run(mut self) {
        while let Some(job) = self.receiver.recv().await {
            Self::run_job(job);
        }
    }

    /// Waits for the next job and runs it. Returns false once every
    /// [`UiContext`] handle has been dropped.
    pub async fn run_next(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(job) => {
                Self::run_job(job);
                true
            }
            None => false,
        }
    }

    /// Runs whatever is queued right now without waiting, returning how many
    /// jobs ran.
    pub fn run_pending(&mut self) -> usize {
        let mut count = 0;

        while let Ok(job) = self.receiver.try_recv() {
            Self::run_job(job);
            count += 1;
        }

        count
    }
}
