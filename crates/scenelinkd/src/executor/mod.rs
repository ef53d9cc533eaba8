//! Serialised execution on the host context.
//!
//! The host owns all mutable scene state and runs on exactly one thread. Any
//! other thread that needs the host submits a closure through a
//! [`HostExecutor`] and blocks until the [`HostLoop`] has run it:
//!
//! ```text
//! connection worker ──job──▶ queue ──▶ HostLoop::run_* (host thread)
//!        ▲                                   │
//!        └──────────── one-shot reply ◀──────┘
//! ```
//!
//! Jobs run one at a time in submission order, so no two handlers ever touch
//! the host concurrently. A panic inside a job is caught on the host thread
//! and reported to the waiting caller.

mod errors;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, warn};

use crate::shutdown::ShutdownToken;

pub use self::errors::ExecutorError;

const EXECUTOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::executor");

/// Interval at which a waiting caller re-checks the shutdown flag.
const REPLY_POLL: Duration = Duration::from_millis(50);

type Job<H> = Box<dyn FnOnce(&mut H) + Send + 'static>;
type JobOutcome<T> = Result<T, String>;

/// Host side of the executor: owns the host value and drains the job queue.
pub struct HostLoop<H> {
    host: H,
    jobs: Receiver<Job<H>>,
}

/// Submission side of the executor; cheap to clone and share across threads.
pub struct HostExecutor<H> {
    jobs: Sender<Job<H>>,
}

impl<H> Clone for HostExecutor<H> {
    fn clone(&self) -> Self {
        Self {
            jobs: self.jobs.clone(),
        }
    }
}

impl<H> HostLoop<H> {
    /// Creates a loop owning `host` together with its submission handle.
    pub fn new(host: H) -> (Self, HostExecutor<H>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (
            Self {
                host,
                jobs: receiver,
            },
            HostExecutor { jobs: sender },
        )
    }

    /// Runs every job already queued and returns how many ran.
    ///
    /// Intended to be called once per host tick.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        loop {
            match self.jobs.try_recv() {
                Ok(job) => {
                    job(&mut self.host);
                    ran += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return ran,
            }
        }
    }

    /// Runs jobs as they arrive until `shutdown` is triggered or every
    /// executor handle has been dropped.
    pub fn run_until(&mut self, shutdown: &ShutdownToken, tick: Duration) {
        while !shutdown.is_triggered() {
            match self.jobs.recv_timeout(tick) {
                Ok(job) => job(&mut self.host),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    debug!(target: EXECUTOR_TARGET, "all executor handles dropped");
                    break;
                }
            }
        }
    }

    /// Borrows the host.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Mutably borrows the host between jobs.
    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Consumes the loop and returns the host.
    pub fn into_host(self) -> H {
        self.host
    }
}

impl<H> HostExecutor<H> {
    /// Runs `work` on the host thread and blocks until it has finished.
    ///
    /// While waiting, the caller re-checks `shutdown`; once it is triggered
    /// the caller stops waiting and the job, if it still runs later, has its
    /// result discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::HostUnavailable`] when the host loop is gone,
    /// [`ExecutorError::WorkPanicked`] when `work` panicked,
    /// [`ExecutorError::Abandoned`] when shutdown interrupted the wait and
    /// [`ExecutorError::WorkDropped`] when the job was discarded unrun.
    pub fn execute<F, T>(&self, work: F, shutdown: &ShutdownToken) -> Result<T, ExecutorError>
    where
        F: FnOnce(&mut H) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (reply, outcome) = crossbeam_channel::bounded::<JobOutcome<T>>(1);
        let job: Job<H> = Box::new(move |host: &mut H| {
            let result = panic::catch_unwind(AssertUnwindSafe(|| work(host))).map_err(panic_message);
            if let Err(message) = &result {
                warn!(target: EXECUTOR_TARGET, panic = %message, "host job panicked");
            }
            if reply.send(result).is_err() {
                debug!(target: EXECUTOR_TARGET, "caller stopped waiting before reply");
            }
        });
        self.jobs
            .send(job)
            .map_err(|_| ExecutorError::HostUnavailable)?;

        loop {
            match outcome.recv_timeout(REPLY_POLL) {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(message)) => return Err(ExecutorError::WorkPanicked { message }),
                Err(RecvTimeoutError::Timeout) => {
                    if shutdown.is_triggered() {
                        return Err(ExecutorError::Abandoned);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return Err(ExecutorError::WorkDropped),
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => (*message).to_owned(),
            Err(_) => "handler panicked".to_owned(),
        },
    }
}
