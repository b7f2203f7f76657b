//! Serialized task execution with rate-limit pacing.
//!
//! Wherever the pipeline talks to a rate-limited remote it runs its work
//! through this executor: tasks execute strictly one at a time on a
//! single worker, with a fixed delay between tasks as deliberate
//! backpressure. There is never parallel dispatch.
//!
//! The worker is an explicit queue (channel + worker thread) carrying a
//! [`CancelToken`]; cancellation is checked between tasks and inside the
//! inter-task delay, so a long run can be abandoned without waiting for
//! the tail of the queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::error::Error;

/// Granularity of cancellation checks inside the inter-task delay.
const SLEEP_SLICE: Duration = Duration::from_millis(25);

// ============================================================================
// Cancellation
// ============================================================================

/// Shared cancellation flag threaded through long-running operations.
///
/// Cloning is cheap; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Irrevocable for this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Fail fast at a suspension point.
    ///
    /// # Errors
    /// [`Error::Cancelled`] once `cancel` has been called.
    pub fn ensure_active(&self) -> Result<(), Error> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// Executor
// ============================================================================

/// A unit of deferred work.
pub type Task<T> = Box<dyn FnOnce() -> Result<T, Error> + Send>;

/// Outcome of one executor run.
#[derive(Debug)]
pub struct RunReport<T> {
    /// Per-task results, in submission order, for every task that ran.
    pub results: Vec<Result<T, Error>>,

    /// Whether every submitted task ran (false after an early stop or
    /// cancellation).
    pub completed: bool,

    /// Whether the cancellation token fired during the run.
    pub cancelled: bool,
}

/// Run `tasks` strictly one at a time with `delay` between them.
///
/// - The delay applies after each task except the last.
/// - `on_progress` is invoked after each completed task with a strictly
///   increasing percentage, ending at 100 when the final task ran.
/// - With `stop_on_error`, the first failing task halts the run; the
///   results collected so far are returned alongside the failure.
///   Otherwise failures are carried in the result list and execution
///   continues.
pub fn run<T: Send + 'static>(
    tasks: Vec<Task<T>>,
    delay: Duration,
    stop_on_error: bool,
    cancel: &CancelToken,
    mut on_progress: Option<&mut dyn FnMut(u8)>,
) -> RunReport<T> {
    let total = tasks.len();
    if total == 0 {
        return RunReport {
            results: Vec::new(),
            completed: true,
            cancelled: cancel.is_cancelled(),
        };
    }

    let (task_tx, task_rx) = mpsc::channel::<Task<T>>();
    let (result_tx, result_rx) = mpsc::channel::<Result<T, Error>>();
    let worker_cancel = cancel.clone();

    let worker = thread::spawn(move || {
        let mut ran = 0usize;
        while let Ok(task) = task_rx.recv() {
            if worker_cancel.is_cancelled() {
                break;
            }
            let result = task();
            let failed = result.is_err();
            ran += 1;
            if result_tx.send(result).is_err() {
                break;
            }
            if failed && stop_on_error {
                break;
            }
            // No delay after the final task.
            if ran < total && !sleep_unless_cancelled(delay, &worker_cancel) {
                break;
            }
        }
    });

    for task in tasks {
        if task_tx.send(task).is_err() {
            break;
        }
    }
    drop(task_tx);

    let mut results = Vec::with_capacity(total);
    let mut last_pct = 0u8;
    for result in result_rx {
        results.push(result);
        if let Some(callback) = on_progress.as_deref_mut() {
            #[allow(clippy::cast_possible_truncation)]
            let pct = ((results.len() * 100) / total) as u8;
            if pct > last_pct {
                callback(pct);
                last_pct = pct;
            }
        }
    }
    worker.join().ok();

    let completed = results.len() == total;
    RunReport {
        results,
        completed,
        cancelled: cancel.is_cancelled(),
    }
}

/// Sleep for `delay` in small slices, bailing out on cancellation.
/// Returns false when the token fired.
fn sleep_unless_cancelled(delay: Duration, cancel: &CancelToken) -> bool {
    let mut remaining = delay;
    while !remaining.is_zero() {
        if cancel.is_cancelled() {
            return false;
        }
        let slice = remaining.min(SLEEP_SLICE);
        thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
    !cancel.is_cancelled()
}

// ============================================================================
// Tests
// ============================================================================
