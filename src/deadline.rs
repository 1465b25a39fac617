//! Per-endpoint deadline and cancellable condition wait.
//!
//! Stands in for the timeout/deadline abstraction `SPEC_FULL.md` §1 calls
//! out as an external collaborator: a wall-clock point in time at which a
//! blocking wait is required to abort with `Timeout`, plus a cooperative
//! interruption flag standing in for the "thread interrupted" disposition
//! the original design assumes (stable Rust has no portable way to yank a
//! thread out of a condition wait from the outside).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, MutexGuard};

/// Outcome of a single cancellable wait on the pipe's shared condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitDisposition {
    /// The condition was signaled; the caller should re-check its
    /// predicate (this may be a spurious wakeup).
    Signaled,
    /// The deadline elapsed before the condition was signaled.
    Elapsed,
    /// [`Deadline::interrupt`] was called while waiting.
    Interrupted,
}

/// A per-endpoint wall-clock deadline, consulted on every potentially
/// blocking operation on that endpoint.
///
/// Deadlines are never shared between a sink and a source; each endpoint
/// owns one exclusively.
pub struct Deadline {
    until: parking_lot::Mutex<Option<Instant>>,
    interrupted: AtomicBool,
    condvar: Arc<Condvar>,
}

impl Deadline {
    /// Create a deadline with no expiry; waits block indefinitely until
    /// signaled or interrupted.
    pub(crate) fn new(condvar: Arc<Condvar>) -> Self {
        Self {
            until: parking_lot::Mutex::new(None),
            interrupted: AtomicBool::new(false),
            condvar,
        }
    }

    /// Replace the deadline with a fixed point in time, or clear it with
    /// `None` to wait indefinitely again.
    pub fn set_at(&self, instant: Option<Instant>) {
        *self.until.lock() = instant;
    }

    /// Replace the deadline with "now + `timeout`".
    pub fn set_timeout(&self, timeout: Duration) {
        self.set_at(Some(Instant::now() + timeout));
    }

    /// Clear any deadline; subsequent waits block indefinitely.
    pub fn clear(&self) {
        self.set_at(None);
    }

    /// Current deadline instant, if any.
    pub fn get(&self) -> Option<Instant> {
        *self.until.lock()
    }

    /// Mark this endpoint as interrupted and wake anyone waiting on its
    /// behalf. The flag is consumed (cleared) by the next `wait` call that
    /// observes it.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
        self.condvar.notify_all();
    }

    /// Wait on `condvar` until signaled, until this deadline elapses, or
    /// until [`Deadline::interrupt`] is called.
    ///
    /// `guard` is consumed and handed back alongside the disposition, since
    /// `parking_lot::Condvar::wait*` requires taking the guard by value.
    pub(crate) fn wait<'a, T>(
        &self,
        mut guard: MutexGuard<'a, T>,
    ) -> (MutexGuard<'a, T>, WaitDisposition) {
        if self.interrupted.swap(false, Ordering::SeqCst) {
            return (guard, WaitDisposition::Interrupted);
        }

        match self.get() {
            None => {
                self.condvar.wait(&mut guard);
            }
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return (guard, WaitDisposition::Elapsed);
                }
                let timed_out = self
                    .condvar
                    .wait_until(&mut guard, deadline)
                    .timed_out();
                if timed_out {
                    return (guard, WaitDisposition::Elapsed);
                }
            }
        }

        if self.interrupted.swap(false, Ordering::SeqCst) {
            return (guard, WaitDisposition::Interrupted);
        }
        (guard, WaitDisposition::Signaled)
    }
}

impl std::fmt::Debug for Deadline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deadline")
            .field("until", &self.get())
            .field("interrupted", &self.interrupted.load(Ordering::SeqCst))
            .finish()
    }
}
