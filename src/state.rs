//! The pipe's rendezvous object: capacity, buffer, close flags, monitor and
//! condition, and the fold target used for reader takeover.
//!
//! `PipeState` exposes no public operations of its own — [`crate::Sink`] and
//! [`crate::Source`] reach into it under its monitor. A single condition is
//! shared by both sides and broadcast on every transition (see
//! `SPEC_FULL.md` §4.1): the set of possible waiters is at most one writer
//! and one reader, so a wake-all is always cheap and is never ambiguous
//! about which side needs to recheck its predicate.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::buffer::RingBuffer;
use crate::error::PipeResult;

/// A sink-like forwarding target for [`crate::Source::fold`].
///
/// Implemented by [`crate::Sink`] itself, so one pipe's source can fold into
/// another pipe's sink, as well as by any adapter a caller wants to splice
/// in (e.g. a real downstream writer outside this crate).
pub trait DownstreamSink: Send {
    /// Write exactly `buf.len()` bytes, or fail.
    fn write(&mut self, buf: &[u8]) -> PipeResult<()>;
    /// Ensure previously written bytes are observable downstream.
    fn flush(&mut self) -> PipeResult<()>;
    /// Idempotently close the downstream sink.
    fn close(&mut self) -> PipeResult<()>;
}

pub(crate) struct Inner {
    pub(crate) capacity: usize,
    pub(crate) buffer: RingBuffer,
    pub(crate) sink_closed: bool,
    pub(crate) source_closed: bool,
    pub(crate) folded_sink: Option<Box<dyn DownstreamSink>>,
}

pub(crate) struct PipeState {
    pub(crate) inner: Mutex<Inner>,
    pub(crate) condvar: Arc<Condvar>,
}

impl PipeState {
    pub(crate) fn new(capacity: usize, condvar: Arc<Condvar>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                capacity,
                buffer: RingBuffer::with_capacity(capacity),
                sink_closed: false,
                source_closed: false,
                folded_sink: None,
            }),
            condvar,
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock()
    }

    /// Signal every waiter. Called after any mutation that could unblock a
    /// writer or a reader.
    pub(crate) fn signal(&self) {
        self.condvar.notify_all();
    }
}
