//! The reading half of a pipe.

use std::sync::Arc;

use crate::deadline::{Deadline, WaitDisposition};
use crate::error::{PipeError, PipeResult};
use crate::state::{DownstreamSink, PipeState};

/// The read endpoint of a pipe created by [`crate::pipe`].
///
/// Only one thread should hold a given `Source` at a time, matching the
/// single-reader assumption built into the monitor underneath.
pub struct Source {
    pub(crate) state: Arc<PipeState>,
    pub(crate) deadline: Deadline,
    pub(crate) closed: bool,
}

impl Source {
    /// The deadline consulted by every blocking call on this endpoint.
    pub fn deadline(&self) -> &Deadline {
        &self.deadline
    }

    /// Read at least one byte into `buf`, blocking until data arrives.
    ///
    /// Returns the number of bytes read, which is always greater than zero
    /// unless the sink has closed and the buffer is empty — that is the
    /// only situation in which `Ok(0)` is returned, and it is the
    /// end-of-stream signal. A buffer that is merely empty *for now* is not
    /// distinguishable from "no data"; the call blocks rather than
    /// returning a misleading zero.
    pub fn read(&mut self, buf: &mut [u8]) -> PipeResult<usize> {
        if self.closed {
            return Err(PipeError::Closed);
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let mut guard = self.state.lock();
        loop {
            if !guard.buffer.is_empty() {
                let n = guard.buffer.pop_into(buf);
                self.state.signal();
                drop(guard);
                return Ok(n);
            }

            if guard.sink_closed {
                log::debug!("source read: end of stream, buffer drained and sink closed");
                return Ok(0);
            }

            log::debug!("source blocked: buffer empty, waiting for writer");
            let (g, disposition) = self.deadline.wait(guard);
            guard = g;
            match disposition {
                WaitDisposition::Elapsed => return Err(PipeError::Timeout),
                WaitDisposition::Interrupted => return Err(PipeError::Interrupted),
                WaitDisposition::Signaled => continue,
            }
        }
    }

    /// Close the source, idempotently.
    ///
    /// Drops whatever is still buffered and wakes a blocked writer, which
    /// will observe [`PipeError::SourceClosed`] on its next attempt to
    /// queue more bytes.
    pub fn close(&mut self) {
        if self.closed {
            log::debug!("source close() called on an already-closed source");
            return;
        }
        self.closed = true;

        let mut guard = self.state.lock();
        guard.source_closed = true;
        guard.buffer.clear();
        self.state.signal();
        drop(guard);
    }

    /// Redirect all future bytes written to the sink directly into
    /// `destination`, bypassing the internal buffer entirely.
    ///
    /// Fold is only permitted while the buffer is empty, the sink is not
    /// closed, the source is not closed, and no fold is already in place —
    /// any other state fails with [`PipeError::IllegalState`] and leaves
    /// the pipe otherwise usable. Consumes the `Source`, since reading
    /// through it directly no longer makes sense once it has handed
    /// responsibility for the stream off to `destination`. This does not
    /// block: it installs `destination` and returns immediately, leaving
    /// [`crate::Sink::write`] to forward into it and [`crate::Sink::close`]
    /// to close it once the writer is done.
    pub fn fold<D>(mut self, destination: D) -> PipeResult<()>
    where
        D: DownstreamSink + 'static,
    {
        if self.closed {
            return Err(PipeError::IllegalState("source already closed"));
        }

        let mut guard = self.state.lock();
        if guard.folded_sink.is_some() {
            return Err(PipeError::IllegalState("pipe is already folded"));
        }
        if !guard.buffer.is_empty() {
            return Err(PipeError::IllegalState("buffer is not empty"));
        }
        if guard.sink_closed {
            return Err(PipeError::IllegalState("sink already closed"));
        }

        guard.folded_sink = Some(Box::new(destination));
        log::debug!("source fold: redirecting future writes to a downstream sink");
        self.state.signal();
        drop(guard);

        self.closed = true;
        Ok(())
    }
}

impl Drop for Source {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PipeState;
    use parking_lot::Condvar;

    struct NoopSink;

    impl DownstreamSink for NoopSink {
        fn write(&mut self, _buf: &[u8]) -> PipeResult<()> {
            Ok(())
        }

        fn flush(&mut self) -> PipeResult<()> {
            Ok(())
        }

        fn close(&mut self) -> PipeResult<()> {
            Ok(())
        }
    }

    #[test]
    fn fold_rejects_a_pipe_already_folded() {
        let condvar = Arc::new(Condvar::new());
        let state = Arc::new(PipeState::new(4, Arc::clone(&condvar)));
        state.lock().folded_sink = Some(Box::new(NoopSink));

        let source = Source {
            state,
            deadline: Deadline::new(condvar),
            closed: false,
        };

        let err = source.fold(NoopSink).unwrap_err();
        assert_eq!(err, PipeError::IllegalState("pipe is already folded"));
    }
}
