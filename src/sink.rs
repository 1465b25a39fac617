//! The writing half of a pipe.

use std::sync::Arc;

use crate::deadline::{Deadline, WaitDisposition};
use crate::error::{PipeError, PipeResult};
use crate::state::{DownstreamSink, PipeState};

/// The write endpoint of a pipe created by [`crate::pipe`].
///
/// Only one thread should hold a given `Sink` at a time; nothing here is
/// `Sync`, and the monitor underneath assumes a single writer.
pub struct Sink {
    pub(crate) state: Arc<PipeState>,
    pub(crate) deadline: Deadline,
    pub(crate) closed: bool,
}

impl Sink {
    /// The deadline consulted by every blocking call on this endpoint.
    ///
    /// Set it with [`Deadline::set_timeout`] or [`Deadline::set_at`] before
    /// a call that might block; clear it with [`Deadline::clear`] to go
    /// back to blocking indefinitely.
    pub fn deadline(&self) -> &Deadline {
        &self.deadline
    }

    /// Write all of `data`, blocking while the buffer is full.
    ///
    /// Blocks until every byte is queued (or forwarded, if the source has
    /// [`crate::Source::fold`]ed into a downstream sink), the source
    /// closes, the deadline elapses, or the wait is interrupted. On error a
    /// prefix of `data` may already have been queued and made visible to
    /// the reader; there is no way to undo that, so callers that need
    /// exactly-once delivery of a message should not retry a failed write
    /// with the same buffer.
    pub fn write(&mut self, data: &[u8]) -> PipeResult<()> {
        if self.closed {
            return Err(PipeError::Closed);
        }
        if data.is_empty() {
            return Ok(());
        }

        let mut offset = 0;
        let mut guard = self.state.lock();
        loop {
            if guard.source_closed {
                return Err(PipeError::SourceClosed);
            }

            if let Some(mut destination) = guard.folded_sink.take() {
                drop(guard);
                let result = destination.write(&data[offset..]);
                let mut guard = self.state.lock();
                guard.folded_sink = Some(destination);
                drop(guard);
                return result;
            }

            let available = guard.capacity.saturating_sub(guard.buffer.len());
            if available == 0 {
                log::debug!("sink blocked: buffer full at capacity {}", guard.capacity);
                let (g, disposition) = self.deadline.wait(guard);
                guard = g;
                match disposition {
                    WaitDisposition::Elapsed => return Err(PipeError::Timeout),
                    WaitDisposition::Interrupted => return Err(PipeError::Interrupted),
                    WaitDisposition::Signaled => continue,
                }
            }

            let take = available.min(data.len() - offset);
            guard.buffer.push_from(&data[offset..offset + take]);
            offset += take;
            self.state.signal();

            if offset == data.len() {
                return Ok(());
            }
        }
    }

    /// Make previously written bytes observable to the source side.
    ///
    /// Buffered bytes are already visible to the source as soon as
    /// [`Sink::write`] returns, so this mostly matters when folded: it
    /// forwards to the downstream sink's own `flush`. If the source has
    /// closed with nothing left unread, flush still reports success (there
    /// is nothing left to lose); if unread bytes remain, it reports
    /// [`PipeError::SourceClosed`] the same way `write` would.
    pub fn flush(&mut self) -> PipeResult<()> {
        if self.closed {
            return Err(PipeError::Closed);
        }
        let mut guard = self.state.lock();
        if let Some(destination) = guard.folded_sink.as_mut() {
            return destination.flush();
        }
        if guard.source_closed && !guard.buffer.is_empty() {
            return Err(PipeError::SourceClosed);
        }
        Ok(())
    }

    /// Close the sink, idempotently.
    ///
    /// Wakes any blocked reader so it can observe end-of-stream once it has
    /// drained whatever remains buffered. If folded, the downstream sink is
    /// closed too. Fails with [`PipeError::SourceClosed`] if the source had
    /// already closed while bytes were still sitting unread in the buffer —
    /// those bytes are lost, and the caller should know that.
    pub fn close(&mut self) -> PipeResult<()> {
        if self.closed {
            log::debug!("sink close() called on an already-closed sink");
            return Ok(());
        }
        self.closed = true;

        let mut guard = self.state.lock();
        guard.sink_closed = true;
        let bytes_lost = guard.source_closed && !guard.buffer.is_empty();
        let destination = guard.folded_sink.take();
        self.state.signal();
        drop(guard);

        if let Some(mut destination) = destination {
            let _ = destination.close();
        }

        if bytes_lost {
            Err(PipeError::SourceClosed)
        } else {
            Ok(())
        }
    }
}

impl DownstreamSink for Sink {
    fn write(&mut self, buf: &[u8]) -> PipeResult<()> {
        Sink::write(self, buf)
    }

    fn flush(&mut self) -> PipeResult<()> {
        Sink::flush(self)
    }

    fn close(&mut self) -> PipeResult<()> {
        Sink::close(self)
    }
}

impl Drop for Sink {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
