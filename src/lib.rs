//! An in-memory, bounded, single-producer/single-consumer byte pipe.
//!
//! A pipe is a pair of endpoints, [`Sink`] and [`Source`], sharing a fixed-
//! capacity buffer. Writes block while the buffer is full; reads block
//! while it is empty. Either side can be given a deadline so a blocking
//! call fails with [`PipeError::Timeout`] instead of hanging forever, and
//! either side can be closed independently, propagating to the other as
//! [`PipeError::SourceClosed`] on the writer or end-of-stream (`Ok(0)`) on
//! the reader.
//!
//! ```
//! use blockpipe::pipe;
//!
//! let (mut sink, mut source) = pipe(64);
//! let writer = std::thread::spawn(move || {
//!     sink.write(b"hello").unwrap();
//!     sink.close().unwrap();
//! });
//!
//! let mut buf = [0u8; 64];
//! let mut total = 0;
//! loop {
//!     let n = source.read(&mut buf[total..]).unwrap();
//!     if n == 0 {
//!         break;
//!     }
//!     total += n;
//! }
//! assert_eq!(&buf[..total], b"hello");
//! writer.join().unwrap();
//! ```

mod buffer;
mod deadline;
mod error;
mod sink;
mod source;
mod state;

use std::sync::Arc;

use parking_lot::Condvar;

pub use buffer::RingBuffer;
pub use deadline::{Deadline, WaitDisposition};
pub use error::{PipeError, PipeResult};
pub use sink::Sink;
pub use source::Source;
pub use state::DownstreamSink;

use state::PipeState;

/// Create a new pipe with room for `capacity` bytes.
///
/// # Panics
///
/// Panics if `capacity` is zero: a zero-capacity pipe could never admit a
/// single byte through the buffered path, which would make every write
/// immediately block forever on a pipe nothing has folded.
pub fn pipe(capacity: usize) -> (Sink, Source) {
    assert!(capacity > 0, "pipe capacity must be greater than zero");

    let condvar = Arc::new(Condvar::new());
    let state = Arc::new(PipeState::new(capacity, Arc::clone(&condvar)));

    let sink = Sink {
        state: Arc::clone(&state),
        deadline: Deadline::new(Arc::clone(&condvar)),
        closed: false,
    };
    let source = Source {
        state,
        deadline: Deadline::new(condvar),
        closed: false,
    };
    (sink, source)
}
