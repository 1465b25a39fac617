//! Internal byte buffer.
//!
//! Holds queued bytes for a pipe. This is the in-crate stand-in for the
//! general-purpose segmented byte-buffer container that a full I/O library
//! would otherwise ship as its own crate (see `SPEC_FULL.md` §1/§6): it only
//! needs to support moving bytes in and out by reference to whatever slice
//! the caller supplies, without per-byte copying overhead beyond a single
//! `memcpy`-equivalent per transfer.
//!
//! Always accessed under the owning [`crate::state::PipeState`]'s monitor,
//! so it carries no locking of its own.

use std::collections::VecDeque;

/// A FIFO byte queue backed by a `VecDeque<u8>`.
///
/// `VecDeque` already gives O(1) amortized push/pop at both ends and
/// contiguous-slice access via `as_slices`, which is enough to move ranges
/// of bytes in and out without copying byte-by-byte.
#[derive(Debug, Default)]
pub struct RingBuffer {
    data: VecDeque<u8>,
}

impl RingBuffer {
    /// Create an empty buffer with room for roughly `capacity` bytes
    /// pre-reserved, to avoid reallocation churn in the common case.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: VecDeque::with_capacity(capacity),
        }
    }

    /// Number of bytes currently queued.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append `src` to the tail of the buffer. The caller is responsible for
    /// ensuring `src.len()` does not exceed the available capacity.
    pub fn push_from(&mut self, src: &[u8]) {
        self.data.extend(src.iter().copied());
    }

    /// Remove up to `dst.len()` bytes from the head of the buffer into
    /// `dst`, returning the number of bytes actually moved.
    pub fn pop_into(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.data.len());
        for (slot, byte) in dst.iter_mut().zip(self.data.drain(..n)) {
            *slot = byte;
        }
        n
    }

    /// Discard all queued bytes.
    pub fn clear(&mut self) {
        self.data.clear();
    }
}
