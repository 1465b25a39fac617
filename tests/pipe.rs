use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use blockpipe::{pipe, DownstreamSink, PipeError};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[test]
fn small_write_then_read_round_trips() {
    let (mut sink, mut source) = pipe(64);

    let writer = thread::spawn(move || {
        sink.write(b"hello, pipe").unwrap();
        sink.close().unwrap();
    });

    let mut buf = [0u8; 64];
    let mut total = 0;
    loop {
        let n = source.read(&mut buf[total..]).unwrap();
        if n == 0 {
            break;
        }
        total += n;
    }

    assert_eq!(&buf[..total], b"hello, pipe");
    writer.join().unwrap();
}

#[test]
fn sink_write_times_out_when_reader_never_drains() {
    let (mut sink, source) = pipe(4);
    sink.deadline().set_timeout(Duration::from_millis(150));

    let err = sink.write(b"too much for four bytes").unwrap_err();
    assert_eq!(err, PipeError::Timeout);

    drop(source);
}

#[test]
fn source_read_times_out_when_writer_never_sends() {
    let (sink, mut source) = pipe(4);
    source.deadline().set_timeout(Duration::from_millis(150));

    let mut buf = [0u8; 4];
    let err = source.read(&mut buf).unwrap_err();
    assert_eq!(err, PipeError::Timeout);

    drop(sink);
}

#[test]
fn slow_reader_blocks_fast_writer_without_losing_bytes() {
    let (mut sink, mut source) = pipe(8);

    let writer = thread::spawn(move || {
        for chunk in b"abcdefghij".chunks(3) {
            sink.write(chunk).unwrap();
        }
        sink.close().unwrap();
    });

    let mut received = Vec::new();
    let mut buf = [0u8; 3];
    loop {
        thread::sleep(Duration::from_millis(5));
        let n = source.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        received.extend_from_slice(&buf[..n]);
    }

    assert_eq!(received, b"abcdefghij");
    writer.join().unwrap();
}

#[test]
fn writer_fails_once_reader_closes() {
    let (mut sink, mut source) = pipe(4);
    source.close();

    let err = sink.write(b"xyz").unwrap_err();
    assert_eq!(err, PipeError::SourceClosed);
}

#[test]
fn blocked_reader_wakes_up_on_sink_close() {
    let (mut sink, mut source) = pipe(4);

    let closer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        sink.close().unwrap();
    });

    let mut buf = [0u8; 4];
    let n = source.read(&mut buf).unwrap();
    assert_eq!(n, 0);

    closer.join().unwrap();
}

#[test]
fn flush_after_reader_close_without_unread_data_succeeds() {
    let (mut sink, mut source) = pipe(4);
    sink.write(b"ab").unwrap();

    let mut buf = [0u8; 2];
    source.read(&mut buf).unwrap();
    source.close();

    sink.flush().unwrap();
}

#[test]
fn flush_after_reader_close_with_unread_data_fails() {
    let (mut sink, mut source) = pipe(4);
    sink.write(b"ab").unwrap();
    source.close();

    let err = sink.flush().unwrap_err();
    assert_eq!(err, PipeError::SourceClosed);
}

#[test]
fn closing_sink_does_not_wait_for_the_reader_to_drain() {
    let (mut sink, source) = pipe(8);
    sink.write(b"buffered").unwrap();
    sink.close().unwrap();
    drop(source);
}

#[test]
fn closing_sink_with_unread_data_after_reader_closed_reports_loss() {
    let (mut sink, mut source) = pipe(8);
    sink.write(b"buffered").unwrap();
    source.close();

    let err = sink.close().unwrap_err();
    assert_eq!(err, PipeError::SourceClosed);
}

struct VecSink(Arc<Mutex<Vec<u8>>>);

impl DownstreamSink for VecSink {
    fn write(&mut self, buf: &[u8]) -> Result<(), PipeError> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PipeError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), PipeError> {
        Ok(())
    }
}

#[test]
fn fold_redirects_writes_past_the_buffer() {
    let (mut sink, source) = pipe(4);
    let collected = Arc::new(Mutex::new(Vec::new()));
    let destination = VecSink(Arc::clone(&collected));

    // fold() does not block; it installs the destination and returns.
    source.fold(destination).unwrap();

    // Longer than the pipe's capacity, which would block forever on the
    // buffered path; folding removes that limit.
    sink.write(b"this message is longer than four bytes").unwrap();
    sink.close().unwrap();

    assert_eq!(
        &collected.lock().unwrap()[..],
        b"this message is longer than four bytes"
    );
}

#[test]
fn fold_rejects_an_already_closed_source() {
    let (_sink, mut source) = pipe(4);
    source.close();

    let collected = Arc::new(Mutex::new(Vec::new()));
    let destination = VecSink(collected);
    let err = source.fold(destination).unwrap_err();
    assert_eq!(err, PipeError::IllegalState("source already closed"));
}

#[test]
fn fold_rejects_a_non_empty_buffer() {
    let (mut sink, source) = pipe(4);
    sink.write(b"ab").unwrap();

    let collected = Arc::new(Mutex::new(Vec::new()));
    let destination = VecSink(collected);
    let err = source.fold(destination).unwrap_err();
    assert_eq!(err, PipeError::IllegalState("buffer is not empty"));
}

#[test]
fn fold_rejects_an_already_closed_sink() {
    let (mut sink, source) = pipe(4);
    sink.close().unwrap();

    let collected = Arc::new(Mutex::new(Vec::new()));
    let destination = VecSink(collected);
    let err = source.fold(destination).unwrap_err();
    assert_eq!(err, PipeError::IllegalState("sink already closed"));
}

#[test]
fn large_randomized_round_trip_preserves_bytes() {
    const TOTAL: usize = 16 * 1024 * 1024;
    const CHUNK: usize = 8192;

    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let mut source_bytes = vec![0u8; TOTAL];
    rng.fill_bytes(&mut source_bytes);

    let expected_hash = {
        let mut hasher = DefaultHasher::new();
        source_bytes.hash(&mut hasher);
        hasher.finish()
    };

    let (mut sink, mut source) = pipe(1000);
    let to_send = source_bytes.clone();

    let writer = thread::spawn(move || {
        for chunk in to_send.chunks(CHUNK) {
            sink.write(chunk).unwrap();
        }
        sink.close().unwrap();
    });

    let mut received = Vec::with_capacity(TOTAL);
    let mut buf = [0u8; CHUNK];
    loop {
        let n = source.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        received.extend_from_slice(&buf[..n]);
    }
    writer.join().unwrap();

    let actual_hash = {
        let mut hasher = DefaultHasher::new();
        received.hash(&mut hasher);
        hasher.finish()
    };

    assert_eq!(received.len(), TOTAL);
    assert_eq!(actual_hash, expected_hash);
}
