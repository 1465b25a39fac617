//! Reads lines from stdin on one thread and writes them through a pipe to a
//! reader thread that echoes them to stdout, demonstrating basic blocking
//! flow control.

use std::io::{self, BufRead, Write};
use std::thread;

use blockpipe::pipe;

fn main() {
    env_logger::init();

    let (mut sink, mut source) = pipe(64 * 1024);

    let reader = thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    let mut stdout = io::stdout();
                    let _ = stdout.write_all(&buf[..n]);
                    let _ = stdout.flush();
                }
                Err(err) => {
                    eprintln!("pipe_demo: read failed: {err}");
                    break;
                }
            }
        }
    });

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(mut line) = line else { break };
        line.push('\n');
        if let Err(err) = sink.write(line.as_bytes()) {
            eprintln!("pipe_demo: write failed: {err}");
            break;
        }
    }
    if let Err(err) = sink.close() {
        eprintln!("pipe_demo: close failed: {err}");
    }

    reader.join().expect("reader thread panicked");
}
