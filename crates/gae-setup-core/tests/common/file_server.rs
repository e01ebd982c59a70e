//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a single static body to every GET. The first `fail_first` requests
//! can be answered with an error instead, to exercise the retry loop.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Copy, Default)]
pub struct FileServerOptions {
    /// Number of leading requests that fail.
    pub fail_first: usize,
    /// How failing requests fail.
    pub failure: Failure,
}

#[derive(Debug, Clone, Copy, Default)]
pub enum Failure {
    /// Respond `500 Internal Server Error`.
    #[default]
    ServerError,
    /// Close the connection without answering.
    Hangup,
}

/// Running server: base URL and a request counter.
pub struct FileServer {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl FileServer {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub fn start(body: Vec<u8>) -> FileServer {
    start_with_options(body, FileServerOptions::default())
}

/// Starts a server in a background thread. The server runs until the process exits.
pub fn start_with_options(body: Vec<u8>, opts: FileServerOptions) -> FileServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_srv = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let n = hits_srv.fetch_add(1, Ordering::SeqCst);
            let body = Arc::clone(&body);
            thread::spawn(move || handle(stream, &body, n < opts.fail_first, opts.failure));
        }
    });
    FileServer {
        url: format!("http://127.0.0.1:{}/sdk.tar.gz", port),
        hits,
    }
}

fn handle(mut stream: std::net::TcpStream, body: &[u8], fail: bool, failure: Failure) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(_) => {}
    }
    if fail {
        match failure {
            Failure::Hangup => return,
            Failure::ServerError => {
                let msg = b"boom";
                let head = format!(
                    "HTTP/1.1 500 Internal Server Error\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    msg.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(msg);
                return;
            }
        }
    }
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Type: application/gzip\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}
