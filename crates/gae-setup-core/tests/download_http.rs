//! Integration test: libcurl transport against a local HTTP server.
//!
//! HTTPS enforcement is turned off for the plain-HTTP test server; the scheme
//! check itself is covered by the unit tests.

mod common;

use common::file_server::{self, Failure, FileServerOptions};
use gae_setup_core::downloader::{url_retrieve, CurlTransport, DownloadError, DownloadOptions};
use gae_setup_core::retry::{FetchError, RetryPolicy};
use tempfile::tempdir;

fn plain_http(max_attempts: u32) -> DownloadOptions {
    DownloadOptions {
        policy: RetryPolicy {
            max_attempts,
            ..RetryPolicy::default()
        },
        enforce_https: false,
    }
}

#[test]
fn downloads_body_byte_for_byte() {
    let body: Vec<u8> = (0u8..=255).cycle().take(200 * 1024).collect();
    let server = file_server::start(body.clone());
    let dir = tempdir().unwrap();
    let out = dir.path().join("sdk.tar.gz");

    let attempts = url_retrieve(&server.url, &out, &plain_http(2), CurlTransport::default())
        .expect("download");
    assert_eq!(attempts, 1);
    assert_eq!(server.hits(), 1);
    assert_eq!(std::fs::read(&out).unwrap(), body);
}

#[test]
fn server_error_then_success_is_retried() {
    let server = file_server::start_with_options(
        b"DATA".to_vec(),
        FileServerOptions {
            fail_first: 1,
            failure: Failure::ServerError,
        },
    );
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.tar.gz");

    let attempts = url_retrieve(&server.url, &out, &plain_http(2), CurlTransport::default())
        .expect("second attempt succeeds");
    assert_eq!(attempts, 2);
    assert_eq!(server.hits(), 2);
    assert_eq!(std::fs::read(&out).unwrap(), b"DATA");
}

#[test]
fn hangup_then_success_is_retried() {
    let server = file_server::start_with_options(
        b"DATA".to_vec(),
        FileServerOptions {
            fail_first: 1,
            failure: Failure::Hangup,
        },
    );
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.tar.gz");

    url_retrieve(&server.url, &out, &plain_http(2), CurlTransport::default())
        .expect("second attempt succeeds");
    assert_eq!(std::fs::read(&out).unwrap(), b"DATA");
}

#[test]
fn persistent_server_error_exhausts_budget() {
    let server = file_server::start_with_options(
        b"never".to_vec(),
        FileServerOptions {
            fail_first: usize::MAX,
            failure: Failure::ServerError,
        },
    );
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");

    let err = url_retrieve(&server.url, &out, &plain_http(3), CurlTransport::default())
        .unwrap_err();
    match err {
        DownloadError::Transport { attempts, source } => {
            assert_eq!(attempts, 3);
            assert!(matches!(source, FetchError::Http(500)));
        }
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(server.hits(), 3);
}

#[test]
fn http_url_is_refused_when_https_enforced() {
    let server = file_server::start(b"DATA".to_vec());
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");

    let err = url_retrieve(
        &server.url,
        &out,
        &DownloadOptions::default(),
        CurlTransport::default(),
    )
    .unwrap_err();
    assert!(matches!(err, DownloadError::InsecureUrl { .. }));
    assert_eq!(server.hits(), 0);
    assert!(!out.exists());
}
