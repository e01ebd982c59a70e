//! In-memory transport and component runner, plus a tarball builder.

use flate2::write::GzEncoder;
use flate2::Compression;
use gae_setup_core::components::{ComponentCommand, ComponentRunner};
use gae_setup_core::downloader::Transport;
use gae_setup_core::retry::FetchError;
use std::io::{self, Write};

/// Fails the first `fail_first` calls with a connection error, then serves `body`.
pub struct FakeTransport {
    pub body: Vec<u8>,
    pub fail_first: u32,
    pub calls: u32,
    pub urls: Vec<String>,
}

impl FakeTransport {
    pub fn serving(body: Vec<u8>) -> Self {
        Self {
            body,
            fail_first: 0,
            calls: 0,
            urls: Vec::new(),
        }
    }

    pub fn always_failing() -> Self {
        Self {
            fail_first: u32::MAX,
            ..Self::serving(Vec::new())
        }
    }
}

impl Transport for FakeTransport {
    fn fetch(&mut self, url: &str, sink: &mut dyn Write) -> Result<(), FetchError> {
        self.calls += 1;
        self.urls.push(url.to_string());
        if self.calls <= self.fail_first {
            // CURLE_COULDNT_CONNECT
            return Err(FetchError::Curl(curl::Error::new(7)));
        }
        sink.write_all(&self.body).map_err(FetchError::Storage)
    }
}

/// Records every command and answers with a fixed exit code.
pub struct RecordingRunner {
    pub code: Option<i32>,
    pub commands: Vec<ComponentCommand>,
}

impl RecordingRunner {
    pub fn exiting(code: i32) -> Self {
        Self {
            code: Some(code),
            commands: Vec::new(),
        }
    }
}

impl ComponentRunner for RecordingRunner {
    fn run(&mut self, cmd: &ComponentCommand) -> io::Result<Option<i32>> {
        self.commands.push(cmd.clone());
        Ok(self.code)
    }
}

/// A gzip tarball laid out like the SDK release (`google-cloud-sdk/...`).
pub fn sdk_tarball() -> Vec<u8> {
    let files: [(&str, &[u8]); 3] = [
        ("google-cloud-sdk/bin/gcloud", b"#!/bin/sh\nexit 0\n"),
        ("google-cloud-sdk/VERSION", b"364.0.0\n"),
        (
            "google-cloud-sdk/platform/google_appengine/dev_appserver.py",
            b"print('ok')\n",
        ),
    ];
    let enc = GzEncoder::new(Vec::new(), Compression::fast());
    let mut builder = tar::Builder::new(enc);
    for (name, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, name, data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}
