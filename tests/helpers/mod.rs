//! Test helpers for building suite trees on disk and serving live HTTP
//! endpoints with tiny_http.

#![allow(dead_code)]

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding suite, include and test-definition files
pub struct SuiteTree {
    pub temp_dir: TempDir,
}

impl SuiteTree {
    pub fn new() -> Self {
        Self {
            temp_dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a file at a path relative to the tree root, creating parents
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }
}

/// What the test server saw for one request
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    /// First header value with the given name, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Capture method, URL, headers and body of an incoming request
pub fn record(request: &mut tiny_http::Request) -> RecordedRequest {
    let method = request.method().to_string();
    let url = request.url().to_string();
    let headers = request
        .headers()
        .iter()
        .map(|header| (header.field.to_string(), header.value.to_string()))
        .collect();
    let mut body = String::new();
    let _ = request.as_reader().read_to_string(&mut body);
    RecordedRequest {
        method,
        url,
        headers,
        body,
    }
}

/// A canned response the test server sends back
#[derive(Debug, Clone, Default)]
pub struct CannedResponse {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CannedResponse {
    pub fn status(status_code: u16) -> Self {
        Self {
            status_code,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }
}

/// Serve exactly `responses.len()` requests on an ephemeral local port,
/// answering them in order. Returns the base URL and a handle yielding the
/// recorded requests once the run is over.
pub fn serve(
    responses: Vec<CannedResponse>,
) -> (String, std::thread::JoinHandle<Vec<RecordedRequest>>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let base_url = format!("http://{addr}");

    let handle = std::thread::spawn(move || {
        let mut recorded = Vec::new();
        for canned in responses {
            let mut request = server.recv().unwrap();
            recorded.push(record(&mut request));
            let mut response =
                tiny_http::Response::from_string(canned.body).with_status_code(canned.status_code);
            for (key, value) in &canned.headers {
                let header =
                    tiny_http::Header::from_bytes(key.as_bytes(), value.as_bytes()).unwrap();
                response.add_header(header);
            }
            let _ = request.respond(response);
        }
        recorded
    });

    (base_url, handle)
}
