//! HTTP invocation module
//!
//! Owns the two fixed client configurations — TLS-verifying and
//! non-verifying — built once per run. Cookie handling stays manual (the
//! merger attaches the Cookie header, the evaluator stores Set-Cookie back
//! into the shared jar), so the clients keep their automatic cookie store
//! disabled. No retries and no timeout beyond the transport default; a
//! stalled call blocks the whole suite.

use crate::models::RunnerError;
use log::debug;
use reqwest::blocking::{Client, Request, Response};

/// Sends prepared requests over one of two fixed client configurations
pub struct Invoker {
    /// Client with full TLS certificate verification
    verifying: Client,
    /// Client that accepts invalid certificates, for `tlsInsecureSkipVerify`
    insecure: Client,
}

impl Invoker {
    /// Build both clients up front; the choice per request is only the
    /// TLS-verification flag.
    pub fn new() -> Result<Self, RunnerError> {
        let verifying = Client::builder().build()?;
        let insecure = Client::builder().danger_accept_invalid_certs(true).build()?;
        Ok(Self {
            verifying,
            insecure,
        })
    }

    /// Execute a prepared request, returning the raw response. Transport
    /// errors are reported to the caller and recorded on the test.
    pub fn send(&self, request: Request, skip_tls_verify: bool) -> Result<Response, reqwest::Error> {
        debug!("{} {}", request.method(), request.url());
        let client = if skip_tls_verify {
            &self.insecure
        } else {
            &self.verifying
        };
        client.execute(request)
    }
}
