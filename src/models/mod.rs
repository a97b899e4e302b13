//! Data models module
//!
//! Defines the on-disk suite format and core data structures:
//! - TestSuite: top-level suite file (default template, first/includes/last)
//! - TestDefinition: a single test as authored, every field optional
//! - RequestSpec / ResponseSpec: request descriptor and response expectations
//! - UrlParts: a URL as independent components, merged field-by-field
//! - RunnerError: fatal error taxonomy (per-test failures are not errors)
//!
//! All wire structures deserialize with serde; absent fields mean "inherit
//! from the default template" where inheritance is defined, otherwise
//! "unset/unchecked".

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level suite file: a default template, a fail-fast `first` phase, an
/// include tree forming the main phase, and a fail-soft `last` phase.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TestSuite {
    /// Template supplying inheritable fallback values; never executed itself
    pub default: Option<TestDefinition>,
    /// Tests run first; the first failure aborts the whole run
    pub first: Vec<TestDefinition>,
    /// Paths (relative to the suite file) expanded into the main test list
    pub includes: Vec<String>,
    /// Tests run last, even after main-phase failures
    pub last: Vec<TestDefinition>,
    /// Directory the include paths resolve against (the suite file's parent)
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl TestSuite {
    /// Parse a suite file. Valid JSON of the wrong top-level type yields an
    /// empty suite; malformed JSON is a fatal [`RunnerError::Config`].
    pub fn from_json(text: &str, path: &Path) -> Result<Self, RunnerError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|source| RunnerError::Config {
                path: path.to_path_buf(),
                source,
            })?;
        let mut suite: TestSuite = serde_json::from_value(value).unwrap_or_default();
        suite.base_dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        Ok(suite)
    }
}

/// A single test as authored in a suite or test-definition file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestDefinition {
    /// Human-readable name used in failure reporting
    pub label: String,
    /// Request descriptor; a test without one fails before any network call
    pub request: Option<RequestSpec>,
    /// Response expectations; absent means nothing is checked
    pub response: Option<ResponseSpec>,
    /// Opt into the suite-wide shared cookie jar
    pub use_cookie_jar: bool,
    /// Opt out of cookies entirely; takes precedence over any opt-in
    #[serde(alias = "NoCookieJar")]
    pub no_cookie_jar: bool,
    /// Dump the outgoing request and captured response when the test fails
    pub print_debug_on_fail: bool,
    /// Pretty-print JSON bodies in debug dumps
    pub print_json_indented: bool,
}

/// Request descriptor: method, URL parts, headers and body
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestSpec {
    /// HTTP method; empty inherits the default template's
    pub method: String,
    /// Target URL as independent parts, each falling back to the default's
    pub url: Option<UrlParts>,
    /// Credentials embedded into the URL before the fallback merge
    pub url_user_info: Option<UrlUserInfo>,
    /// Skip TLS certificate verification for this request
    pub tls_insecure_skip_verify: bool,
    /// Suppress inheriting the default template's request headers
    pub no_default_headers: bool,
    /// Outgoing headers, in order, with multi-value append semantics
    pub headers: Vec<RequestHeader>,
    /// Literal request body; wins over `bodyJson` when both are set
    pub body_string: String,
    /// Structured JSON body, serialized to bytes at prepare time
    pub body_json: Option<serde_json::Value>,
}

/// A URL split into its components so each one can be inherited independently
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UrlParts {
    pub scheme: String,
    pub opaque: String,
    pub host: String,
    pub path: String,
    #[serde(alias = "rawQuery")]
    pub query: String,
    pub fragment: String,
}

impl UrlParts {
    /// True when every component is empty, i.e. the URL serializes to ""
    pub fn is_empty(&self) -> bool {
        self.scheme.is_empty()
            && self.opaque.is_empty()
            && self.host.is_empty()
            && self.path.is_empty()
            && self.query.is_empty()
            && self.fragment.is_empty()
    }
}

/// Explicit user credentials applied to the request URL
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UrlUserInfo {
    pub user: String,
    pub password: String,
}

/// An outgoing request header
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestHeader {
    pub key: String,
    pub value: String,
    /// Replace the value with the jar store's entry for `key` when present
    pub use_from_jar: bool,
}

/// Response expectations checked by the evaluator
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResponseSpec {
    /// Expected status line, compared literally (e.g. "200 OK")
    pub status: String,
    /// Expected status code; zero means unchecked
    pub status_code: u16,
    /// Expected Content-Type; empty inherits the default template's
    pub content_type: String,
    /// Suppress inheriting the default template's response header cases
    pub no_default_headers: bool,
    /// Per-header test cases driving validation and jar population
    pub headers: Vec<HeaderTestCase>,
    /// Master switch for body checking
    pub body_check: bool,
    /// Expected literal body, byte-compared when non-empty
    pub body_string: String,
    /// JSON schema the body must validate against when `bodyString` is empty
    pub body_json_schema: Option<serde_json::Value>,
}

/// A response-header test case: asserts on the live value and/or copies it
/// into the jar store for later tests to send
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderTestCase {
    pub key: String,
    /// Expected value; empty means the value itself is unchecked
    pub value: String,
    /// Assert that the header is present and matches `value`
    pub validate: bool,
    /// Store the live value in the jar store; wins over validation on match
    pub put_in_jar: bool,
}

/// Fatal errors that terminate the run. Failures scoped to one test
/// (preparation, network, assertion, schema) are accumulated on the test
/// instead and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Malformed JSON in a suite, include or test-definition file
    #[error("{}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Missing or unreadable path during include resolution
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The HTTP client itself could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
