//! Test preparation module
//!
//! Merges a concrete test definition with the suite's default template into
//! a resolved, executable test:
//! - field-by-field fallback for method and URL components
//! - request-header inheritance with jar-store substitution
//! - response-expectation inheritance (content type, header cases)
//! - cookie-jar participation policy (opt-out beats opt-in)
//!
//! Merge precedence is always "concrete value wins, template value is
//! fallback", per field, never whole-object replacement. Preparation
//! problems (missing request, method or URL) mark the test failed without
//! touching the network.

use crate::jar::JarStore;
use crate::models::{RequestHeader, RequestSpec, ResponseSpec, TestDefinition, UrlParts};
use reqwest::blocking::{Request, Response};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use reqwest::{Method, Url};
use std::sync::Arc;

/// The prepared default template plus the suite-wide cookie jar it owns.
///
/// The template itself is never executed; preparing it only allocates the
/// fresh cookie jar that descendants share by reference.
pub struct Defaults {
    /// The suite's `default` entry (empty template when the suite has none)
    pub template: TestDefinition,
    /// Canonical cookie jar instance, shared with every opted-in test
    pub cookie_jar: Arc<Jar>,
}

impl Defaults {
    /// Prepare the default template: allocate the suite cookie jar and stop.
    pub fn prepare(template: Option<TestDefinition>) -> Self {
        Self {
            template: template.unwrap_or_default(),
            cookie_jar: Arc::new(Jar::default()),
        }
    }
}

/// Response data captured exactly once after invocation
pub struct CapturedResponse {
    pub status_code: u16,
    /// Rendered status line, e.g. "200 OK"
    pub status_line: String,
    pub headers: HeaderMap,
    /// First Content-Type value on the live response
    pub content_type: String,
    pub body: Vec<u8>,
}

/// A test definition fully merged with the default template and ready to
/// execute. Owned by the scheduler for the duration of one test's run;
/// cookie-jar and jar-store side effects outlive it.
pub struct ResolvedTest {
    pub label: String,
    pub skip_tls_verify: bool,
    /// Built outgoing request; consumed by the invoker
    pub request: Option<Request>,
    /// Fully merged target URL
    pub url: Option<Url>,
    /// Snapshot of the outgoing headers, kept for debug dumps
    pub sent_headers: HeaderMap,
    pub body_string: String,
    pub body_json: Option<serde_json::Value>,
    /// Merged response expectations
    pub expect: ResponseSpec,
    pub use_cookie_jar: bool,
    pub no_cookie_jar: bool,
    /// Shared suite jar, attached when cookie participation is on
    pub cookie_jar: Option<Arc<Jar>>,
    pub print_debug_on_fail: bool,
    pub print_json_indented: bool,
    /// Raw transport response, present between invocation and capture
    pub live: Option<Response>,
    /// Read-once capture of the response; later reads are no-ops
    pub captured: Option<CapturedResponse>,
    /// Accumulated failure descriptions across prepare/send/evaluate
    pub failures: Vec<String>,
}

impl ResolvedTest {
    fn new(label: String) -> Self {
        Self {
            label,
            skip_tls_verify: false,
            request: None,
            url: None,
            sent_headers: HeaderMap::new(),
            body_string: String::new(),
            body_json: None,
            expect: ResponseSpec::default(),
            use_cookie_jar: false,
            no_cookie_jar: false,
            cookie_jar: None,
            print_debug_on_fail: false,
            print_json_indented: false,
            live: None,
            captured: None,
            failures: Vec::new(),
        }
    }

    /// Record one failure description; checks never short-circuit
    pub fn fail(&mut self, description: impl Into<String>) {
        self.failures.push(description.into());
    }

    /// A test passes iff nothing failed across its whole lifecycle
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether this test reads and writes the shared cookie jar
    pub fn cookies_enabled(&self) -> bool {
        self.use_cookie_jar && !self.no_cookie_jar
    }
}

/// Merge a concrete test with the prepared defaults into a resolved test.
/// Jar-store substitution happens here, so values stored by earlier tests
/// are visible to this one.
pub fn prepare(test: &TestDefinition, defaults: &Defaults, jar_store: &JarStore) -> ResolvedTest {
    let mut resolved = ResolvedTest::new(test.label.clone());
    resolved.use_cookie_jar = test.use_cookie_jar;
    resolved.no_cookie_jar = test.no_cookie_jar;
    resolved.print_debug_on_fail = test.print_debug_on_fail;
    resolved.print_json_indented = test.print_json_indented;

    // Debug flags propagate only if set on the default; true never downgrades
    if defaults.template.print_debug_on_fail {
        resolved.print_debug_on_fail = true;
        if defaults.template.print_json_indented {
            resolved.print_json_indented = true;
        }
    }

    let Some(request_spec) = test.request.as_ref() else {
        resolved.fail("request missing");
        return resolved;
    };
    let default_request = defaults.template.request.as_ref();

    let mut method_name = request_spec.method.clone();
    if method_name.is_empty() {
        if let Some(default_request) = default_request {
            method_name = default_request.method.clone();
        }
    }
    if method_name.is_empty() {
        resolved.fail("request method missing");
    }

    let url = merge_url(request_spec, default_request, &mut resolved);

    // Cookie participation: opt-out short-circuits, the default's opt-in
    // forces the test's on, and the attached jar is the default's instance
    if !resolved.no_cookie_jar {
        if defaults.template.use_cookie_jar {
            resolved.use_cookie_jar = true;
        }
        if resolved.use_cookie_jar {
            resolved.cookie_jar = Some(Arc::clone(&defaults.cookie_jar));
        }
    }

    resolved.expect = merge_expectations(test.response.clone(), defaults.template.response.as_ref());

    resolved.body_string = request_spec.body_string.clone();
    resolved.body_json = request_spec.body_json.clone();
    let mut body_bytes: Option<Vec<u8>> = None;
    if !request_spec.body_string.is_empty() {
        body_bytes = Some(request_spec.body_string.clone().into_bytes());
    } else if let Some(body_json) = &request_spec.body_json {
        match serde_json::to_vec(body_json) {
            Ok(bytes) => body_bytes = Some(bytes),
            Err(err) => resolved.fail(format!("request body error: {err}")),
        }
    }

    if let Some(url) = url.clone() {
        if !method_name.is_empty() {
            match Method::from_bytes(method_name.as_bytes()) {
                Ok(method) => {
                    build_request(&mut resolved, request_spec, default_request, jar_store, method, url, body_bytes)
                }
                Err(err) => resolved.fail(format!("request method invalid: {err}")),
            }
        }
    }
    resolved.url = url;
    resolved
}

/// Merge URL components field-by-field. The default's credentials and
/// TLS-skip flag ride along only when the host itself is inherited.
fn merge_url(
    request_spec: &RequestSpec,
    default_request: Option<&RequestSpec>,
    resolved: &mut ResolvedTest,
) -> Option<Url> {
    let mut parts = request_spec.url.clone().unwrap_or_default();
    let mut user = String::new();
    let mut password = String::new();
    if let Some(info) = &request_spec.url_user_info {
        if !info.user.is_empty() {
            user = info.user.clone();
            password = info.password.clone();
        }
    }
    resolved.skip_tls_verify = request_spec.tls_insecure_skip_verify;

    if let Some(default_request) = default_request {
        let default_parts = default_request.url.clone().unwrap_or_default();
        if parts.scheme.is_empty() {
            parts.scheme = default_parts.scheme;
        }
        if parts.opaque.is_empty() {
            parts.opaque = default_parts.opaque;
        }
        if parts.host.is_empty() {
            if user.is_empty() {
                if let Some(info) = &default_request.url_user_info {
                    user = info.user.clone();
                    password = info.password.clone();
                }
            }
            parts.host = default_parts.host;
            if default_request.tls_insecure_skip_verify {
                resolved.skip_tls_verify = true;
            }
        }
        if parts.path.is_empty() {
            parts.path = default_parts.path;
        }
        if parts.query.is_empty() {
            parts.query = default_parts.query;
        }
        if parts.fragment.is_empty() {
            parts.fragment = default_parts.fragment;
        }
    }

    let serialized = serialize_url(&parts, &user, &password);
    if serialized.is_empty() {
        resolved.fail("request url missing");
        return None;
    }
    match Url::parse(&serialized) {
        Ok(url) => Some(url),
        Err(err) => {
            resolved.fail(format!("request url invalid: {err}"));
            None
        }
    }
}

/// Serialize merged URL components back into a single URL string
fn serialize_url(parts: &UrlParts, user: &str, password: &str) -> String {
    if !parts.opaque.is_empty() {
        let mut out = String::new();
        if !parts.scheme.is_empty() {
            out.push_str(&parts.scheme);
            out.push(':');
        }
        out.push_str(&parts.opaque);
        if !parts.query.is_empty() {
            out.push('?');
            out.push_str(&parts.query);
        }
        if !parts.fragment.is_empty() {
            out.push('#');
            out.push_str(&parts.fragment);
        }
        return out;
    }

    let mut out = String::new();
    if !parts.scheme.is_empty() {
        out.push_str(&parts.scheme);
        out.push_str("://");
    }
    if !user.is_empty() {
        out.push_str(user);
        if !password.is_empty() {
            out.push(':');
            out.push_str(password);
        }
        out.push('@');
    }
    out.push_str(&parts.host);
    if !parts.path.is_empty() {
        if !parts.path.starts_with('/') {
            out.push('/');
        }
        out.push_str(&parts.path);
    }
    if !parts.query.is_empty() {
        out.push('?');
        out.push_str(&parts.query);
    }
    if !parts.fragment.is_empty() {
        out.push('#');
        out.push_str(&parts.fragment);
    }
    out
}

/// Merge response expectations: the default's content type fills an empty
/// one, and default header cases whose key the test does not already cover
/// are appended, unless suppressed.
fn merge_expectations(
    response: Option<ResponseSpec>,
    default_response: Option<&ResponseSpec>,
) -> ResponseSpec {
    let mut expect = response.unwrap_or_default();
    if let Some(default_response) = default_response {
        if expect.content_type.is_empty() {
            expect.content_type = default_response.content_type.clone();
        }
        if !expect.no_default_headers {
            for case in &default_response.headers {
                let covered = expect
                    .headers
                    .iter()
                    .any(|own| own.key.eq_ignore_ascii_case(&case.key));
                if !covered {
                    expect.headers.push(case.clone());
                }
            }
        }
    }
    expect
}

/// Build the outgoing request: own headers first, then the default's unless
/// suppressed, jar-store substitution, cookies from the shared jar, body.
fn build_request(
    resolved: &mut ResolvedTest,
    request_spec: &RequestSpec,
    default_request: Option<&RequestSpec>,
    jar_store: &JarStore,
    method: Method,
    url: Url,
    body_bytes: Option<Vec<u8>>,
) {
    let mut request = Request::new(method, url.clone());

    let mut header_list: Vec<RequestHeader> = request_spec.headers.clone();
    if !request_spec.no_default_headers {
        if let Some(default_request) = default_request {
            header_list.extend(default_request.headers.iter().cloned());
        }
    }
    for header in &mut header_list {
        if header.use_from_jar {
            if let Some(value) = jar_store.get(&header.key) {
                header.value = value.to_string();
            }
        }
    }
    for header in &header_list {
        match (
            HeaderName::from_bytes(header.key.as_bytes()),
            HeaderValue::from_str(&header.value),
        ) {
            (Ok(name), Ok(value)) => {
                request.headers_mut().append(name, value);
            }
            _ => resolved.fail(format!("request header invalid: {}", header.key)),
        }
    }

    if let Some(jar) = &resolved.cookie_jar {
        if let Some(cookie_header) = jar.cookies(&url) {
            request.headers_mut().insert(COOKIE, cookie_header);
        }
    }

    if let Some(bytes) = body_bytes {
        *request.body_mut() = Some(bytes.into());
    }

    resolved.sent_headers = request.headers().clone();
    resolved.request = Some(request);
}
