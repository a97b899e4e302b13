//! Response evaluation module
//!
//! Inspects the captured response against the resolved expectations:
//! - read-once response capture (status, headers, cookies, body)
//! - response-header test cases, including jar-store population
//! - status code, status line and content type comparisons
//! - literal body comparison or JSON-schema validation
//!
//! Every check runs even after an earlier one fails; failures accumulate on
//! the test instead of short-circuiting.

use crate::jar::JarStore;
use crate::prepare::{CapturedResponse, ResolvedTest};
use reqwest::cookie::CookieStore;
use reqwest::header::{CONTENT_TYPE, SET_COOKIE};

/// Evaluate a resolved test's captured response against its expectations,
/// populating the jar store from header cases flagged `putInJar`.
pub fn evaluate(test: &mut ResolvedTest, jar_store: &mut JarStore) {
    read_response(test);
    evaluate_headers(test, jar_store);
    evaluate_status_code(test);
    evaluate_status(test);
    evaluate_content_type(test);
    evaluate_body(test);
}

/// Capture the live response exactly once: status, headers, Content-Type,
/// cookies into the shared jar, and the entire body. Subsequent calls on
/// the same test are no-ops and see the identical cached bytes.
fn read_response(test: &mut ResolvedTest) {
    if test.captured.is_some() {
        return;
    }
    let Some(response) = test.live.take() else {
        return;
    };

    let status = response.status();
    let status_line = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
    let headers = response.headers().clone();
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if test.cookies_enabled() {
        if let (Some(jar), Some(url)) = (&test.cookie_jar, &test.url) {
            let mut set_cookies = headers.get_all(SET_COOKIE).iter();
            jar.set_cookies(&mut set_cookies, url);
        }
    }

    let body = match response.bytes() {
        Ok(bytes) => bytes.to_vec(),
        Err(err) => {
            test.fail(format!("response body read error: {err}"));
            Vec::new()
        }
    };

    test.captured = Some(CapturedResponse {
        status_code: status.as_u16(),
        status_line,
        headers,
        content_type,
        body,
    });
}

/// Run every response-header test case. Population takes precedence over
/// validation: a present value that matches (or is unchecked) lands in the
/// jar store; otherwise `validate` decides whether a mismatch or missing
/// header is a failure.
fn evaluate_headers(test: &mut ResolvedTest, jar_store: &mut JarStore) {
    let Some(captured) = test.captured.take() else {
        return;
    };
    for case in &test.expect.headers {
        let live = captured
            .headers
            .get(case.key.as_str())
            .and_then(|value| value.to_str().ok());
        match live {
            Some(live) => {
                if case.put_in_jar && (case.value.is_empty() || live == case.value) {
                    jar_store.put(&case.key, live);
                } else if case.validate && live != case.value {
                    test.failures.push(format!(
                        "expect response header {} to equal {:?}, given {:?}",
                        case.key, case.value, live
                    ));
                }
            }
            None => {
                if case.validate {
                    test.failures
                        .push(format!("expect response header {} to be present", case.key));
                }
            }
        }
    }
    test.captured = Some(captured);
}

fn evaluate_status_code(test: &mut ResolvedTest) {
    let Some(captured) = test.captured.as_ref() else {
        return;
    };
    if test.expect.status_code != 0 && test.expect.status_code != captured.status_code {
        test.fail(format!(
            "expect status code to equal {}, given {}",
            test.expect.status_code, captured.status_code
        ));
    }
}

fn evaluate_status(test: &mut ResolvedTest) {
    let Some(captured) = test.captured.as_ref() else {
        return;
    };
    // Literal comparison, no case or whitespace normalization
    if !test.expect.status.is_empty() && test.expect.status != captured.status_line {
        test.fail(format!(
            "expect status to equal {:?}, given {:?}",
            test.expect.status, captured.status_line
        ));
    }
}

fn evaluate_content_type(test: &mut ResolvedTest) {
    let Some(captured) = test.captured.as_ref() else {
        return;
    };
    if !test.expect.content_type.is_empty() && test.expect.content_type != captured.content_type {
        test.fail(format!(
            "expect content type to equal {:?}, given {:?}",
            test.expect.content_type, captured.content_type
        ));
    }
}

/// Body checks only run when `bodyCheck` is set: a non-empty expected
/// literal body byte-compares, otherwise a schema document validates the
/// body as JSON with one failure per violation.
fn evaluate_body(test: &mut ResolvedTest) {
    if !test.expect.body_check {
        return;
    }
    let Some(captured) = test.captured.take() else {
        return;
    };
    if !test.expect.body_string.is_empty() {
        if captured.body != test.expect.body_string.as_bytes() {
            test.failures.push(format!(
                "expect response body to equal {:?}, given {:?}",
                test.expect.body_string,
                String::from_utf8_lossy(&captured.body)
            ));
        }
    } else if let Some(schema) = test.expect.body_json_schema.clone() {
        match jsonschema::validator_for(&schema) {
            Ok(validator) => match serde_json::from_slice::<serde_json::Value>(&captured.body) {
                Ok(instance) => {
                    for violation in validator.iter_errors(&instance) {
                        test.failures.push(format!("json schema expect {violation}"));
                    }
                }
                Err(err) => test.failures.push(format!("response json body error: {err}")),
            },
            Err(err) => test.failures.push(format!("response json schema error: {err}")),
        }
    }
    test.captured = Some(captured);
}
