//! httpcheck - Declarative HTTP API Test Runner
//!
//! Test cases are described as data (method, URL, headers, body, expected
//! status/headers/body/schema) rather than as imperative code. The runner
//! expands a suite's include tree into an ordered test list, merges every
//! test with the suite's default template, executes the tests sequentially
//! against a live endpoint and reports pass/fail with a summary.
//!
//! This library exposes the core modules so the binary and the integration
//! tests share one implementation.

#![forbid(unsafe_code)]

pub mod cli;
pub mod constants;
pub mod evaluate;
pub mod http;
pub mod includes;
pub mod jar;
pub mod models;
pub mod output;
pub mod prepare;
pub mod suite;
