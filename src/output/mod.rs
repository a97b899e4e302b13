//! Console output module
//!
//! Handles:
//! - Version banner
//! - Per-failure multi-line diagnostic blocks
//! - Verbose request/response dumps for tests flagged `printDebugOnFail`
//! - Fatal error reporting
//!
//! Presentation only: a failure must be visibly distinguishable from a pass
//! and must carry the failing test's label plus every failure description.

use crate::prepare::ResolvedTest;
use std::io::{IsTerminal, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub mod progress;

/// Resolve the color choice for stdout: honor colors only when stdout is an
/// actual terminal. `ColorChoice::Auto` alone consults `TERM` but not whether
/// the stream is a tty, so plain pipes would otherwise receive escape codes.
pub(crate) fn stdout_color_choice() -> ColorChoice {
    if std::io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Print the version banner; runs before anything else on every invocation
pub fn print_banner() {
    println!("v{}", crate::constants::VERSION);
}

/// Print a fatal error in red on stderr
pub fn print_fatal(message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = writeln!(stderr, "{message}");
    let _ = stderr.reset();
}

/// Announce a failed test: bold red FAILED plus the label, then every
/// accumulated failure description on its own line. Starts with a newline
/// because the progress line holds the cursor mid-line.
pub fn print_failure_block(test: &ResolvedTest) {
    let mut stdout = StandardStream::stdout(stdout_color_choice());
    let _ = writeln!(stdout);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(stdout, "FAILED");
    let _ = stdout.reset();
    let _ = writeln!(stdout, " {}", test.label);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
    for description in &test.failures {
        let _ = writeln!(stdout, "  {description}");
    }
    let _ = stdout.reset();
    let _ = stdout.flush();
}

/// Announce the fail-fast abort of the first phase
pub fn print_first_phase_abort() {
    let mut stdout = StandardStream::stdout(stdout_color_choice());
    let _ = writeln!(stdout);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = writeln!(
        stdout,
        "one of the first tests failed, not continuing with the remaining tests"
    );
    let _ = stdout.reset();
    let _ = stdout.flush();
}

/// Dump the outgoing request and the captured response of a failed test
pub fn print_debug_dump(test: &ResolvedTest) {
    let mut stdout = StandardStream::stdout(stdout_color_choice());

    section(&mut stdout, "DEBUG REQUEST");
    let url = test
        .url
        .as_ref()
        .map(|url| url.as_str().to_string())
        .unwrap_or_default();
    field(&mut stdout, "URL", &url);
    field(&mut stdout, "Headers", &format!("{:?}", test.sent_headers));
    let body = request_body_text(test);
    field(&mut stdout, "Body", &body);

    section(&mut stdout, "DEBUG RESPONSE");
    match &test.captured {
        Some(captured) => {
            field(&mut stdout, "Headers", &format!("{:?}", captured.headers));
            field(&mut stdout, "Status code", &captured.status_code.to_string());
            field(&mut stdout, "Status", &captured.status_line);
            field(&mut stdout, "Body", &response_body_text(test));
        }
        None => {
            let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
            let _ = writeln!(stdout, "  no response");
            let _ = stdout.reset();
        }
    }
    let _ = stdout.flush();
}

fn section(stdout: &mut StandardStream, title: &str) {
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = writeln!(stdout, "{title}");
    let _ = stdout.reset();
}

fn field(stdout: &mut StandardStream, key: &str, value: &str) {
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
    let _ = write!(stdout, "  {key}");
    let _ = stdout.reset();
    let _ = writeln!(stdout, ": {value}");
}

fn request_body_text(test: &ResolvedTest) -> String {
    if !test.body_string.is_empty() {
        return test.body_string.clone();
    }
    match &test.body_json {
        Some(body_json) if test.print_json_indented => {
            serde_json::to_string_pretty(body_json).unwrap_or_else(|err| err.to_string())
        }
        Some(body_json) => serde_json::to_string(body_json).unwrap_or_else(|err| err.to_string()),
        None => String::new(),
    }
}

fn response_body_text(test: &ResolvedTest) -> String {
    let Some(captured) = &test.captured else {
        return String::new();
    };
    let raw = String::from_utf8_lossy(&captured.body).into_owned();
    if test.print_json_indented && captured.content_type.to_lowercase().starts_with("application/json") {
        if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&captured.body) {
            return serde_json::to_string_pretty(&value).unwrap_or(raw);
        }
    }
    raw
}
