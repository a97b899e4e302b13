//! Live progress line for suite execution
//!
//! Re-renders a single carriage-return line after every test: executed
//! count, total, failure count so far and elapsed wall-clock time since the
//! first test began. The final render turns green when everything passed
//! and is followed by the run summary.

use std::io::Write;
use std::time::Duration;
use termcolor::{Color, ColorSpec, StandardStream, WriteColor};

/// Single-line progress indicator, re-rendered in place after each test
pub struct ProgressLine {
    stream: StandardStream,
}

impl ProgressLine {
    pub fn new() -> Self {
        Self {
            stream: StandardStream::stdout(super::stdout_color_choice()),
        }
    }

    /// Rewrite the progress line with the current counters
    pub fn render(&mut self, executed: usize, total: usize, failed: usize, elapsed: Option<Duration>) {
        let _ = write!(self.stream, "\r");
        let _ = self
            .stream
            .set_color(ColorSpec::new().set_fg(Some(Color::White)).set_bold(true));
        let _ = write!(self.stream, "Executed {executed} of {total}");
        let _ = self.stream.reset();
        if failed > 0 {
            let _ = self
                .stream
                .set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
            let _ = write!(self.stream, " ({failed} FAILED)");
            let _ = self.stream.reset();
        }
        if let Some(elapsed) = elapsed {
            let _ = write!(self.stream, " ({})", format_elapsed(elapsed));
        }
        let _ = self.stream.flush();
    }

    /// Final render plus the run summary line
    pub fn finish(
        &mut self,
        executed: usize,
        total: usize,
        passed: usize,
        failed: usize,
        elapsed: Duration,
        interrupted: bool,
    ) {
        if failed == 0 && executed == total {
            let _ = write!(self.stream, "\r");
            let _ = self
                .stream
                .set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
            let _ = write!(self.stream, "Executed {executed} of {total}");
            let _ = self.stream.reset();
            let _ = write!(self.stream, " ({})", format_elapsed(elapsed));
        }
        let _ = writeln!(self.stream);
        let mut summary = format!(
            "{executed} of {total} executed, {passed} passed, {failed} failed"
        );
        if interrupted {
            summary.push_str(" (interrupted)");
        }
        let _ = writeln!(self.stream, "{summary}");
        let _ = self.stream.flush();
    }
}

impl Default for ProgressLine {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a duration the way the summary expects: milliseconds below one
/// second, two-decimal seconds above
fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs_f64();
    if seconds < 1.0 {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{seconds:.2}s")
    }
}
