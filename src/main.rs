#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use httpcheck::http::Invoker;
use httpcheck::models::TestSuite;
use httpcheck::suite::{SuiteOutcome, SuiteRunner};
use httpcheck::{cli, output};
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

fn main() -> ExitCode {
    output::print_banner();

    let config = cli::parse_args();
    let Some(suite_path) = config.suite_path else {
        cli::print_usage();
        return ExitCode::SUCCESS;
    };

    match run(&suite_path) {
        Ok(SuiteOutcome::Completed { .. }) => ExitCode::SUCCESS,
        Ok(SuiteOutcome::FirstPhaseAborted) => ExitCode::FAILURE,
        Err(err) => {
            output::print_fatal(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(suite_path: &Path) -> Result<SuiteOutcome> {
    let text = fs::read_to_string(suite_path)
        .with_context(|| format!("failed to read suite file {}", suite_path.display()))?;
    let suite = TestSuite::from_json(&text, suite_path)?;

    // Interrupts are only honored between tests; an in-flight call blocks
    let interrupted = Arc::new(AtomicBool::new(false));
    let _ = signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&interrupted));
    let _ = signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&interrupted));

    let invoker = Invoker::new()?;
    let runner = SuiteRunner::new(suite, invoker, interrupted);
    Ok(runner.run()?)
}
