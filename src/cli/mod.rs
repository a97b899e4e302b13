//! CLI argument parsing module
//!
//! Handles the command-line interface using clap:
//! - Single positional argument naming the suite-definition file
//! - Help and version commands
//! - Usage text for empty invocations (which exit 0 by contract)

use clap::{Arg, Command};
use std::path::PathBuf;

/// Configuration for one runner invocation
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Path to the top-level suite-definition file; absent means usage-only
    pub suite_path: Option<PathBuf>,
}

fn command() -> Command {
    Command::new("httpcheck")
        .version(crate::constants::VERSION)
        .long_version(Box::leak(
            format!(
                "{} ({})",
                crate::constants::VERSION,
                crate::constants::GIT_HASH
            )
            .into_boxed_str(),
        ) as &'static str)
        .about("Declarative HTTP API test runner")
        .long_about(
            "httpcheck executes JSON-described HTTP API test suites against a live \
             endpoint: requests are built from declarative test definitions, responses \
             are checked against expected status, headers, body or JSON schema, and the \
             run ends with a pass/fail summary.",
        )
        .arg(
            Arg::new("suite")
                .value_name("SUITE")
                .help("Path to the test suite definition file"),
        )
}

/// Parse command line arguments; an empty-string argument counts as absent
pub fn parse_args() -> RunConfig {
    let matches = command().get_matches();
    let suite_path = matches
        .get_one::<String>("suite")
        .filter(|path| !path.is_empty())
        .map(PathBuf::from);
    RunConfig { suite_path }
}

/// Print the usage text shown when no suite file is given
pub fn print_usage() {
    let mut cmd = command();
    let _ = cmd.print_help();
    println!();
}
