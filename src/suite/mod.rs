//! Suite scheduling module
//!
//! Drives the full ordered test list as a linear state machine:
//! resolve includes -> prepare default -> first -> main -> last -> done.
//! The first phase is fail-fast (its tests establish preconditions later
//! tests depend on); main and last are fail-soft. One test's complete
//! lifecycle (prepare, send, wait, evaluate) finishes before the next
//! begins, which is what makes the shared cookie jar and jar store safe
//! without locking.

use crate::evaluate;
use crate::http::Invoker;
use crate::includes;
use crate::jar::JarStore;
use crate::models::{RunnerError, TestDefinition, TestSuite};
use crate::output;
use crate::output::progress::ProgressLine;
use crate::prepare::{self, Defaults};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// How a full suite run ended
pub enum SuiteOutcome {
    /// All phases ran (soft failures allowed); process exits 0
    Completed {
        executed: usize,
        total: usize,
        passed: usize,
        failed: usize,
        interrupted: bool,
    },
    /// A first-phase test failed; main and last never ran, process exits 1
    FirstPhaseAborted,
}

/// Orchestrates one suite run and owns every shared resource: the jar
/// store, the HTTP clients and the running counters
pub struct SuiteRunner {
    suite: TestSuite,
    invoker: Invoker,
    jar_store: JarStore,
    interrupted: Arc<AtomicBool>,
    executed: usize,
    passed: usize,
    failed: usize,
    total: usize,
}

impl SuiteRunner {
    pub fn new(suite: TestSuite, invoker: Invoker, interrupted: Arc<AtomicBool>) -> Self {
        Self {
            suite,
            invoker,
            jar_store: JarStore::new(),
            interrupted,
            executed: 0,
            passed: 0,
            failed: 0,
            total: 0,
        }
    }

    /// Run every phase in order. Fatal errors (unresolvable includes,
    /// unreadable files) abort before any test executes.
    pub fn run(mut self) -> Result<SuiteOutcome, RunnerError> {
        let main_tests = includes::resolve(&self.suite.base_dir, &self.suite.includes)?;
        let first = std::mem::take(&mut self.suite.first);
        let last = std::mem::take(&mut self.suite.last);
        self.total = first.len() + main_tests.len() + last.len();

        let defaults = Defaults::prepare(self.suite.default.clone());
        let mut progress = ProgressLine::new();
        progress.render(0, self.total, 0, None);
        let started = Instant::now();
        let mut interrupted = false;

        for test in &first {
            if self.stop_requested(&mut interrupted) {
                break;
            }
            if !self.run_test(test, &defaults, started, &mut progress) {
                output::print_first_phase_abort();
                return Ok(SuiteOutcome::FirstPhaseAborted);
            }
        }
        for test in &main_tests {
            if self.stop_requested(&mut interrupted) {
                break;
            }
            self.run_test(test, &defaults, started, &mut progress);
        }
        for test in &last {
            if self.stop_requested(&mut interrupted) {
                break;
            }
            self.run_test(test, &defaults, started, &mut progress);
        }

        progress.finish(
            self.executed,
            self.total,
            self.passed,
            self.failed,
            started.elapsed(),
            interrupted,
        );
        Ok(SuiteOutcome::Completed {
            executed: self.executed,
            total: self.total,
            passed: self.passed,
            failed: self.failed,
            interrupted,
        })
    }

    /// Checked between tests only; a stalled network call is never cancelled
    fn stop_requested(&self, interrupted: &mut bool) -> bool {
        if self.interrupted.load(Ordering::Relaxed) {
            *interrupted = true;
        }
        *interrupted
    }

    /// One test's full lifecycle: prepare, send, evaluate, report, count
    fn run_test(
        &mut self,
        definition: &TestDefinition,
        defaults: &Defaults,
        started: Instant,
        progress: &mut ProgressLine,
    ) -> bool {
        let mut test = prepare::prepare(definition, defaults, &self.jar_store);
        if test.passed() {
            if let Some(request) = test.request.take() {
                match self.invoker.send(request, test.skip_tls_verify) {
                    Ok(response) => {
                        test.live = Some(response);
                        evaluate::evaluate(&mut test, &mut self.jar_store);
                    }
                    Err(err) => test.fail(format!("request error: {err}")),
                }
            }
        }

        let ok = test.passed();
        self.executed += 1;
        if ok {
            self.passed += 1;
        } else {
            self.failed += 1;
            output::print_failure_block(&test);
            if test.print_debug_on_fail {
                output::print_debug_dump(&test);
            }
        }
        progress.render(self.executed, self.total, self.failed, Some(started.elapsed()));
        ok
    }
}
