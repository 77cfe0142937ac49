//! Outcome types for property runs and human-readable failure reports.
//!
//! A property failure is the only error a run can end in. It carries the
//! property's message, the failing input as first generated, and the minimal
//! input the shrink search reduced it to.

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use crate::config::TestConfig;
use crate::shrink::ShrinkResult;

/// Result of a property run
pub type PropertyResult<T> = Result<TestSuccess<T>, TestFailure<T>>;

/// Information about a successful run
#[derive(Debug, Clone)]
pub struct TestSuccess<T> {
    /// Number of trials that passed
    pub trials: usize,
    /// Seed the run was generated from
    pub seed: u64,
    /// Configuration used
    pub config: TestConfig,
    /// Total time spent on the run
    pub test_duration: Duration,
    _phantom: PhantomData<T>,
}

impl<T> TestSuccess<T> {
    /// Create a new TestSuccess instance
    pub fn new(trials: usize, seed: u64, config: TestConfig, test_duration: Duration) -> Self {
        Self {
            trials,
            seed,
            config,
            test_duration,
            _phantom: PhantomData,
        }
    }
}

/// Information about a failed run
#[derive(Debug, Clone, thiserror::Error)]
#[error("Property failed: {message} (minimal input: {minimal_input:?}, trial {failed_trial}, seed {seed})")]
pub struct TestFailure<T> {
    /// Message returned by the property for the original input
    pub message: String,
    /// Input that first failed
    pub original_input: T,
    /// Smallest failing input the shrink search found
    pub minimal_input: T,
    /// Number of accepted shrinking steps
    pub shrink_steps: usize,
    /// Property evaluations spent while shrinking
    pub shrink_evaluations: usize,
    /// Whether shrinking reached a fixpoint rather than the step cap
    pub shrink_completed: bool,
    /// Zero-based trial on which the failure occurred
    pub failed_trial: usize,
    /// Seed that reproduces this run
    pub seed: u64,
    /// Configuration used
    pub config: TestConfig,
    /// Total time spent on the run
    pub test_duration: Duration,
    /// Time spent on shrinking
    pub shrink_duration: Duration,
}

impl<T> TestFailure<T> {
    /// Assemble a failure from the failing trial and its shrink result
    pub fn from_shrink(
        message: String,
        shrink: ShrinkResult<T>,
        failed_trial: usize,
        seed: u64,
        config: TestConfig,
        test_duration: Duration,
    ) -> Self {
        Self {
            message,
            original_input: shrink.original,
            minimal_input: shrink.minimal,
            shrink_steps: shrink.shrink_steps,
            shrink_evaluations: shrink.evaluations,
            shrink_completed: shrink.completed,
            failed_trial,
            seed,
            config,
            test_duration,
            shrink_duration: shrink.shrink_duration,
        }
    }

    /// The minimized counterexample
    pub fn minimal(&self) -> &T {
        &self.minimal_input
    }

    /// Get a detailed report of the failure
    pub fn detailed_report(&self) -> String
    where
        T: fmt::Debug,
    {
        let mut report = String::new();

        report.push_str(&format!(
            "Property failed on trial {}\n",
            self.failed_trial + 1
        ));
        report.push_str(&format!("Error: {}\n", self.message));
        report.push_str(&format!("Original input: {:?}\n", self.original_input));

        if self.shrink_steps > 0 {
            report.push_str(&format!("Minimal input: {:?}\n", self.minimal_input));
            report.push_str(&format!("Shrinking steps: {}\n", self.shrink_steps));
        } else {
            report.push_str("No smaller failing input found\n");
        }
        if !self.shrink_completed {
            report.push_str("Shrinking stopped at the step cap\n");
        }

        report.push_str(&format!("Shrinking time: {:?}\n", self.shrink_duration));
        report.push_str(&format!("Total test time: {:?}\n", self.test_duration));
        report.push_str(&format!(
            "Test configuration: trials={}, seed={}\n",
            self.config.trials, self.seed
        ));

        report
    }

    /// Get a concise summary of the failure
    pub fn summary(&self) -> String
    where
        T: fmt::Debug,
    {
        format!(
            "{:?} did not satisfy the property: {}\nMinimal failure case: {:?}",
            self.original_input, self.message, self.minimal_input
        )
    }
}

/// Formats run outcomes for the console
#[derive(Debug, Clone, Default)]
pub struct ErrorReporter {
    pub verbose: bool,
    pub show_config: bool,
}

impl ErrorReporter {
    /// Create a new error reporter with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable verbose output mode
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Enable configuration display
    pub fn show_config(mut self) -> Self {
        self.show_config = true;
        self
    }

    /// Report for a failed run, honoring the verbosity setting
    pub fn format<T: fmt::Debug>(&self, failure: &TestFailure<T>) -> String {
        if self.verbose {
            self.format_failure(failure)
        } else {
            self.format_summary(failure)
        }
    }

    /// Generate a comprehensive failure report
    pub fn format_failure<T: fmt::Debug>(&self, failure: &TestFailure<T>) -> String {
        let mut report = String::new();

        report.push_str("=== PROPERTY TEST FAILURE ===\n");
        report.push_str(&failure.detailed_report());

        if self.show_config {
            let config = &failure.config;
            report.push_str(&format!(
                "Shrink budget: {}, retry budget: {}, max shrink steps: {}\n",
                config.effective_shrink_budget(),
                config.retry_budget,
                config.max_shrink_steps
            ));
            report.push_str(&format!(
                "Generator: max_length={}, char_range={:?}\n",
                config.generator_config.max_length, config.generator_config.char_range
            ));
        }

        report.push_str(&format!(
            "Reproduce with seed {}\n",
            failure.seed
        ));
        report
    }

    /// Generate a short failure report
    pub fn format_summary<T: fmt::Debug>(&self, failure: &TestFailure<T>) -> String {
        format!("{}\nSeed: {}", failure.summary(), failure.seed)
    }

    /// Report for a successful run
    pub fn format_success<T>(&self, success: &TestSuccess<T>) -> String {
        format!(
            "All {} tests passed (seed: {})",
            success.trials, success.seed
        )
    }
}
