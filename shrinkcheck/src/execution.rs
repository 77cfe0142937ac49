//! Trial driver: generate, check, and shrink the first failure.

use std::marker::PhantomData;
use std::ops::Range;
use std::time::Instant;

use crate::arbitrary::Checkable;
use crate::config::{
    ConfigError, GeneratorConfig, TestConfig, create_test_config, get_global_config,
};
use crate::error::{ErrorReporter, PropertyResult, TestFailure, TestSuccess};
use crate::property::{Property, TestResult};
use crate::rng::SeededRng;
use crate::shrink::ShrinkEngine;

/// Core property test execution struct
pub struct PropertyTest<T, P> {
    property: P,
    config: TestConfig,
    error_reporter: ErrorReporter,
    report_failures: bool,
    _phantom: PhantomData<fn() -> T>,
}

impl<T, P> PropertyTest<T, P>
where
    T: Checkable,
    P: Property<T>,
{
    /// Create a new property test with the given property and configuration
    pub fn new(property: P, config: TestConfig) -> Self {
        Self::with_error_reporter(property, config, ErrorReporter::new())
    }

    /// Create a new property test with custom error reporter
    pub fn with_error_reporter(
        property: P,
        config: TestConfig,
        error_reporter: ErrorReporter,
    ) -> Self {
        Self {
            property,
            config,
            error_reporter,
            report_failures: true,
            _phantom: PhantomData,
        }
    }

    /// Do not print failure reports to stderr
    pub fn quiet(mut self) -> Self {
        self.report_failures = false;
        self
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    /// Execute the property test
    ///
    /// Stops at the first failing trial, shrinks that input and returns the
    /// failure. No trial is retried.
    pub fn run(self) -> PropertyResult<T> {
        let test_start = Instant::now();
        let mut source = SeededRng::new(self.config.seed);
        let seed = source.seed();
        let rng: &mut dyn rand::RngCore = source.rng_mut();

        tracing::debug!(seed, trials = self.config.trials, "starting property run");

        for trial in 0..self.config.trials {
            let input = T::arbitrary(rng, &self.config.generator_config);

            let message = match self.property.test(&input) {
                TestResult::Success => continue,
                TestResult::Failure(message) => message,
            };

            tracing::debug!(trial, size = input.shrink_size(), %message, "trial failed, shrinking");

            let engine = ShrinkEngine::with_config(self.config.shrink_config());
            let shrink = engine.minimize(
                input,
                self.config.effective_shrink_budget(),
                &self.property,
                rng,
            );

            let failure = TestFailure::from_shrink(
                message,
                shrink,
                trial,
                seed,
                self.config,
                test_start.elapsed(),
            );

            tracing::info!(
                trial,
                seed,
                shrink_steps = failure.shrink_steps,
                "property failed"
            );
            if self.report_failures {
                eprintln!("{}", self.error_reporter.format(&failure));
            }

            return Err(failure);
        }

        let success = TestSuccess::new(self.config.trials, seed, self.config, test_start.elapsed());
        tracing::info!(trials = success.trials, seed, "{}", self.error_reporter.format_success(&success));
        Ok(success)
    }
}

/// Execute a property test with the thread's global defaults
pub fn check<T, P>(property: P) -> PropertyResult<T>
where
    T: Checkable,
    P: Property<T>,
{
    check_with_config(property, create_test_config())
}

/// Execute a property test with a custom configuration
///
/// A seed set in the thread's global configuration applies when `config`
/// has none of its own.
pub fn check_with_config<T, P>(property: P, config: TestConfig) -> PropertyResult<T>
where
    T: Checkable,
    P: Property<T>,
{
    PropertyTest::new(property, config.merge_with_global(&get_global_config())).run()
}

/// Run `trials` trials and report overall success as a boolean
///
/// The failure report, including the minimal counterexample, goes to stderr.
pub fn check_trials<T, P>(trials: usize, property: P) -> bool
where
    T: Checkable,
    P: Property<T>,
{
    let config = TestConfig {
        trials,
        ..TestConfig::default()
    };
    check_with_config(property, config).is_ok()
}

/// Builder pattern for configuring property tests
#[derive(Debug, Clone)]
pub struct PropertyTestBuilder<T> {
    config: TestConfig,
    error_reporter: ErrorReporter,
    report_failures: bool,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Checkable> PropertyTestBuilder<T> {
    /// Create a new property test builder with default configuration
    pub fn new() -> Self {
        Self::from_config(TestConfig::default())
    }

    /// Start from an existing configuration
    pub fn from_config(config: TestConfig) -> Self {
        Self {
            config,
            error_reporter: ErrorReporter::new(),
            report_failures: true,
            _phantom: PhantomData,
        }
    }

    /// Set the number of trials
    pub fn trials(mut self, trials: usize) -> Self {
        self.config.trials = trials;
        self
    }

    /// Set the random seed for reproducible runs
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the number of candidates drawn by the first shrink round
    pub fn shrink_budget(mut self, budget: usize) -> Self {
        self.config.shrink_budget = Some(budget);
        self
    }

    /// Set the number of candidates drawn by later shrink rounds
    pub fn retry_budget(mut self, budget: usize) -> Self {
        self.config.retry_budget = budget;
        self
    }

    /// Set the cap on accepted shrink steps
    pub fn max_shrink_steps(mut self, steps: usize) -> Self {
        self.config.max_shrink_steps = steps;
        self
    }

    /// Set the exclusive upper bound on generated lengths
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.config.generator_config.max_length = max_length;
        self
    }

    /// Set the code points drawn for generated text
    pub fn char_range(mut self, range: Range<u32>) -> Self {
        self.config.generator_config.char_range = range;
        self
    }

    /// Replace the whole generator configuration
    pub fn generator_config(mut self, generator_config: GeneratorConfig) -> Self {
        self.config.generator_config = generator_config;
        self
    }

    /// Enable verbose error reporting
    pub fn verbose_errors(mut self) -> Self {
        self.error_reporter = self.error_reporter.verbose();
        self
    }

    /// Enable configuration display in error reports
    pub fn show_config_in_errors(mut self) -> Self {
        self.error_reporter = self.error_reporter.show_config();
        self
    }

    /// Do not print failure reports to stderr
    pub fn quiet(mut self) -> Self {
        self.report_failures = false;
        self
    }

    /// The configuration accumulated so far
    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    /// Validate the configuration and attach the property
    pub fn build<P: Property<T>>(self, property: P) -> Result<PropertyTest<T, P>, ConfigError> {
        self.config.validate()?;
        let mut test = PropertyTest::with_error_reporter(property, self.config, self.error_reporter);
        test.report_failures = self.report_failures;
        Ok(test)
    }
}

impl<T: Checkable> Default for PropertyTestBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
