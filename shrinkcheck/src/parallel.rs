//! Parallel trial execution across scoped worker threads.
//!
//! Trials are split into contiguous ranges, one per worker. Each worker owns a
//! `StdRng` seeded from the run seed and its index, so a run is replayable from
//! the recorded seed and thread count. Workers stop as soon as any of them sees
//! a failure; the earliest failing trial that was observed is then shrunk on the
//! calling thread.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rand::rngs::StdRng;

use crate::arbitrary::Checkable;
use crate::config::TestConfig;
use crate::error::{ErrorReporter, PropertyResult, TestFailure, TestSuccess};
use crate::execution::PropertyTest;
use crate::property::{Property, TestResult};
use crate::rng::{DefaultRngProvider, RngProvider, create_seeded_rng, worker_seed};
use crate::shrink::ShrinkEngine;

/// Configuration for parallel execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Number of threads to use for parallel execution
    pub num_threads: usize,
    /// Runs with fewer trials than this stay on the calling thread
    pub batch_size: usize,
    /// Whether to enable parallel execution
    pub enabled: bool,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
            batch_size: 10,
            enabled: true,
        }
    }
}

impl ParallelConfig {
    /// Parallel execution on exactly `num_threads` workers
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads,
            ..Default::default()
        }
    }

    /// Parallel execution switched off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

/// A failing trial found by a worker, with the worker's generator state
struct WorkerFailure<T> {
    trial: usize,
    input: T,
    message: String,
    rng: StdRng,
}

/// Parallel property test executor
pub struct ParallelPropertyTest<T, P> {
    property: P,
    config: TestConfig,
    parallel_config: ParallelConfig,
    error_reporter: ErrorReporter,
    report_failures: bool,
    _phantom: PhantomData<fn() -> T>,
}

impl<T, P> ParallelPropertyTest<T, P>
where
    T: Checkable + Send,
    P: Property<T> + Sync,
{
    /// Create a new parallel property test
    pub fn new(property: P, config: TestConfig, parallel_config: ParallelConfig) -> Self {
        Self {
            property,
            config,
            parallel_config,
            error_reporter: ErrorReporter::new(),
            report_failures: true,
            _phantom: PhantomData,
        }
    }

    /// Use a custom error reporter
    pub fn with_error_reporter(mut self, error_reporter: ErrorReporter) -> Self {
        self.error_reporter = error_reporter;
        self
    }

    /// Do not print failure reports to stderr
    pub fn quiet(mut self) -> Self {
        self.report_failures = false;
        self
    }

    /// Workers actually spawned: never more than there are trials
    fn worker_count(&self) -> usize {
        self.parallel_config.num_threads.min(self.config.trials)
    }

    fn runs_sequentially(&self) -> bool {
        !self.parallel_config.enabled
            || self.worker_count() <= 1
            || self.config.trials < self.parallel_config.batch_size
    }

    /// Execute the property test in parallel
    pub fn run(self) -> PropertyResult<T> {
        if self.runs_sequentially() {
            return self.run_sequential();
        }

        let test_start = Instant::now();
        let seed = self
            .config
            .seed
            .unwrap_or_else(|| DefaultRngProvider.fresh_seed());
        let num_threads = self.worker_count();
        let per_worker = self.config.trials / num_threads;
        let remainder = self.config.trials % num_threads;

        tracing::debug!(seed, num_threads, trials = self.config.trials, "starting parallel run");

        let stop = AtomicBool::new(false);
        let property = &self.property;
        let config = &self.config;

        let outcome = crossbeam::scope(|s| {
            let mut handles = Vec::with_capacity(num_threads);

            for worker in 0..num_threads {
                let first_trial = worker * per_worker + worker.min(remainder);
                let trials = per_worker + usize::from(worker < remainder);
                let stop = &stop;

                handles.push(s.spawn(move |_| {
                    Self::run_worker(property, config, worker_seed(seed, worker), first_trial, trials, stop)
                }));
            }

            let mut earliest: Option<WorkerFailure<T>> = None;
            for handle in handles {
                match handle.join() {
                    Ok(Some(failure)) => {
                        if earliest.as_ref().is_none_or(|e| failure.trial < e.trial) {
                            earliest = Some(failure);
                        }
                    }
                    Ok(None) => {}
                    Err(payload) => std::panic::resume_unwind(payload),
                }
            }
            earliest
        });

        let earliest = match outcome {
            Ok(earliest) => earliest,
            Err(payload) => std::panic::resume_unwind(payload),
        };

        let Some(WorkerFailure {
            trial,
            input,
            message,
            mut rng,
        }) = earliest
        else {
            let success = TestSuccess::new(self.config.trials, seed, self.config, test_start.elapsed());
            tracing::info!(
                trials = success.trials,
                seed,
                num_threads,
                "{}",
                self.error_reporter.format_success(&success)
            );
            return Ok(success);
        };

        tracing::debug!(trial, size = input.shrink_size(), %message, "trial failed, shrinking");

        let engine = ShrinkEngine::with_config(self.config.shrink_config());
        let shrink = engine.minimize(
            input,
            self.config.effective_shrink_budget(),
            &self.property,
            &mut rng,
        );
        let failure = TestFailure::from_shrink(
            message,
            shrink,
            trial,
            seed,
            self.config,
            test_start.elapsed(),
        );

        tracing::info!(trial, seed, shrink_steps = failure.shrink_steps, "property failed");
        if self.report_failures {
            eprintln!("{}", self.error_reporter.format(&failure));
        }
        Err(failure)
    }

    /// Run one worker's contiguous range of trials
    fn run_worker(
        property: &P,
        config: &TestConfig,
        seed: u64,
        first_trial: usize,
        trials: usize,
        stop: &AtomicBool,
    ) -> Option<WorkerFailure<T>> {
        let mut rng = create_seeded_rng(seed);

        for offset in 0..trials {
            if stop.load(Ordering::Relaxed) {
                return None;
            }

            let input = T::arbitrary(&mut rng, &config.generator_config);
            if let TestResult::Failure(message) = property.test(&input) {
                stop.store(true, Ordering::Relaxed);
                return Some(WorkerFailure {
                    trial: first_trial + offset,
                    input,
                    message,
                    rng,
                });
            }
        }

        None
    }

    /// Fall back to sequential execution
    fn run_sequential(self) -> PropertyResult<T> {
        let test = PropertyTest::with_error_reporter(self.property, self.config, self.error_reporter);
        if self.report_failures {
            test.run()
        } else {
            test.quiet().run()
        }
    }
}

/// Execute a property test with parallel optimization
pub fn check_parallel<T, P>(
    property: P,
    config: TestConfig,
    parallel_config: ParallelConfig,
) -> PropertyResult<T>
where
    T: Checkable + Send,
    P: Property<T> + Sync,
{
    ParallelPropertyTest::new(property, config, parallel_config).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting(counter: &AtomicUsize) -> impl Fn(&u32) -> bool + Sync + '_ {
        move |_: &u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    fn seeded(trials: usize, seed: u64) -> TestConfig {
        TestConfig {
            trials,
            seed: Some(seed),
            ..TestConfig::default()
        }
    }

    #[test]
    fn test_parallel_config_default() {
        let config = ParallelConfig::default();
        assert_eq!(config.num_threads, num_cpus::get());
        assert_eq!(config.batch_size, 10);
        assert!(config.enabled);

        assert_eq!(ParallelConfig::with_threads(3).num_threads, 3);
        assert!(!ParallelConfig::disabled().enabled);
    }

    #[test]
    fn test_sequential_fallback_for_small_runs() {
        let counter = AtomicUsize::new(0);
        let parallel_config = ParallelConfig {
            num_threads: 4,
            batch_size: 10,
            enabled: true,
        };

        let result = check_parallel(counting(&counter), seeded(5, 1), parallel_config);

        assert_eq!(result.expect("always passes").trials, 5);
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_parallel_disabled() {
        let counter = AtomicUsize::new(0);

        let result = check_parallel(counting(&counter), seeded(20, 2), ParallelConfig::disabled());

        assert!(result.is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_parallel_runs_every_trial() {
        let counter = AtomicUsize::new(0);
        let parallel_config = ParallelConfig {
            num_threads: 3,
            batch_size: 5,
            enabled: true,
        };

        let success = check_parallel(counting(&counter), seeded(20, 3), parallel_config)
            .expect("always passes");

        assert_eq!(success.trials, 20);
        assert_eq!(success.seed, 3);
        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_parallel_failure_is_shrunk() {
        let property = |n: &u64| TestResult::check(n % 2 == 0, "odd");

        let failure = ParallelPropertyTest::new(property, seeded(100, 4), ParallelConfig::with_threads(4))
            .quiet()
            .run()
            .expect_err("odd numbers are generated");

        assert_eq!(failure.message, "odd");
        assert_eq!(*failure.minimal(), 1);
        assert_eq!(failure.original_input % 2, 1);
        assert!(failure.failed_trial < 100);
        assert_eq!(failure.seed, 4);
    }

    #[test]
    fn test_zero_trials_or_threads_stay_sequential() {
        let counter = AtomicUsize::new(0);
        let parallel_config = ParallelConfig {
            num_threads: 4,
            batch_size: 0,
            enabled: true,
        };

        let success = check_parallel(counting(&counter), seeded(0, 6), parallel_config)
            .expect("no trials, nothing fails");
        assert_eq!(success.trials, 0);

        let parallel_config = ParallelConfig {
            num_threads: 0,
            batch_size: 0,
            enabled: true,
        };
        let success = check_parallel(counting(&counter), seeded(8, 6), parallel_config)
            .expect("always passes");
        assert_eq!(success.trials, 8);
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn test_more_threads_than_trials() {
        let counter = AtomicUsize::new(0);
        let parallel_config = ParallelConfig {
            num_threads: 16,
            batch_size: 1,
            enabled: true,
        };

        let result = check_parallel(counting(&counter), seeded(6, 5), parallel_config);

        assert!(result.is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 6);
    }
}
