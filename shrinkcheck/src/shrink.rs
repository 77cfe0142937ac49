//! Shrinking functionality for minimizing failing test cases.
//!
//! The search is a fixpoint iteration. Each round asks the current failing
//! value for a batch of candidates, keeps the ones that still fail, and moves to
//! the one with the smallest [`Shrinkable::shrink_size`]. A round that finds
//! nothing strictly smaller ends the search. Because the size is a
//! non-negative integer that strictly decreases on every accepted step, the
//! number of steps never exceeds the size of the initial value.

use std::time::{Duration, Instant};

use crate::property::Property;

/// Types that can propose simpler versions of themselves
pub trait Shrinkable: Sized {
    /// Propose up to `count` candidates
    ///
    /// Candidates are not required to be distinct, sorted, or smaller than
    /// `self`; the search filters them. Values that cannot shrink return an
    /// empty vector.
    fn shrink(&self, count: usize, rng: &mut dyn rand::RngCore) -> Vec<Self>;

    /// Magnitude used to rank failing candidates
    fn shrink_size(&self) -> u64;
}

/// Result of a shrinking operation
#[derive(Debug, Clone)]
pub struct ShrinkResult<T> {
    /// Original value that failed
    pub original: T,
    /// Smallest value found that still fails
    pub minimal: T,
    /// Number of accepted shrinking steps
    pub shrink_steps: usize,
    /// Number of property evaluations spent on candidates
    pub evaluations: usize,
    /// Time spent shrinking
    pub shrink_duration: Duration,
    /// Whether the search reached a fixpoint rather than the step cap
    pub completed: bool,
}

impl<T> ShrinkResult<T> {
    /// Create a new shrink result
    pub fn new(
        original: T,
        minimal: T,
        shrink_steps: usize,
        evaluations: usize,
        shrink_duration: Duration,
        completed: bool,
    ) -> Self {
        Self {
            original,
            minimal,
            shrink_steps,
            evaluations,
            shrink_duration,
            completed,
        }
    }

    /// Create a shrink result for when no shrinking was performed
    pub fn no_shrinking(original: T) -> Self
    where
        T: Clone,
    {
        Self {
            minimal: original.clone(),
            original,
            shrink_steps: 0,
            evaluations: 0,
            shrink_duration: Duration::from_secs(0),
            completed: true,
        }
    }

    /// Whether the minimal value differs from the original
    pub fn shrunk(&self) -> bool {
        self.shrink_steps > 0
    }
}

/// Configuration for shrinking behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShrinkConfig {
    /// Candidates drawn by every round after the first
    pub retry_budget: usize,
    /// Maximum number of accepted steps
    pub max_steps: usize,
}

impl Default for ShrinkConfig {
    fn default() -> Self {
        Self {
            retry_budget: crate::config::DEFAULT_RETRY_BUDGET,
            max_steps: crate::config::DEFAULT_MAX_SHRINK_STEPS,
        }
    }
}

impl ShrinkConfig {
    /// Create a new shrink configuration
    pub fn new(retry_budget: usize, max_steps: usize) -> Self {
        Self {
            retry_budget,
            max_steps,
        }
    }

    /// Create a shrink configuration with a custom retry budget
    pub fn with_retry_budget(retry_budget: usize) -> Self {
        Self {
            retry_budget,
            ..Default::default()
        }
    }

    /// Create a shrink configuration with a custom step cap
    pub fn with_max_steps(max_steps: usize) -> Self {
        Self {
            max_steps,
            ..Default::default()
        }
    }
}

/// Shrinking engine that coordinates the shrinking process
#[derive(Debug, Clone, Default)]
pub struct ShrinkEngine {
    config: ShrinkConfig,
}

impl ShrinkEngine {
    /// Create a new shrinking engine with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new shrinking engine with custom configuration
    pub fn with_config(config: ShrinkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ShrinkConfig {
        &self.config
    }

    /// Search for the smallest failing value reachable from `initial`
    ///
    /// The first round draws `budget` candidates and later rounds draw
    /// `retry_budget`. A zero budget skips the search. Returns `initial` unchanged when no strictly smaller
    /// failing candidate turns up. The returned value is always either
    /// `initial` or a value the property was observed to fail on.
    pub fn minimize<T, P>(
        &self,
        initial: T,
        budget: usize,
        property: &P,
        rng: &mut dyn rand::RngCore,
    ) -> ShrinkResult<T>
    where
        T: Shrinkable + Clone,
        P: Property<T> + ?Sized,
    {
        if budget == 0 {
            return ShrinkResult::no_shrinking(initial);
        }

        let start_time = Instant::now();
        let mut current = initial.clone();
        let mut round_budget = budget;
        let mut shrink_steps = 0;
        let mut evaluations = 0;

        let completed = loop {
            if shrink_steps >= self.config.max_steps {
                tracing::warn!(
                    steps = shrink_steps,
                    size = current.shrink_size(),
                    "shrinking stopped at step cap"
                );
                break false;
            }

            let Some(smaller) =
                Self::shrink_round(&current, round_budget, property, rng, &mut evaluations)
            else {
                break true;
            };

            shrink_steps += 1;
            tracing::debug!(
                step = shrink_steps,
                from = current.shrink_size(),
                to = smaller.shrink_size(),
                "found smaller failing value"
            );
            current = smaller;
            round_budget = self.config.retry_budget;
        };

        tracing::debug!(
            steps = shrink_steps,
            evaluations,
            size = current.shrink_size(),
            "shrinking finished"
        );

        ShrinkResult::new(
            initial,
            current,
            shrink_steps,
            evaluations,
            start_time.elapsed(),
            completed,
        )
    }

    /// One round of the search
    ///
    /// Returns the first failing candidate of minimal size, or `None` when no
    /// failing candidate is strictly smaller than `current`.
    fn shrink_round<T, P>(
        current: &T,
        budget: usize,
        property: &P,
        rng: &mut dyn rand::RngCore,
        evaluations: &mut usize,
    ) -> Option<T>
    where
        T: Shrinkable,
        P: Property<T> + ?Sized,
    {
        let mut best_size = current.shrink_size();
        let mut best = None;

        for candidate in current.shrink(budget, rng) {
            *evaluations += 1;
            if property.test(&candidate).is_success() {
                continue;
            }
            let size = candidate.shrink_size();
            if size < best_size {
                best_size = size;
                best = Some(candidate);
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::TestResult;
    use crate::rng::create_seeded_rng;
    use std::cell::Cell;

    // Deterministic shrinker: proposes every smaller value, largest first.
    #[derive(Debug, Clone, PartialEq)]
    struct Countdown(u64);

    impl Shrinkable for Countdown {
        fn shrink(&self, count: usize, _rng: &mut dyn rand::RngCore) -> Vec<Self> {
            (0..self.0).rev().take(count).map(Countdown).collect()
        }

        fn shrink_size(&self) -> u64 {
            self.0
        }
    }

    // Proposes only values of equal or larger size.
    #[derive(Debug, Clone, PartialEq)]
    struct Stubborn(u64);

    impl Shrinkable for Stubborn {
        fn shrink(&self, count: usize, _rng: &mut dyn rand::RngCore) -> Vec<Self> {
            (0..count as u64).map(|i| Stubborn(self.0 + i % 2)).collect()
        }

        fn shrink_size(&self) -> u64 {
            self.0
        }
    }

    // Proposes exactly one candidate, one smaller.
    #[derive(Debug, Clone, PartialEq)]
    struct Step(u64);

    impl Shrinkable for Step {
        fn shrink(&self, _count: usize, _rng: &mut dyn rand::RngCore) -> Vec<Self> {
            self.0.checked_sub(1).map(Step).into_iter().collect()
        }

        fn shrink_size(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn test_shrink_result_no_shrinking() {
        let result = ShrinkResult::no_shrinking(42);

        assert_eq!(result.original, 42);
        assert_eq!(result.minimal, 42);
        assert_eq!(result.shrink_steps, 0);
        assert_eq!(result.shrink_duration, Duration::from_secs(0));
        assert!(result.completed);
        assert!(!result.shrunk());
    }

    #[test]
    fn test_shrink_config_builders() {
        let config = ShrinkConfig::default();
        assert_eq!(config.retry_budget, 100);
        assert_eq!(config.max_steps, 1000);

        let config = ShrinkConfig::with_retry_budget(10);
        assert_eq!(config.retry_budget, 10);
        assert_eq!(config.max_steps, 1000);

        let config = ShrinkConfig::with_max_steps(3);
        assert_eq!(config.max_steps, 3);
        assert_eq!(ShrinkEngine::with_config(config).config().max_steps, 3);
    }

    #[test]
    fn test_minimize_picks_smallest_failing_candidate() {
        let engine = ShrinkEngine::new();
        let mut rng = create_seeded_rng(0);
        let property = |c: &Countdown| TestResult::check(c.0 < 10, "too big");

        let result = engine.minimize(Countdown(50), 100, &property, &mut rng);

        assert_eq!(result.minimal, Countdown(10));
        assert_eq!(result.original, Countdown(50));
        // 50 -> 10 in one round, then 10 has no smaller failing candidate
        assert_eq!(result.shrink_steps, 1);
        assert!(result.completed);
    }

    #[test]
    fn test_minimize_returns_initial_without_failing_candidates() {
        let engine = ShrinkEngine::new();
        let mut rng = create_seeded_rng(0);
        let property = |c: &Countdown| TestResult::check(c.0 != 7, "seven");

        let result = engine.minimize(Countdown(7), 100, &property, &mut rng);

        assert_eq!(result.minimal, Countdown(7));
        assert_eq!(result.shrink_steps, 0);
        assert_eq!(result.evaluations, 7);
        assert!(result.completed);
    }

    #[test]
    fn test_zero_budget_skips_search() {
        let engine = ShrinkEngine::new();
        let mut rng = create_seeded_rng(0);
        let calls = Cell::new(0usize);
        let property = |_: &Countdown| {
            calls.set(calls.get() + 1);
            TestResult::failure("always")
        };

        let result = engine.minimize(Countdown(40), 0, &property, &mut rng);

        assert_eq!(result.minimal, Countdown(40));
        assert_eq!(result.evaluations, 0);
        assert_eq!(calls.get(), 0);
        assert!(!result.shrunk());
    }

    #[test]
    fn test_minimize_tolerates_non_shrinking_candidates() {
        let engine = ShrinkEngine::new();
        let mut rng = create_seeded_rng(0);
        let property = |_: &Stubborn| TestResult::failure("always");

        let result = engine.minimize(Stubborn(5), 20, &property, &mut rng);

        assert_eq!(result.minimal, Stubborn(5));
        assert_eq!(result.shrink_steps, 0);
        assert!(result.completed);
    }

    #[test]
    fn test_minimize_steps_bounded_by_initial_size() {
        let engine = ShrinkEngine::new();
        let mut rng = create_seeded_rng(0);
        let property = |_: &Step| TestResult::failure("always");

        let result = engine.minimize(Step(25), 100, &property, &mut rng);

        assert_eq!(result.minimal, Step(0));
        assert_eq!(result.shrink_steps, 25);
        assert!(result.completed);
    }

    #[test]
    fn test_minimize_respects_step_cap() {
        let engine = ShrinkEngine::with_config(ShrinkConfig::with_max_steps(4));
        let mut rng = create_seeded_rng(0);
        let property = |_: &Step| TestResult::failure("always");

        let result = engine.minimize(Step(25), 100, &property, &mut rng);

        assert_eq!(result.minimal, Step(21));
        assert_eq!(result.shrink_steps, 4);
        assert!(!result.completed);
    }

    #[test]
    fn test_first_round_uses_budget_and_later_rounds_retry_budget() {
        let engine = ShrinkEngine::with_config(ShrinkConfig::with_retry_budget(2));
        let mut rng = create_seeded_rng(0);
        let calls = Cell::new(0usize);
        let property = |c: &Countdown| {
            calls.set(calls.get() + 1);
            TestResult::check(c.0 < 3, "too big")
        };

        // Round 1 sees 99..=90 and keeps 90; later rounds step down by 2.
        let result = engine.minimize(Countdown(100), 10, &property, &mut rng);

        assert_eq!(result.minimal, Countdown(3));
        assert_eq!(result.evaluations, calls.get());
        assert_eq!(result.shrink_steps, 1 + (90 - 4) / 2 + 1);
    }
}
