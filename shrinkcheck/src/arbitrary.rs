//! Arbitrary trait and the combined capability a testable type must provide.

use std::fmt;

use crate::config::GeneratorConfig;
use crate::shrink::Shrinkable;

/// Types that can generate arbitrary instances of themselves
///
/// Each call must produce a new, independent value drawn from `rng`. Generation
/// cannot fail; implementations guard degenerate inputs by construction.
pub trait Arbitrary: Sized {
    /// Produce a random instance
    fn arbitrary(rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Self;
}

/// Everything the trial driver and shrink search need from a value
///
/// Implemented automatically for any type that can be generated, shrunk,
/// cloned and rendered with `Debug` for reports. New testable types plug in by
/// implementing [`Arbitrary`] and [`Shrinkable`]; the engine itself never changes.
pub trait Checkable: Arbitrary + Shrinkable + Clone + fmt::Debug {}

impl<T> Checkable for T where T: Arbitrary + Shrinkable + Clone + fmt::Debug {}
