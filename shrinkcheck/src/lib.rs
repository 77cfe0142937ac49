#![allow(clippy::result_large_err)]
#![allow(clippy::too_many_arguments)]

//! # Shrinkcheck - Property-Based Testing with Substring Shrinking
//!
//! Shrinkcheck generates random inputs for a property, stops at the first input
//! the property rejects, and then searches for the smallest input that is still
//! rejected. Strings and collections shrink to contiguous sub-slices, which are
//! addressed through a closed-form triangular index so the quadratic space of
//! candidates is never materialized.
//!
//! ## Quick Start
//!
//! ```rust
//! use shrinkcheck::{PropertyTestBuilder, TestResult};
//!
//! let result = PropertyTestBuilder::<String>::new()
//!     .trials(100)
//!     .seed(7)
//!     .quiet()
//!     .build(|s: &String| TestResult::check(s.chars().count() < 5, "too long"))
//!     .expect("valid configuration")
//!     .run();
//!
//! let failure = result.expect_err("long strings are generated");
//! assert_eq!(failure.minimal().chars().count(), 5);
//! ```
//!
//! New types become testable by implementing [`Arbitrary`] and [`Shrinkable`].

pub mod arbitrary;
pub mod config;
pub mod error;
pub mod execution;
pub mod parallel;
pub mod primitives;
pub mod property;
pub mod rng;
pub mod shrink;
pub mod slices;

// Re-export the main public API
pub use arbitrary::{Arbitrary, Checkable};
pub use config::{
    ConfigError, ConfigManager, GeneratorConfig, GlobalConfig, TestConfig, create_test_config,
    get_global_config, set_global_config,
};
pub use error::{ErrorReporter, PropertyResult, TestFailure, TestSuccess};
pub use execution::{PropertyTest, PropertyTestBuilder, check, check_trials, check_with_config};
pub use parallel::{ParallelConfig, ParallelPropertyTest, check_parallel};
pub use property::{Property, TestResult};
pub use rng::{
    DefaultRngProvider, RngProvider, SeededRng, create_seeded_rng, worker_seed,
};
pub use shrink::{ShrinkConfig, ShrinkEngine, ShrinkResult, Shrinkable};
pub use slices::{SliceDescriptor, Subslices, Substrings, band_of, slice_at, triangular};
