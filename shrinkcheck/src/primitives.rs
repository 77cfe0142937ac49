//! Built-in testable types: text, integers and collections.

use std::ops::Range;

use num_traits::PrimInt;
use rand::Rng;
use rand::distributions::uniform::SampleUniform;

use crate::arbitrary::Arbitrary;
use crate::config::GeneratorConfig;
use crate::shrink::Shrinkable;
use crate::slices::{Subslices, Substrings};

/// Length in `[0, max_length)`
fn arbitrary_length(rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> usize {
    if config.max_length == 0 {
        return 0;
    }
    rng.gen_range(0..config.max_length)
}

fn arbitrary_char(rng: &mut dyn rand::RngCore, range: &Range<u32>) -> char {
    let code = if range.is_empty() {
        range.start
    } else {
        rng.gen_range(range.clone())
    };
    // Surrogate code points have no char
    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Uniform in `[0, MAX)`
fn below_max<T>(rng: &mut dyn rand::RngCore) -> T
where
    T: PrimInt + SampleUniform,
{
    rng.gen_range(T::zero()..T::max_value())
}

/// `count` draws uniform in `[0, value)`; nothing for zero or negative values
fn shrink_below<T>(value: T, count: usize, rng: &mut dyn rand::RngCore) -> Vec<T>
where
    T: PrimInt + SampleUniform,
{
    if value <= T::zero() {
        return Vec::new();
    }
    (0..count).map(|_| rng.gen_range(T::zero()..value)).collect()
}

impl Arbitrary for String {
    fn arbitrary(rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Self {
        let length = arbitrary_length(rng, config);
        (0..length)
            .map(|_| arbitrary_char(rng, &config.char_range))
            .collect()
    }
}

impl Shrinkable for String {
    /// Random proper substrings, drawn through the slice index
    fn shrink(&self, count: usize, rng: &mut dyn rand::RngCore) -> Vec<Self> {
        let view = Substrings::new(self);
        (0..count)
            .map_while(|_| view.sample_proper(rng).map(str::to_owned))
            .collect()
    }

    fn shrink_size(&self) -> u64 {
        self.chars().count() as u64
    }
}

macro_rules! impl_checkable_unsigned {
    ($($t:ty),*) => {
        $(
            impl Arbitrary for $t {
                fn arbitrary(rng: &mut dyn rand::RngCore, _config: &GeneratorConfig) -> Self {
                    below_max(rng)
                }
            }

            impl Shrinkable for $t {
                fn shrink(&self, count: usize, rng: &mut dyn rand::RngCore) -> Vec<Self> {
                    shrink_below(*self, count, rng)
                }

                fn shrink_size(&self) -> u64 {
                    *self as u64
                }
            }
        )*
    };
}

macro_rules! impl_checkable_signed {
    ($($t:ty),*) => {
        $(
            impl Arbitrary for $t {
                fn arbitrary(rng: &mut dyn rand::RngCore, _config: &GeneratorConfig) -> Self {
                    below_max(rng)
                }
            }

            impl Shrinkable for $t {
                fn shrink(&self, count: usize, rng: &mut dyn rand::RngCore) -> Vec<Self> {
                    shrink_below(*self, count, rng)
                }

                fn shrink_size(&self) -> u64 {
                    self.unsigned_abs() as u64
                }
            }
        )*
    };
}

impl_checkable_unsigned!(u8, u16, u32, u64, usize);
impl_checkable_signed!(i32, i64);

impl<T: Arbitrary> Arbitrary for Vec<T> {
    fn arbitrary(rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Self {
        let length = arbitrary_length(rng, config);
        (0..length).map(|_| T::arbitrary(rng, config)).collect()
    }
}

impl<T: Clone> Shrinkable for Vec<T> {
    /// Random proper contiguous sub-collections, drawn through the slice index
    fn shrink(&self, count: usize, rng: &mut dyn rand::RngCore) -> Vec<Self> {
        let view = Subslices::new(self);
        (0..count)
            .map_while(|_| view.sample_proper(rng).map(<[T]>::to_vec))
            .collect()
    }

    fn shrink_size(&self) -> u64 {
        self.len() as u64
    }
}
