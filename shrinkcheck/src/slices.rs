//! Lazy, index-addressable views over every contiguous sub-slice of a sequence.
//!
//! A sequence of length `n` has `T(n) = n(n+1)/2` non-empty contiguous slices.
//! The slices are laid out in bands of decreasing length: band `x` holds the
//! `x + 1` slices of length `n - x`, ordered by start position. A linear index
//! `i` therefore lives in the band `x` for which `T(x) <= i < T(x + 1)`, and
//! that band is recovered in closed form from the inverse of the triangular
//! number. Nothing is materialized up front, so a query costs O(1) no matter
//! how large the universe of slices is.
//!
//! ```
//! use shrinkcheck::slices::Substrings;
//!
//! let view = Substrings::new("abcd");
//! assert_eq!(view.len(), 10);
//! assert_eq!(view.get(0), Some("abcd"));
//! assert_eq!(view.get(9), Some("d"));
//! assert_eq!(view.get(10), None);
//! ```

use std::ops::Range;

use rand::Rng;

/// Triangular number `T(n) = n(n+1)/2`
///
/// Overflows for sequences whose slice count does not fit in a `usize`.
pub fn triangular(n: usize) -> usize {
    let (even, odd) = if n % 2 == 0 { (n, n + 1) } else { (n + 1, n) };
    even / 2 * odd
}

fn checked_triangular(n: usize) -> Option<usize> {
    let (even, odd) = if n % 2 == 0 { (n, n + 1) } else { (n + 1, n) };
    (even / 2).checked_mul(odd)
}

/// Largest `x` such that `T(x) <= i`
///
/// Starts from the floating-point inverse `floor((sqrt(8i + 1) - 1) / 2)` and
/// corrects it in integer arithmetic, since the square root can land one unit
/// off for large `i`.
pub fn band_of(i: usize) -> usize {
    let estimate = (((8.0 * i as f64 + 1.0).sqrt() - 1.0) / 2.0).floor();
    let mut x = estimate as usize;

    while x > 0 && checked_triangular(x).is_none_or(|t| t > i) {
        x -= 1;
    }
    while checked_triangular(x + 1).is_some_and(|t| t <= i) {
        x += 1;
    }

    x
}

/// Position and length of one contiguous slice of a base sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SliceDescriptor {
    /// Index of the first element
    pub start: usize,
    /// Number of elements, always at least one
    pub len: usize,
}

impl SliceDescriptor {
    /// One past the last element
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// The element range covered by this slice
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Map index `i` to the `i`-th slice of a sequence of length `n`
///
/// Returns `None` when `i >= T(n)`, which includes every query against an
/// empty sequence.
pub fn slice_at(n: usize, i: usize) -> Option<SliceDescriptor> {
    if checked_triangular(n).is_some_and(|total| i >= total) {
        return None;
    }

    let band = band_of(i);
    Some(SliceDescriptor {
        start: i - triangular(band),
        len: n - band,
    })
}

/// Draw an index in `[1, T(n))`, skipping index 0 (the whole sequence)
fn sample_proper_index(n: usize, rng: &mut dyn rand::RngCore) -> Option<usize> {
    let total = checked_triangular(n).unwrap_or(usize::MAX);
    if total < 2 {
        return None;
    }
    Some(rng.gen_range(1..total))
}

/// Every contiguous sub-slice of a borrowed slice, addressable by index
#[derive(Debug)]
pub struct Subslices<'a, T> {
    base: &'a [T],
}

// Only a shared borrow is held, so the view is `Copy` for any element type.
impl<T> Clone for Subslices<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Subslices<'_, T> {}

impl<'a, T> Subslices<'a, T> {
    /// Create a view over `base`
    pub fn new(base: &'a [T]) -> Self {
        Self { base }
    }

    /// Number of addressable slices, `T(base.len())`
    pub fn len(&self) -> usize {
        triangular(self.base.len())
    }

    /// Whether the base is empty and no slice can be addressed
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Descriptor of the `i`-th slice
    pub fn descriptor(&self, i: usize) -> Option<SliceDescriptor> {
        slice_at(self.base.len(), i)
    }

    /// The `i`-th slice
    pub fn get(&self, i: usize) -> Option<&'a [T]> {
        self.descriptor(i).map(|d| &self.base[d.range()])
    }

    /// A random slice other than the whole base
    ///
    /// `None` when the base has fewer than two elements.
    pub fn sample_proper(&self, rng: &mut dyn rand::RngCore) -> Option<&'a [T]> {
        sample_proper_index(self.base.len(), rng).and_then(|i| self.get(i))
    }

    /// All slices in index order, longest first
    pub fn iter(&self) -> SubslicesIter<'a, T> {
        SubslicesIter {
            view: *self,
            next: 0,
            end: self.len(),
        }
    }
}

/// Iterator over [`Subslices`] in index order
#[derive(Debug)]
pub struct SubslicesIter<'a, T> {
    view: Subslices<'a, T>,
    next: usize,
    end: usize,
}

impl<T> Clone for SubslicesIter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            view: self.view,
            next: self.next,
            end: self.end,
        }
    }
}

impl<'a, T> Iterator for SubslicesIter<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let item = self.view.get(self.next);
        self.next += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for SubslicesIter<'_, T> {}

/// Every contiguous substring of a borrowed string, addressable by index
///
/// Positions count `char`s, not bytes. Char boundaries are computed once when
/// the view is built so that each query stays constant time.
#[derive(Debug, Clone)]
pub struct Substrings<'a> {
    base: &'a str,
    // Byte offset of every char start, followed by `base.len()`.
    boundaries: Vec<usize>,
}

impl<'a> Substrings<'a> {
    /// Create a view over `base`
    pub fn new(base: &'a str) -> Self {
        let boundaries = base
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(base.len()))
            .collect();
        Self { base, boundaries }
    }

    /// Length of the base in chars
    pub fn char_count(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Number of addressable substrings, `T(char_count)`
    pub fn len(&self) -> usize {
        triangular(self.char_count())
    }

    /// Whether the base is empty and no substring can be addressed
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Descriptor of the `i`-th substring, in chars
    pub fn descriptor(&self, i: usize) -> Option<SliceDescriptor> {
        slice_at(self.char_count(), i)
    }

    /// The `i`-th substring
    pub fn get(&self, i: usize) -> Option<&'a str> {
        let d = self.descriptor(i)?;
        let base = self.base;
        Some(&base[self.boundaries[d.start]..self.boundaries[d.end()]])
    }

    /// A random substring other than the whole base
    ///
    /// `None` when the base has fewer than two chars.
    pub fn sample_proper(&self, rng: &mut dyn rand::RngCore) -> Option<&'a str> {
        sample_proper_index(self.char_count(), rng).and_then(|i| self.get(i))
    }

    /// All substrings in index order, longest first
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &'a str> + '_ {
        (0..self.len()).map(move |i| self.get(i).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_seeded_rng;
    use std::collections::HashSet;

    #[test]
    fn test_triangular_numbers() {
        assert_eq!(triangular(0), 0);
        assert_eq!(triangular(1), 1);
        assert_eq!(triangular(4), 10);
        assert_eq!(triangular(100), 5050);
    }

    #[test]
    fn test_band_of_small_indices() {
        let expected = [0, 1, 1, 2, 2, 2, 3, 3, 3, 3, 4];
        for (i, &band) in expected.iter().enumerate() {
            assert_eq!(band_of(i), band, "index {}", i);
        }
    }

    #[test]
    fn test_band_of_band_edges() {
        for x in [10usize, 1_000, 65_535] {
            let t = triangular(x);
            assert_eq!(band_of(t), x);
            assert_eq!(band_of(t - 1), x - 1);
            assert_eq!(band_of(t + x), x);
        }
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_band_of_corrects_float_rounding() {
        // 8i + 1 is far beyond f64's exact integer range here
        for x in [1usize << 20, 94_906_265, 4_000_000_000, 6_000_000_000] {
            let t = triangular(x);
            assert_eq!(band_of(t), x);
            assert_eq!(band_of(t - 1), x - 1);
            assert_eq!(band_of(t + x), x);
        }
    }

    #[test]
    fn test_slice_at_abcd() {
        assert_eq!(slice_at(4, 0), Some(SliceDescriptor { start: 0, len: 4 }));
        assert_eq!(slice_at(4, 1), Some(SliceDescriptor { start: 0, len: 3 }));
        assert_eq!(slice_at(4, 2), Some(SliceDescriptor { start: 1, len: 3 }));
        assert_eq!(slice_at(4, 9), Some(SliceDescriptor { start: 3, len: 1 }));
        assert_eq!(slice_at(4, 10), None);
    }

    #[test]
    fn test_slice_at_empty_sequence() {
        assert_eq!(slice_at(0, 0), None);
        assert_eq!(slice_at(0, 7), None);
    }

    #[test]
    fn test_slice_at_is_total_and_bijective() {
        for n in 1..=60 {
            let mut seen = HashSet::new();
            for i in 0..triangular(n) {
                let d = slice_at(n, i).expect("index within T(n)");
                assert!(d.len >= 1);
                assert!(d.end() <= n);
                assert!(seen.insert(d), "duplicate slice {:?} for n={}", d, n);
            }
            assert_eq!(seen.len(), triangular(n));
            for start in 0..n {
                for len in 1..=(n - start) {
                    assert!(seen.contains(&SliceDescriptor { start, len }));
                }
            }
        }
    }

    #[test]
    fn test_subslices_view() {
        let base = [10, 20, 30];
        let view = Subslices::new(&base);

        assert_eq!(view.len(), 6);
        assert!(!view.is_empty());
        assert_eq!(view.get(0), Some(&base[..]));
        assert_eq!(view.get(5), Some(&base[2..]));
        assert_eq!(view.get(6), None);

        let all: Vec<&[i32]> = view.iter().collect();
        assert_eq!(
            all,
            vec![
                &[10, 20, 30][..],
                &[10, 20][..],
                &[20, 30][..],
                &[10][..],
                &[20][..],
                &[30][..],
            ]
        );
        assert_eq!(view.iter().len(), 6);
    }

    #[test]
    fn test_subslices_over_owned_elements() {
        let base = vec![String::from("x"), String::new(), String::from("yz")];
        let view = Subslices::new(&base);
        let copy = view;

        let all: Vec<&[String]> = view.iter().collect();
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], &base[..]);
        assert_eq!(copy.iter().last(), Some(&base[2..]));

        let single = [String::new()];
        let mut iter = Subslices::new(&single).iter();
        let cloned = iter.clone();
        assert_eq!(iter.next(), Some(&single[..]));
        assert_eq!(iter.next(), None);
        assert_eq!(cloned.count(), 1);
    }

    #[test]
    fn test_subslices_sample_proper_never_returns_whole() {
        let base: Vec<u32> = (0..8).collect();
        let view = Subslices::new(&base);
        let mut rng = create_seeded_rng(7);

        for _ in 0..500 {
            let slice = view.sample_proper(&mut rng).expect("base has 8 elements");
            assert!(slice.len() < base.len());
            assert!(!slice.is_empty());
        }
    }

    #[test]
    fn test_sample_proper_degenerate_bases() {
        let mut rng = create_seeded_rng(1);
        let empty: [u8; 0] = [];
        assert!(Subslices::new(&empty).sample_proper(&mut rng).is_none());
        assert!(Subslices::new(&[1u8]).sample_proper(&mut rng).is_none());
        assert!(Substrings::new("").sample_proper(&mut rng).is_none());
        assert!(Substrings::new("x").sample_proper(&mut rng).is_none());
    }

    #[test]
    fn test_substrings_count_chars_not_bytes() {
        let view = Substrings::new("h\u{e9}\u{ff}");
        assert_eq!(view.char_count(), 3);
        assert_eq!(view.len(), 6);
        assert_eq!(view.get(0), Some("h\u{e9}\u{ff}"));
        assert_eq!(view.get(2), Some("\u{e9}\u{ff}"));
        assert_eq!(view.get(4), Some("\u{e9}"));

        let collected: HashSet<&str> = view.iter().collect();
        assert_eq!(collected.len(), 6);
    }

    #[test]
    fn test_substrings_abcd() {
        let view = Substrings::new("abcd");
        let all: Vec<&str> = view.iter().collect();
        assert_eq!(
            all,
            vec!["abcd", "abc", "bcd", "ab", "bc", "cd", "a", "b", "c", "d"]
        );
    }
}
