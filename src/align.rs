use crate::alignment::Alignment;

/// Returns the smallest multiple of `alignment` that can hold `size` bytes, or
/// `None` if that multiple doesn't fit in `usize`. A request of 0 bytes still
/// takes one full alignment unit, the shim never asks the platform for an
/// empty aligned block.
///
/// # Examples
///
/// ```rust
/// use pagealloc::{rounded_size, Alignment};
///
/// let page = Alignment::new(16384).unwrap();
///
/// assert_eq!(rounded_size(0, page), Some(16384));
/// assert_eq!(rounded_size(1, page), Some(16384));
/// assert_eq!(rounded_size(16384, page), Some(16384));
/// assert_eq!(rounded_size(16385, page), Some(32768));
/// assert_eq!(rounded_size(usize::MAX, page), None);
/// ```
#[inline]
pub fn rounded_size(size: usize, alignment: Alignment) -> Option<usize> {
    if size == 0 {
        return Some(alignment.get());
    }

    size.checked_add(alignment.mask())
        .map(|padded| padded & !alignment.mask())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_rounded_size() {
        let alignment = Alignment::new(4096).unwrap();

        let mut roundings = Vec::new();

        for i in 0..10 {
            // (1..=4096), (4097..=8192), (8193..=12288) and so on.
            let sizes = (alignment.get() * i + 1)..=(alignment.get() * (i + 1));
            let expected = alignment.get() * (i + 1);
            roundings.push((sizes, expected));
        }

        for (sizes, expected) in roundings {
            for size in sizes {
                assert_eq!(Some(expected), rounded_size(size, alignment));
            }
        }
    }

    #[test]
    fn zero_takes_one_unit() {
        let alignment = Alignment::new(16384).unwrap();
        assert_eq!(rounded_size(0, alignment), Some(16384));
    }

    #[test]
    fn exact_multiple_is_not_padded() {
        let alignment = Alignment::new(16384).unwrap();
        assert_eq!(rounded_size(16384, alignment), Some(16384));
        assert_eq!(rounded_size(16384 * 7, alignment), Some(16384 * 7));
    }

    #[test]
    fn overflow_is_reported() {
        let alignment = Alignment::new(16384).unwrap();
        assert_eq!(rounded_size(usize::MAX, alignment), None);
        assert_eq!(rounded_size(usize::MAX - 16382, alignment), None);
        // The largest multiple of the alignment still fits.
        let largest = usize::MAX & !alignment.mask();
        assert_eq!(rounded_size(largest, alignment), Some(largest));
    }

    proptest! {
        #[test]
        fn rounded_is_smallest_aligned_multiple(
            size in 0usize..(1 << 40),
            shift in 3u32..24,
        ) {
            let alignment = Alignment::new(1 << shift).unwrap();
            let rounded = rounded_size(size, alignment).unwrap();

            prop_assert_eq!(rounded % alignment.get(), 0);
            prop_assert!(rounded >= size);
            prop_assert!(rounded >= alignment.get());
            if size > 0 {
                prop_assert!(rounded - size < alignment.get());
            }
        }
    }
}
