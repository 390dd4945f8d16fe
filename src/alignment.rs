//! Alignment constraints for page-aligned allocations. Every block handed out
//! by [`crate::PageAligned`] starts at an address that is a multiple of an
//! [`Alignment`], and its usable size is a multiple of it too. See
//! [`PAGE_ALIGNMENT`] for how the build picks the value.

use std::{ffi::c_void, fmt, mem};

use crate::error::AlignmentError;

/// Pointer size in bytes on the target architecture. `posix_memalign` refuses
/// any alignment that isn't a multiple of this, so neither do we accept one.
pub(crate) const POINTER_SIZE: usize = mem::size_of::<*const c_void>();

/// Alignment used when the build doesn't say otherwise. Devices with 16 KiB
/// pages need every allocation that may end up mapped or protected to start on
/// such a page boundary:
///
/// ```text
///           +--------------------+  <- 0x0000 (aligned)
///           |  block, 1 byte     |
///           |  requested ...     |
///           |  rounded to 16384  |
///           +--------------------+  <- 0x4000 (aligned)
///           |  next block        |
///           |        ...         |
///           +--------------------+  <- 0x8000 (aligned)
/// ```
pub const DEFAULT_PAGE_ALIGNMENT: usize = 16384;

/// Alignment in bytes of every shim allocation. This is
/// [`DEFAULT_PAGE_ALIGNMENT`] unless the `PAGEALLOC_ALIGNMENT` environment
/// variable is set to a decimal number when the crate is compiled. Values that
/// are not valid alignments fail the build.
pub const PAGE_ALIGNMENT: usize = parse_alignment(option_env!("PAGEALLOC_ALIGNMENT"));

/// [`PAGE_ALIGNMENT`], already validated.
pub const PAGE: Alignment = match Alignment::new(PAGE_ALIGNMENT) {
    Ok(alignment) => alignment,
    Err(AlignmentError::NotPowerOfTwo(_)) => panic!("PAGEALLOC_ALIGNMENT must be a power of two"),
    Err(AlignmentError::BelowPointerSize(_)) => {
        panic!("PAGEALLOC_ALIGNMENT must be at least the pointer size")
    }
};

/// Parses the build-time override. Runs in const context, so any error here
/// surfaces as a compile error.
const fn parse_alignment(value: Option<&str>) -> usize {
    let digits = match value {
        Some(value) => value.as_bytes(),
        None => return DEFAULT_PAGE_ALIGNMENT,
    };

    if digits.is_empty() {
        panic!("PAGEALLOC_ALIGNMENT is empty");
    }

    let mut parsed: usize = 0;
    let mut i = 0;
    while i < digits.len() {
        let digit = digits[i];
        if !digit.is_ascii_digit() {
            panic!("PAGEALLOC_ALIGNMENT must be a decimal integer");
        }
        parsed = match parsed.checked_mul(10) {
            Some(shifted) => match shifted.checked_add((digit - b'0') as usize) {
                Some(sum) => sum,
                None => panic!("PAGEALLOC_ALIGNMENT overflows usize"),
            },
            None => panic!("PAGEALLOC_ALIGNMENT overflows usize"),
        };
        i += 1;
    }

    parsed
}

/// A power of two, multiple of [`POINTER_SIZE`]. Holding one of these means
/// the platform's aligned allocation primitive will accept it as an alignment
/// argument.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Alignment(usize);

impl Alignment {
    /// Validates `bytes` as an alignment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pagealloc::{Alignment, AlignmentError};
    ///
    /// assert_eq!(Alignment::new(4096).unwrap().get(), 4096);
    /// assert_eq!(Alignment::new(3000), Err(AlignmentError::NotPowerOfTwo(3000)));
    /// assert_eq!(Alignment::new(1), Err(AlignmentError::BelowPointerSize(1)));
    /// ```
    pub const fn new(bytes: usize) -> Result<Self, AlignmentError> {
        if !bytes.is_power_of_two() {
            return Err(AlignmentError::NotPowerOfTwo(bytes));
        }

        // Both are powers of two, so "multiple of" is the same as ">=".
        if bytes < POINTER_SIZE {
            return Err(AlignmentError::BelowPointerSize(bytes));
        }

        Ok(Self(bytes))
    }

    /// Alignment in bytes.
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Mask of the low bits that must be zero in an aligned address.
    #[inline]
    pub(crate) const fn mask(self) -> usize {
        self.0 - 1
    }

    /// Whether `address` sits on this boundary.
    #[inline]
    pub fn is_aligned(self, address: *const u8) -> bool {
        address as usize & self.mask() == 0
    }
}

impl Default for Alignment {
    fn default() -> Self {
        PAGE
    }
}

impl fmt::Debug for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Alignment({})", self.0)
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<usize> for Alignment {
    type Error = AlignmentError;

    fn try_from(bytes: usize) -> Result<Self, Self::Error> {
        Self::new(bytes)
    }
}

impl From<Alignment> for usize {
    fn from(alignment: Alignment) -> usize {
        alignment.0
    }
}
