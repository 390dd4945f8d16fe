use thiserror::Error;

/// Reasons an aligned allocation request can fail. The raw entry points
/// collapse all of these into a null pointer; the `try_*` methods of
/// [`crate::PageAligned`] hand them back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    /// The platform allocator could not produce the block, either because
    /// memory is exhausted or because it rejected the alignment.
    #[error("platform allocator refused {size} bytes aligned to {alignment}")]
    Exhausted { size: usize, alignment: usize },

    /// `count * element_size`, or the size rounded up to the alignment,
    /// does not fit in `usize`.
    #[error("requested size overflows usize")]
    Overflow,
}

/// Returned by [`crate::Alignment::new`] for values the platform aligned
/// allocation primitive would refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AlignmentError {
    #[error("alignment {0} is not a power of two")]
    NotPowerOfTwo(usize),

    #[error("alignment {0} is smaller than the pointer size")]
    BelowPointerSize(usize),
}
