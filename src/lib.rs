//! Page-aligned allocation for targets whose memory pages are larger than the
//! usual 4 KiB, such as Android devices with 16 KiB pages.
//!
//! [`PageAligned`] hands out blocks that start on a multiple of
//! [`PAGE_ALIGNMENT`] and whose size is rounded up to a whole number of
//! alignment units. [`SystemMalloc`] is the plain platform allocator. Both
//! implement [`RawAllocator`], and [`DefaultAllocator`] picks one at compile
//! time through the `runtime-pagesize` feature, so callers written against
//! [`DefaultAllocator`] cost nothing extra when the feature is off.

use std::ptr::NonNull;

mod align;
mod alignment;
mod allocator;
mod error;
pub mod ffi;
mod platform;

/// Non-null pointer to `T`. We use this in most cases instead of `*mut T`
/// because the compiler will yell at us if we don't write code for the `None`
/// case, which here is "allocation failed" or "nothing to free".
pub type Pointer<T> = Option<NonNull<T>>;

/// Shorter syntax for fallible allocation return types. The slice length is
/// the rounded size of the block.
pub type AllocResult = Result<NonNull<[u8]>, AllocError>;

pub use align::rounded_size;
pub use alignment::{Alignment, DEFAULT_PAGE_ALIGNMENT, PAGE, PAGE_ALIGNMENT};
pub use allocator::{default_allocator, DefaultAllocator, PageAligned, RawAllocator, SystemMalloc};
pub use error::{AlignmentError, AllocError};
