use std::{
    alloc::{GlobalAlloc, Layout},
    ptr::{self, NonNull},
};

use log::{debug, trace};

use crate::{
    align::rounded_size,
    alignment::{Alignment, PAGE},
    error::AllocError,
    platform, AllocResult, Pointer,
};

/// Raw allocation interface with the contract of the C `malloc` family:
/// failures come back as `None`, nothing aborts, and freeing `None` does
/// nothing. Code that must allocate through a particular strategy takes one
/// of these explicitly instead of calling the global allocator.
///
/// # Safety
///
/// Implementors must return blocks valid for reads and writes of at least the
/// requested number of bytes, not overlapping any other live block, and
/// [`RawAllocator::free`] must accept every block they hand out.
pub unsafe trait RawAllocator {
    /// Returns an uninitialized block of at least `size` bytes.
    fn allocate(&self, size: usize) -> Pointer<u8>;

    /// Returns a block of at least `count * element_size` bytes, all zero.
    fn allocate_zeroed(&self, count: usize, element_size: usize) -> Pointer<u8>;

    /// Releases a block.
    ///
    /// # Safety
    ///
    /// `address` must be `None` or a block previously returned by this same
    /// allocator that hasn't been freed yet. The block can't be accessed
    /// afterwards.
    unsafe fn free(&self, address: Pointer<u8>);
}

/// The shim. Every block starts at a multiple of the alignment and spans a
/// whole number of alignment units:
///
/// ```text
///  0x0000 +------------------------+  <---+
///         |  requested bytes       |      |
///         |          ...           |      | rounded size, multiple of
///         +------------------------+      | the alignment
///         |  padding (unspecified) |      |
///  0x4000 +------------------------+  <---+
/// ```
///
/// Zero-byte requests still take one unit. Blocks come straight from the
/// platform aligned allocation primitive, there's no caching or pooling, so
/// [`PageAligned::free`] is a passthrough.
///
/// # Examples
///
/// ## Standalone
///
/// ```rust
/// use pagealloc::{Alignment, PageAligned};
///
/// let shim = PageAligned::with_alignment(Alignment::new(16384).unwrap());
///
/// let block = shim.try_allocate(1).unwrap();
/// assert_eq!(block.len(), 16384);
/// assert_eq!(block.as_ptr() as *mut u8 as usize % 16384, 0);
///
/// unsafe { shim.free(Some(block.cast())) };
/// ```
///
/// ## Global allocator
///
/// ```no_run
/// use pagealloc::PageAligned;
///
/// #[global_allocator]
/// static ALLOCATOR: PageAligned = PageAligned::new();
///
/// fn main() {
///     let num = Box::new(5);
///     assert_eq!(*num, 5);
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageAligned {
    alignment: Alignment,
}

impl PageAligned {
    /// Shim aligned to the build-time [`crate::PAGE_ALIGNMENT`].
    pub const fn new() -> Self {
        Self { alignment: PAGE }
    }

    /// Shim aligned to some other boundary.
    pub const fn with_alignment(alignment: Alignment) -> Self {
        Self { alignment }
    }

    /// Boundary every block starts on.
    pub const fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Number of bytes actually requested from the platform for `size`, or
    /// `None` if rounding overflows.
    #[inline]
    pub fn rounded_size(&self, size: usize) -> Option<usize> {
        rounded_size(size, self.alignment)
    }

    /// Returns a block of [`Self::rounded_size`] bytes aligned to
    /// [`Self::alignment`]. The contents are uninitialized.
    pub fn try_allocate(&self, size: usize) -> AllocResult {
        let result = unsafe { self.request(self.alignment, size) };

        match &result {
            Ok(block) => trace!("allocate {size} -> {} bytes at {block:?}", block.len()),
            Err(err) => debug!("allocation of {size} bytes failed: {err}"),
        }

        result
    }

    /// Same as [`Self::try_allocate`], but the first `count * element_size`
    /// bytes are zero. Bytes past that up to the rounded size are left as the
    /// platform returned them.
    pub fn try_allocate_zeroed(&self, count: usize, element_size: usize) -> AllocResult {
        let total = count.checked_mul(element_size).ok_or_else(|| {
            debug!("zeroed allocation of {count} x {element_size} bytes overflows");
            AllocError::Overflow
        })?;

        let block = self.try_allocate(total)?;
        unsafe { block.cast::<u8>().as_ptr().write_bytes(0, total) };

        Ok(block)
    }

    /// Raw form of [`Self::try_allocate`].
    #[inline]
    pub fn allocate(&self, size: usize) -> Pointer<u8> {
        self.try_allocate(size).ok().map(|block| block.cast())
    }

    /// Raw form of [`Self::try_allocate_zeroed`].
    #[inline]
    pub fn allocate_zeroed(&self, count: usize, element_size: usize) -> Pointer<u8> {
        self.try_allocate_zeroed(count, element_size)
            .ok()
            .map(|block| block.cast())
    }

    /// Returns a block to the platform. `None` is ignored.
    ///
    /// # Safety
    ///
    /// `address` must be `None` or come from one of the allocation methods of
    /// a [`PageAligned`] (any alignment) and not have been freed already.
    #[inline]
    pub unsafe fn free(&self, address: Pointer<u8>) {
        if let Some(address) = address {
            trace!("free {address:?}");
            platform::return_aligned(address);
        }
    }

    /// Rounds `size` up to `alignment` and asks the platform for the block.
    ///
    /// Must not log: this is also the [`GlobalAlloc`] path, and a logger that
    /// allocates would call straight back into it.
    unsafe fn request(&self, alignment: Alignment, size: usize) -> AllocResult {
        let rounded = rounded_size(size, alignment).ok_or(AllocError::Overflow)?;

        match platform::request_aligned(alignment, rounded) {
            Some(address) => Ok(NonNull::slice_from_raw_parts(address, rounded)),
            None => Err(AllocError::Exhausted {
                size: rounded,
                alignment: alignment.get(),
            }),
        }
    }

    /// Alignment that satisfies both the shim and `layout`. Both are powers of
    /// two, so the larger one is a multiple of the smaller one.
    #[inline]
    fn alignment_for(&self, layout: Layout) -> Alignment {
        Alignment::new(layout.align()).map_or(self.alignment, |align| align.max(self.alignment))
    }
}

impl Default for PageAligned {
    fn default() -> Self {
        PageAligned::new()
    }
}

unsafe impl RawAllocator for PageAligned {
    fn allocate(&self, size: usize) -> Pointer<u8> {
        PageAligned::allocate(self, size)
    }

    fn allocate_zeroed(&self, count: usize, element_size: usize) -> Pointer<u8> {
        PageAligned::allocate_zeroed(self, count, element_size)
    }

    unsafe fn free(&self, address: Pointer<u8>) {
        PageAligned::free(self, address)
    }
}

unsafe impl GlobalAlloc for PageAligned {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        match self.request(self.alignment_for(layout), layout.size()) {
            Ok(address) => address.cast().as_ptr(),
            Err(_) => ptr::null_mut(),
        }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let address = self.alloc(layout);
        if !address.is_null() {
            address.write_bytes(0, layout.size());
        }

        address
    }

    unsafe fn dealloc(&self, address: *mut u8, _layout: Layout) {
        // `free` logs, go to the platform directly.
        if let Some(address) = NonNull::new(address) {
            platform::return_aligned(address);
        }
    }
}

/// Passthrough to the platform `malloc`, `calloc` and `free`, with no extra
/// alignment or rounding. This is what [`DefaultAllocator`] resolves to when
/// the `runtime-pagesize` feature is off.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SystemMalloc;

unsafe impl RawAllocator for SystemMalloc {
    fn allocate(&self, size: usize) -> Pointer<u8> {
        unsafe { platform::request(size) }
    }

    fn allocate_zeroed(&self, count: usize, element_size: usize) -> Pointer<u8> {
        unsafe { platform::request_zeroed(count, element_size) }
    }

    unsafe fn free(&self, address: Pointer<u8>) {
        if let Some(address) = address {
            platform::return_memory(address);
        }
    }
}

/// Allocator selected by the build. [`PageAligned`] with the
/// `runtime-pagesize` feature, [`SystemMalloc`] without it.
#[cfg(feature = "runtime-pagesize")]
pub type DefaultAllocator = PageAligned;

/// Allocator selected by the build. [`PageAligned`] with the
/// `runtime-pagesize` feature, [`SystemMalloc`] without it.
#[cfg(not(feature = "runtime-pagesize"))]
pub type DefaultAllocator = SystemMalloc;

/// Instance of [`DefaultAllocator`].
#[cfg(feature = "runtime-pagesize")]
pub const fn default_allocator() -> DefaultAllocator {
    PageAligned::new()
}

/// Instance of [`DefaultAllocator`].
#[cfg(not(feature = "runtime-pagesize"))]
pub const fn default_allocator() -> DefaultAllocator {
    SystemMalloc
}
