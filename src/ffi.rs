//! C entry points. C code built against a 16 KiB page target points its
//! `malloc`, `calloc` and `free` at these (a `-D` define or a one-line header
//! does it), and gets either the page-aligned shim or the plain platform
//! allocator depending on whether this crate was built with the
//! `runtime-pagesize` feature.

use std::{ffi::c_void, ptr::NonNull};

use crate::allocator::{default_allocator, RawAllocator};

/// `malloc` replacement. Returns null on failure.
#[no_mangle]
pub extern "C" fn pagealloc_malloc(size: usize) -> *mut c_void {
    match RawAllocator::allocate(&default_allocator(), size) {
        Some(address) => address.as_ptr().cast(),
        None => std::ptr::null_mut(),
    }
}

/// `calloc` replacement. Returns null on failure, including when
/// `count * size` overflows.
#[no_mangle]
pub extern "C" fn pagealloc_calloc(count: usize, size: usize) -> *mut c_void {
    match RawAllocator::allocate_zeroed(&default_allocator(), count, size) {
        Some(address) => address.as_ptr().cast(),
        None => std::ptr::null_mut(),
    }
}

/// `free` replacement. Null is ignored.
///
/// # Safety
///
/// `address` must be null or a pointer returned by [`pagealloc_malloc`] or
/// [`pagealloc_calloc`] that hasn't been freed yet.
#[no_mangle]
pub unsafe extern "C" fn pagealloc_free(address: *mut c_void) {
    RawAllocator::free(&default_allocator(), NonNull::new(address.cast()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malloc_and_free() {
        let address = pagealloc_malloc(100).cast::<u8>();
        assert!(!address.is_null());

        #[cfg(feature = "runtime-pagesize")]
        assert!(crate::PAGE.is_aligned(address));

        unsafe {
            address.write_bytes(3, 100);
            pagealloc_free(address.cast());
        }
    }

    #[test]
    fn calloc_zeroes() {
        let address = pagealloc_calloc(16, 4).cast::<u8>();
        assert!(!address.is_null());

        unsafe {
            for i in 0..64 {
                assert_eq!(*address.add(i), 0);
            }
            pagealloc_free(address.cast());
        }
    }

    #[test]
    fn calloc_overflow_returns_null() {
        assert!(pagealloc_calloc(usize::MAX, 16).is_null());
    }

    #[test]
    fn free_null_is_noop() {
        unsafe { pagealloc_free(std::ptr::null_mut()) };
    }
}
