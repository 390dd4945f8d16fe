use std::ptr::NonNull;

use crate::{alignment::Alignment, Pointer};

/// Abstraction for platform specific memory handling. The shim doesn't manage
/// memory itself, it only needs the C runtime to hand out blocks at a given
/// alignment and take them back, plus the plain `malloc` family for builds
/// where the shim is switched off.
trait PlatformSpecificMemory {
    /// Requests `size` bytes whose first address is a multiple of `alignment`.
    unsafe fn request_aligned(alignment: Alignment, size: usize) -> Pointer<u8>;

    /// Returns a block obtained from [`Self::request_aligned`].
    unsafe fn return_aligned(address: NonNull<u8>);

    /// Plain `malloc`.
    unsafe fn request(size: usize) -> Pointer<u8>;

    /// Plain `calloc`.
    unsafe fn request_zeroed(count: usize, size: usize) -> Pointer<u8>;

    /// Plain `free`, for blocks from [`Self::request`] and
    /// [`Self::request_zeroed`].
    unsafe fn return_memory(address: NonNull<u8>);
}

/// Zero sized type that implements [`PlatformSpecificMemory`] for each OS.
pub(crate) struct Platform;

/// Convinience wrapper for [`PlatformSpecificMemory::request_aligned`].
#[inline]
pub(crate) unsafe fn request_aligned(alignment: Alignment, size: usize) -> Pointer<u8> {
    Platform::request_aligned(alignment, size)
}

/// Convinience wrapper for [`PlatformSpecificMemory::return_aligned`].
#[inline]
pub(crate) unsafe fn return_aligned(address: NonNull<u8>) {
    Platform::return_aligned(address)
}

/// Convinience wrapper for [`PlatformSpecificMemory::request`].
#[inline]
pub(crate) unsafe fn request(size: usize) -> Pointer<u8> {
    Platform::request(size)
}

/// Convinience wrapper for [`PlatformSpecificMemory::request_zeroed`].
#[inline]
pub(crate) unsafe fn request_zeroed(count: usize, size: usize) -> Pointer<u8> {
    Platform::request_zeroed(count, size)
}

/// Convinience wrapper for [`PlatformSpecificMemory::return_memory`].
#[inline]
pub(crate) unsafe fn return_memory(address: NonNull<u8>) {
    Platform::return_memory(address)
}

#[cfg(unix)]
mod unix {
    use std::ptr::{self, NonNull};

    use super::{Platform, PlatformSpecificMemory};
    use crate::{alignment::Alignment, Pointer};

    impl PlatformSpecificMemory for Platform {
        unsafe fn request_aligned(alignment: Alignment, size: usize) -> Pointer<u8> {
            let mut address = ptr::null_mut();

            // Nonzero return means ENOMEM or EINVAL, `address` is untouched.
            // See https://man7.org/linux/man-pages/man3/posix_memalign.3.html
            match libc::posix_memalign(&mut address, alignment.get(), size) {
                0 => NonNull::new(address.cast()),
                _ => None,
            }
        }

        unsafe fn return_aligned(address: NonNull<u8>) {
            libc::free(address.as_ptr().cast())
        }

        unsafe fn request(size: usize) -> Pointer<u8> {
            NonNull::new(libc::malloc(size).cast())
        }

        unsafe fn request_zeroed(count: usize, size: usize) -> Pointer<u8> {
            NonNull::new(libc::calloc(count, size).cast())
        }

        unsafe fn return_memory(address: NonNull<u8>) {
            libc::free(address.as_ptr().cast())
        }
    }
}

#[cfg(windows)]
mod windows {
    use std::ptr::NonNull;

    use super::{Platform, PlatformSpecificMemory};
    use crate::{alignment::Alignment, Pointer};

    impl PlatformSpecificMemory for Platform {
        unsafe fn request_aligned(alignment: Alignment, size: usize) -> Pointer<u8> {
            // The CRT has no posix_memalign. Blocks from `_aligned_malloc` must
            // go back through `_aligned_free`, never plain `free`. See
            // https://learn.microsoft.com/en-us/cpp/c-runtime-library/reference/aligned-malloc
            NonNull::new(libc::aligned_malloc(size, alignment.get()).cast())
        }

        unsafe fn return_aligned(address: NonNull<u8>) {
            libc::aligned_free(address.as_ptr().cast())
        }

        unsafe fn request(size: usize) -> Pointer<u8> {
            NonNull::new(libc::malloc(size).cast())
        }

        unsafe fn request_zeroed(count: usize, size: usize) -> Pointer<u8> {
            NonNull::new(libc::calloc(count, size).cast())
        }

        unsafe fn return_memory(address: NonNull<u8>) {
            libc::free(address.as_ptr().cast())
        }
    }
}
