use std::ptr::NonNull;

use crate::ReserveError;

/// Access rights of a reserved mapping. The pages are never touched, so
/// anything above `None` only widens what a stray access could do.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Protection {
    #[default]
    None,
    Read,
}

#[cfg(all(unix, target_pointer_width = "64"))]
mod unix {
    use core::ffi::c_int;

    use super::Protection;

    #[cfg(any(target_os = "linux", target_os = "android"))]
    const RESERVE_FLAGS: c_int = libc::MAP_PRIVATE | libc::MAP_ANON | libc::MAP_NORESERVE;
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    const RESERVE_FLAGS: c_int = libc::MAP_PRIVATE | libc::MAP_ANON;

    impl Protection {
        fn as_prot(self) -> c_int {
            match self {
                Protection::None => libc::PROT_NONE,
                Protection::Read => libc::PROT_READ,
            }
        }
    }

    /// anonymous private mapping without backing store
    /// # Safety
    /// null must be checked, the mapping is never unmapped by this crate
    #[inline]
    pub unsafe fn anonymous_reserve(len: usize, prot: Protection) -> *mut u8 {
        // SAFETY: no fixed address is requested, so no existing mapping
        // can be replaced
        let p = unsafe {
            libc::mmap(
                core::ptr::null_mut(),
                len,
                prot.as_prot(),
                RESERVE_FLAGS,
                -1,
                0,
            )
        };
        if p == libc::MAP_FAILED {
            core::ptr::null_mut()
        } else {
            p.cast()
        }
    }
}

/// Reserve `len` bytes of address space that no allocator will ever be
/// handed. Only the addresses are meant to be used.
#[cfg(all(unix, target_pointer_width = "64"))]
pub fn reserve_address_space(
    len: u64,
    protection: Protection,
) -> Result<NonNull<u8>, ReserveError> {
    let size = usize::try_from(len).map_err(|_| ReserveError::Unsupported {
        len,
        reason: "length exceeds the address space",
    })?;
    // SAFETY: the result is null checked below
    let ptr = unsafe { unix::anonymous_reserve(size, protection) };
    NonNull::new(ptr).ok_or_else(|| ReserveError::Denied {
        len,
        errno: std::io::Error::last_os_error().raw_os_error().unwrap_or(0),
    })
}

#[cfg(not(all(unix, target_pointer_width = "64")))]
pub fn reserve_address_space(
    len: u64,
    _protection: Protection,
) -> Result<NonNull<u8>, ReserveError> {
    Err(ReserveError::Unsupported {
        len,
        reason: "anonymous reservations need a 64-bit unix target",
    })
}
