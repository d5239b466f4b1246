//! Bijection between `i32` values and byte offsets in a 2^32 byte region.
//!
//! `i32::MIN` sits at offset zero and `i32::MAX` at the last byte, so the
//! offset of `x` is `x - i32::MIN`. Neither direction touches memory.

/// Length of the reserved region: one address per `i32` value.
pub const REGION_LEN: u64 = 1 << 32;

#[inline]
pub const fn small_offset(x: i32) -> u32 {
    x.wrapping_sub(i32::MIN) as u32
}

#[inline]
pub const fn small_from_offset(offset: u32) -> i32 {
    (offset as i32).wrapping_add(i32::MIN)
}

/// Address standing for `x` in a region starting at `base`.
#[inline]
pub fn encode_small(base: usize, x: i32) -> usize {
    base + small_offset(x) as usize
}

/// Inverse of [`encode_small`]. `None` means the address lies outside the
/// region and therefore belongs to a real allocation.
#[cfg(target_pointer_width = "64")]
#[inline]
pub fn decode_small(base: usize, addr: usize) -> Option<i32> {
    let offset = addr.wrapping_sub(base) as u64;
    (offset < REGION_LEN).then(|| small_from_offset(offset as u32))
}

/// A 2^32 byte region cannot be reserved in a smaller address space, so no
/// address is ever small here.
#[cfg(not(target_pointer_width = "64"))]
#[inline]
pub fn decode_small(_base: usize, _addr: usize) -> Option<i32> {
    None
}
