//! Tagged<B>: one machine word that is either a small integer or an owned
//! `Box<B>`.
//!
//! A small integer is an address inside the [`ReservedRegion`], never
//! dereferenced. Anything outside the region is a real heap pointer. There
//! is no tag bit, the region bounds check is the discriminant.
//!
//! When the region could not be reserved every value is boxed, and payloads
//! that fit an `i32` decode as small again, so callers see the same values
//! in both modes.
use std::{
    fmt,
    marker::PhantomData,
    ptr::{self, NonNull},
};

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::{IntError, ReservedRegion};

/// Heap payload of a [`Tagged`] value.
pub trait Payload: From<i32> {
    /// The payload as an `i32`, if it fits.
    fn to_small(&self) -> Option<i32>;
}

impl Payload for BigInt {
    #[inline]
    fn to_small(&self) -> Option<i32> {
        self.to_i32()
    }
}

/// Borrowed view of a decoded [`Tagged`].
#[derive(Debug, PartialEq, Eq)]
pub enum IntRef<'a, B> {
    Small(i32),
    Big(&'a B),
}

// only holds an i32 or a shared reference, so copyable for any B
impl<B> Clone for IntRef<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for IntRef<'_, B> {}

#[repr(transparent)]
pub struct Tagged<B: Payload> {
    ptr: NonNull<B>,
    _marker: PhantomData<Box<B>>,
}

pub type TaggedInt = Tagged<BigInt>;

// SAFETY: a Tagged either owns a Box<B> or holds an address that is never
// dereferenced
unsafe impl<B: Payload + Send> Send for Tagged<B> {}
unsafe impl<B: Payload + Sync> Sync for Tagged<B> {}

impl<B: Payload> Tagged<B> {
    /// Encode `x` without allocating, reserving the region on first use.
    #[inline]
    pub fn make_small(x: i32) -> Self {
        Self::make_small_in(ReservedRegion::current(), x)
    }

    /// Like [`Tagged::make_small`], rejecting values outside the `i32`
    /// range.
    pub fn try_make_small(x: i64) -> Result<Self, IntError> {
        i32::try_from(x)
            .map(Self::make_small)
            .map_err(|_| IntError::SmallOutOfRange(x))
    }

    /// Take ownership of a payload that does not fit an `i32`.
    pub fn make_big(big: B) -> Result<Self, IntError> {
        match big.to_small() {
            Some(x) => Err(IntError::BigInRange(x)),
            None => Ok(Self::from_box_unchecked(Box::new(big))),
        }
    }

    /// Like [`Tagged::make_big`] but keeps the caller's allocation, so
    /// [`Tagged::get`] hands back this exact payload.
    pub fn make_boxed(big: Box<B>) -> Result<Self, IntError> {
        match big.to_small() {
            Some(x) => Err(IntError::BigInRange(x)),
            None => Ok(Self::from_box_unchecked(big)),
        }
    }

    pub(crate) fn make_small_in(region: Option<&ReservedRegion>, x: i32) -> Self {
        match region {
            Some(region) => {
                let addr = region.encode(x);
                // SAFETY: the region comes from a successful mmap, which never
                // maps page zero
                let ptr = unsafe { NonNull::new_unchecked(ptr::without_provenance_mut(addr)) };
                Self {
                    ptr,
                    _marker: PhantomData,
                }
            }
            None => Self::from_box_unchecked(Box::new(B::from(x))),
        }
    }

    pub(crate) fn from_box_unchecked(big: Box<B>) -> Self {
        Self {
            ptr: NonNull::from(Box::leak(big)),
            _marker: PhantomData,
        }
    }

    /// Decode into `(value, None)` for a small integer or `(0, Some(big))`
    /// for a boxed payload.
    #[inline]
    pub fn get(&self) -> (i64, Option<&B>) {
        match self.as_int_ref() {
            IntRef::Small(x) => (i64::from(x), None),
            IntRef::Big(big) => (0, Some(big)),
        }
    }

    #[inline]
    pub fn as_int_ref(&self) -> IntRef<'_, B> {
        self.decode_in(ReservedRegion::installed())
    }

    pub(crate) fn decode_in(&self, region: Option<&ReservedRegion>) -> IntRef<'_, B> {
        match region {
            Some(region) => match region.decode(self.addr()) {
                Some(x) => IntRef::Small(x),
                // SAFETY: outside the region the pointer came from a Box<B>
                None => IntRef::Big(unsafe { self.ptr.as_ref() }),
            },
            None => {
                // SAFETY: without a region every value is boxed
                let big = unsafe { self.ptr.as_ref() };
                match big.to_small() {
                    Some(x) => IntRef::Small(x),
                    None => IntRef::Big(big),
                }
            }
        }
    }

    /// Whether this value uses the allocation free encoding.
    #[inline]
    pub fn is_inline(&self) -> bool {
        ReservedRegion::installed()
            .is_some_and(|r| r.contains(self.addr()))
    }

    /// The raw word. For small integers this is a region address.
    #[inline]
    pub fn addr(&self) -> usize {
        self.ptr.as_ptr().addr()
    }
}

impl<B: Payload> Drop for Tagged<B> {
    fn drop(&mut self) {
        if self.is_inline() {
            return;
        }
        // SAFETY: every value outside the region owns a leaked Box<B>
        drop(unsafe { Box::from_raw(self.ptr.as_ptr()) });
    }
}

// cloning a big value clones the payload, never the ownership
impl<B: Payload + Clone> Clone for Tagged<B> {
    fn clone(&self) -> Self {
        if self.is_inline() {
            return Self {
                ptr: self.ptr,
                _marker: PhantomData,
            };
        }
        // SAFETY: see Drop
        let big = unsafe { self.ptr.as_ref() };
        Self::from_box_unchecked(Box::new(big.clone()))
    }
}

impl<B: Payload + fmt::Debug> fmt::Debug for Tagged<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_int_ref() {
            IntRef::Small(x) => f.debug_tuple("Small").field(&x).finish(),
            IntRef::Big(big) => f.debug_tuple("Big").field(big).finish(),
        }
    }
}
