//! The process wide small integer region.
//!
//! Reserved at most once, on first use, and never released. Every address
//! inside it stands for an `i32`, and because the OS owns the range no
//! allocator can ever place an object there.

use std::sync::OnceLock;

use log::{debug, warn};

use crate::{
    Protection, REGION_LEN, ReserveError, decode_small, encode_small, reserve_address_space,
};

static REGION: OnceLock<Result<ReservedRegion, ReserveError>> = OnceLock::new();

#[derive(Debug, Default, Clone)]
pub struct RegionCreateInfo {
    pub protection: Option<Protection>,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RegionSettings {
    protection: Protection,
}

impl RegionSettings {
    pub fn protection(&self) -> Protection {
        self.protection
    }
}

impl From<&RegionCreateInfo> for RegionSettings {
    fn from(info: &RegionCreateInfo) -> Self {
        let default = Self::default();
        Self {
            protection: info.protection.unwrap_or(default.protection),
        }
    }
}

#[derive(Debug)]
pub struct ReservedRegion {
    base: usize,
    settings: RegionSettings,
}

impl ReservedRegion {
    /// The region with default settings, reserving it if nobody has yet.
    pub fn global() -> Result<&'static Self, ReserveError> {
        Self::install(RegionCreateInfo::default())
    }

    /// Reserve the region with `info` unless it already exists. Concurrent
    /// callers block until the first one finishes and all of them observe
    /// the same outcome, including a failed reservation.
    pub fn install(info: RegionCreateInfo) -> Result<&'static Self, ReserveError> {
        let settings = RegionSettings::from(&info);
        match REGION.get_or_init(|| Self::reserve(settings)) {
            Ok(region) => {
                if info.protection.is_some() && region.settings != settings {
                    debug!(
                        "region already reserved with {:?}, ignoring {:?}",
                        region.settings,
                        settings
                    );
                }
                Ok(region)
            }
            Err(err) => Err(err.clone()),
        }
    }

    /// The region if reservation succeeded, reserving it on first use.
    #[inline]
    pub fn current() -> Option<&'static Self> {
        REGION
            .get_or_init(|| Self::reserve(RegionSettings::default()))
            .as_ref()
            .ok()
    }

    /// The region if it has already been reserved successfully. Never
    /// triggers a reservation.
    #[inline]
    pub fn installed() -> Option<&'static Self> {
        REGION.get().and_then(|region| region.as_ref().ok())
    }

    fn reserve(settings: RegionSettings) -> Result<Self, ReserveError> {
        match reserve_address_space(REGION_LEN, settings.protection) {
            Ok(ptr) => {
                let base = ptr.as_ptr().addr();
                debug!(
                    "reserved small integer region {:#x}..{:#x} ({:?})",
                    base,
                    base + (REGION_LEN - 1) as usize,
                    settings.protection
                );
                Ok(Self { base, settings })
            }
            Err(err) => {
                warn!("{err}; small integers fall back to boxed payloads");
                Err(err)
            }
        }
    }

    #[inline]
    pub fn base(&self) -> usize {
        self.base
    }

    #[inline]
    pub fn size(&self) -> u64 {
        REGION_LEN
    }

    #[inline]
    pub fn settings(&self) -> RegionSettings {
        self.settings
    }

    #[inline]
    pub fn contains(&self, addr: usize) -> bool {
        decode_small(self.base, addr).is_some()
    }

    #[inline]
    pub fn encode(&self, x: i32) -> usize {
        encode_small(self.base, x)
    }

    #[inline]
    pub fn decode(&self, addr: usize) -> Option<i32> {
        decode_small(self.base, addr)
    }
}
