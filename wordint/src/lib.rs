mod codec;
mod error;
mod int;
mod region;
mod system;
mod tagged;

pub use codec::{REGION_LEN, decode_small, encode_small, small_from_offset, small_offset};
pub use error::{IntError, ReserveError};
pub use int::Int;
pub use region::{RegionCreateInfo, RegionSettings, ReservedRegion};
pub use system::{Protection, reserve_address_space};
pub use tagged::*;
