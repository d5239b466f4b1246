use thiserror::Error;

/// Why the small integer region could not be reserved.
///
/// Reservation happens once per process, so the same error is handed to
/// every caller that asks for the region afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum ReserveError {
    #[error("cannot reserve {len:#x} bytes of address space on this target: {reason}")]
    Unsupported { len: u64, reason: &'static str },
    #[error("mmap refused to reserve {len:#x} bytes of address space (errno {errno})")]
    Denied { len: u64, errno: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntError {
    #[error("{0} does not fit in a small integer")]
    SmallOutOfRange(i64),
    #[error("{0} fits in a small integer and must not be boxed")]
    BigInRange(i32),
    #[error("invalid integer literal {0:?}")]
    Parse(String),
}
