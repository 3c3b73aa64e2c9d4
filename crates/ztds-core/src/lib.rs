#![no_std]
#[cfg(feature = "std")]
extern crate std;
extern crate alloc;

mod name;
mod object;

pub use name::ObjectName;
pub use object::StateObjectType;

/// Returned by a get listener when the named object does not exist.
pub const GET_NOT_FOUND: i64 = -1;
/// Returned by a get listener on any other failure (storage, bad name).
pub const GET_ERROR: i64 = -2;

/// Put/delete listener return codes.
pub const PUT_OK: i32 = 0;
pub const PUT_ERROR: i32 = -1;

pub type DsResult<T> = Result<T, DsError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DsError {
    NotFound,
    InvalidName,
    StorageError,
    Corrupt,
    CryptoFailure,
    RngFailure,
    InvalidState,
}

impl DsError {
    /// Collapse into the two-value sentinel convention of the get callback.
    pub fn sentinel(&self) -> i64 {
        match self {
            DsError::NotFound => GET_NOT_FOUND,
            _ => GET_ERROR,
        }
    }

    /// Interpret a negative listener return value.
    pub fn from_sentinel(code: i64) -> Self {
        if code == GET_NOT_FOUND {
            DsError::NotFound
        } else {
            DsError::StorageError
        }
    }
}

impl core::fmt::Display for DsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            DsError::NotFound => "object not found",
            DsError::InvalidName => "invalid object name",
            DsError::StorageError => "storage access error",
            DsError::Corrupt => "object corrupt or inconsistent",
            DsError::CryptoFailure => "cryptographic failure",
            DsError::RngFailure => "random number generator failure",
            DsError::InvalidState => "invalid state",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DsError {}
