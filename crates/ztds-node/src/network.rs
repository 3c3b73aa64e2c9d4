use alloc::vec::Vec;
use ztds_core::{DsError, DsResult};

/// Stored for a joined network that has no configuration yet.
pub const PLACEHOLDER_CONFIG: &[u8] = b"\n";

/// A stored configuration that is only whitespace means "joined, no config".
pub(crate) fn usable_config(config: Vec<u8>) -> Option<Vec<u8>> {
    if config.iter().all(|b| b.is_ascii_whitespace()) {
        None
    } else {
        Some(config)
    }
}

/// A joined virtual network and its last known configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub nwid: u64,
    pub config: Option<Vec<u8>>,
}

impl Network {
    pub fn new(nwid: u64, config: Option<Vec<u8>>) -> Self {
        Self { nwid, config }
    }

    /// The controller is the node whose address forms the top 40 bits.
    pub fn controller(&self) -> u64 {
        self.nwid >> 24
    }
}

/// Parse a 16 digit hex network id.
pub fn parse_nwid(s: &str) -> DsResult<u64> {
    if s.len() != 16 {
        return Err(DsError::InvalidName);
    }
    u64::from_str_radix(s, 16).map_err(|_| DsError::InvalidName)
}
