use alloc::format;
use alloc::string::String;

use crate::{DsError, DsResult, ObjectName};

const ADDRESS_MASK: u64 = 0xff_ffff_ffff;

/// Well-known state objects a node keeps in its data store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateObjectType {
    IdentityPublic,
    IdentitySecret,
    Planet,
    Moon,
    Peer,
    NetworkConfig,
}

impl StateObjectType {
    /// Canonical name for this object. `id[0]` carries the moon id, the
    /// peer address or the network id; `id[1]` is reserved.
    pub fn object_name(&self, id: [u64; 2]) -> ObjectName {
        let name = match self {
            StateObjectType::IdentityPublic => String::from("identity.public"),
            StateObjectType::IdentitySecret => String::from("identity.secret"),
            StateObjectType::Planet => String::from("planet"),
            StateObjectType::Moon => format!("moons.d/{:016x}.moon", id[0]),
            StateObjectType::Peer => format!("peers.d/{:010x}.peer", id[0] & ADDRESS_MASK),
            StateObjectType::NetworkConfig => format!("networks.d/{:016x}.conf", id[0]),
        };
        // Every generated form passes validation.
        ObjectName(name)
    }

    /// Directory holding every object of this kind, for kinds kept one
    /// file per id.
    pub fn directory(&self) -> Option<&'static str> {
        match self {
            StateObjectType::Moon => Some("moons.d"),
            StateObjectType::Peer => Some("peers.d"),
            StateObjectType::NetworkConfig => Some("networks.d"),
            _ => None,
        }
    }

    /// Objects that should only be readable by the owner of the store.
    pub fn is_secure(&self) -> bool {
        matches!(self, StateObjectType::IdentitySecret | StateObjectType::NetworkConfig)
    }

    /// Parse a canonical object name back into its type and id.
    pub fn from_name(name: &str) -> DsResult<(Self, [u64; 2])> {
        match name {
            "identity.public" => return Ok((StateObjectType::IdentityPublic, [0, 0])),
            "identity.secret" => return Ok((StateObjectType::IdentitySecret, [0, 0])),
            "planet" => return Ok((StateObjectType::Planet, [0, 0])),
            _ => {}
        }

        let (dir, file) = name.split_once('/').ok_or(DsError::InvalidName)?;
        let (kind, stem, width) = match dir {
            "moons.d" => (StateObjectType::Moon, file.strip_suffix(".moon"), 16),
            "peers.d" => (StateObjectType::Peer, file.strip_suffix(".peer"), 10),
            "networks.d" => (StateObjectType::NetworkConfig, file.strip_suffix(".conf"), 16),
            _ => return Err(DsError::InvalidName),
        };
        let stem = stem.ok_or(DsError::InvalidName)?;
        if stem.len() != width || !stem.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DsError::InvalidName);
        }
        let id = u64::from_str_radix(stem, 16).map_err(|_| DsError::InvalidName)?;
        Ok((kind, [id, 0]))
    }
}
