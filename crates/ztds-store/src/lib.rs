#![no_std]
#[cfg(feature = "std")]
extern crate std;

pub mod backend;
pub mod bridge;
pub mod memory;
#[cfg(feature = "std")]
pub mod fs_backend;

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use log::warn;
use zeroize::Zeroizing;
use ztds_core::{DsError, DsResult, ObjectName, StateObjectType, PUT_OK};
use ztds_hal::DataStore;

pub use backend::{ReadChunk, StorageBackend};
pub use bridge::ListenerBridge;
pub use memory::MemoryBackend;

extern crate alloc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Buffer handed to the get listener on each call.
    pub read_chunk: usize,
    /// Objects reporting a larger size are refused.
    pub max_object_size: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            read_chunk: 4096,
            max_object_size: 1 << 20,
        }
    }
}

/// Typed access to a data store that is only reachable through the
/// listener callbacks.
pub struct CallbackStore {
    listener: Box<dyn DataStore>,
    config: StoreConfig,
}

impl CallbackStore {
    pub fn new(listener: Box<dyn DataStore>, config: StoreConfig) -> Self {
        Self { listener, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Read a whole object, calling the listener with increasing offsets
    /// until the reported size has been collected.
    pub fn get(&self, name: &ObjectName) -> DsResult<Vec<u8>> {
        // Objects may be key material; scrub everything but the result.
        let mut chunk = Zeroizing::new(vec![0u8; self.config.read_chunk.max(1)]);
        let mut restarted = false;

        'object: loop {
            let mut out: Zeroizing<Vec<u8>> = Zeroizing::new(Vec::new());
            let mut expected: Option<u64> = None;

            loop {
                let mut size = [0u64; 1];
                let n = self.listener.on_data_store_get(
                    name.as_str(),
                    &mut chunk[..],
                    out.len() as u64,
                    &mut size,
                );
                if n < 0 {
                    return Err(DsError::from_sentinel(n));
                }
                let n = n as usize;
                if n > chunk.len() {
                    warn!("listener reported {} bytes into a {} byte buffer for {}", n, chunk.len(), name);
                    return Err(DsError::Corrupt);
                }

                let total = size[0];
                if total > self.config.max_object_size {
                    warn!("object {} is {} bytes, limit is {}", name, total, self.config.max_object_size);
                    return Err(DsError::Corrupt);
                }
                match expected {
                    None => {
                        expected = Some(total);
                        out.reserve(total as usize);
                    }
                    Some(prev) if prev != total => {
                        // Object replaced underneath us: start over once.
                        if restarted {
                            return Err(DsError::Corrupt);
                        }
                        restarted = true;
                        continue 'object;
                    }
                    Some(_) => {}
                }

                out.extend_from_slice(&chunk[..n]);
                let have = out.len() as u64;
                if have == total {
                    return Ok(core::mem::take(&mut *out));
                }
                if have > total || n == 0 {
                    warn!("short or overlong read of {}: {} of {} bytes", name, have, total);
                    return Err(DsError::Corrupt);
                }
            }
        }
    }

    /// Like [`get`](Self::get) but maps a missing object to `None`.
    pub fn get_opt(&self, name: &ObjectName) -> DsResult<Option<Vec<u8>>> {
        match self.get(name) {
            Ok(data) => Ok(Some(data)),
            Err(DsError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn put(&self, name: &ObjectName, data: &[u8], secure: bool) -> DsResult<()> {
        if self.listener.on_data_store_put(name.as_str(), data, secure) == PUT_OK {
            Ok(())
        } else {
            Err(DsError::StorageError)
        }
    }

    pub fn delete(&self, name: &ObjectName) -> DsResult<()> {
        if self.listener.on_delete(name.as_str()) == PUT_OK {
            Ok(())
        } else {
            Err(DsError::StorageError)
        }
    }

    /// Names of the objects directly below `prefix`.
    pub fn list(&self, prefix: &ObjectName) -> DsResult<Vec<ObjectName>> {
        let mut raw = Vec::new();
        if self.listener.on_data_store_list(prefix.as_str(), &mut raw) != PUT_OK {
            return Err(DsError::StorageError);
        }
        let mut names = Vec::with_capacity(raw.len());
        for name in raw {
            match ObjectName::new(&name) {
                Ok(n) => names.push(n),
                Err(_) => warn!("listener returned unsafe name {:?}, skipped", name),
            }
        }
        names.sort();
        Ok(names)
    }

    /// Ids of every stored object of a kind that lives in a directory
    /// (moons, peers, network configs). Unrelated files are ignored.
    pub fn list_state(&self, kind: StateObjectType) -> DsResult<Vec<[u64; 2]>> {
        let Some(dir) = kind.directory() else {
            return Err(DsError::InvalidState);
        };
        let prefix = ObjectName::new(dir)?;
        let mut ids = Vec::new();
        for name in self.list(&prefix)? {
            if let Ok((k, id)) = StateObjectType::from_name(name.as_str()) {
                if k == kind {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }

    pub fn get_state(&self, kind: StateObjectType, id: [u64; 2]) -> DsResult<Option<Vec<u8>>> {
        self.get_opt(&kind.object_name(id))
    }

    pub fn put_state(&self, kind: StateObjectType, id: [u64; 2], data: &[u8]) -> DsResult<()> {
        self.put(&kind.object_name(id), data, kind.is_secure())
    }

    pub fn delete_state(&self, kind: StateObjectType, id: [u64; 2]) -> DsResult<()> {
        self.delete(&kind.object_name(id))
    }
}
