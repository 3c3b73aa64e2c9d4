use alloc::string::String;
use alloc::vec::Vec;
use log::{debug, warn};

use ztds_core::{DsError, ObjectName, GET_ERROR, PUT_ERROR, PUT_OK};
use ztds_hal::{DataStoreGetListener, DataStoreListListener, DataStorePutListener};

use crate::backend::StorageBackend;

/// Exposes a [`StorageBackend`] through the listener callbacks the node
/// calls, collapsing typed errors into the sentinel return codes.
pub struct ListenerBridge<B> {
    backend: B,
}

impl<B: StorageBackend> ListenerBridge<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_inner(self) -> B {
        self.backend
    }
}

impl<B: StorageBackend> DataStoreGetListener for ListenerBridge<B> {
    fn on_data_store_get(
        &self,
        name: &str,
        out_buffer: &mut [u8],
        buffer_index: u64,
        out_object_size: &mut [u64; 1],
    ) -> i64 {
        let name = match ObjectName::new(name) {
            Ok(n) => n,
            Err(_) => {
                warn!("refusing data store get for unsafe name {:?}", name);
                return GET_ERROR;
            }
        };

        match self.backend.read_at(&name, out_buffer, buffer_index) {
            Ok(chunk) => {
                out_object_size[0] = chunk.object_size;
                chunk.bytes_read as i64
            }
            Err(DsError::NotFound) => {
                debug!("data store object {} not found", name);
                DsError::NotFound.sentinel()
            }
            Err(e) => {
                warn!("data store get {} failed: {}", name, e);
                e.sentinel()
            }
        }
    }
}

impl<B: StorageBackend> DataStorePutListener for ListenerBridge<B> {
    fn on_data_store_put(&self, name: &str, data: &[u8], secure: bool) -> i32 {
        let Ok(name) = ObjectName::new(name) else {
            warn!("refusing data store put for unsafe name {:?}", name);
            return PUT_ERROR;
        };
        match self.backend.write(&name, data, secure) {
            Ok(()) => PUT_OK,
            Err(e) => {
                warn!("data store put {} failed: {}", name, e);
                PUT_ERROR
            }
        }
    }

    fn on_delete(&self, name: &str) -> i32 {
        let Ok(name) = ObjectName::new(name) else {
            warn!("refusing data store delete for unsafe name {:?}", name);
            return PUT_ERROR;
        };
        match self.backend.delete(&name) {
            Ok(()) => PUT_OK,
            Err(e) => {
                warn!("data store delete {} failed: {}", name, e);
                PUT_ERROR
            }
        }
    }
}

impl<B: StorageBackend> DataStoreListListener for ListenerBridge<B> {
    fn on_data_store_list(&self, prefix: &str, out_names: &mut Vec<String>) -> i32 {
        let Ok(prefix) = ObjectName::new(prefix) else {
            warn!("refusing data store list for unsafe prefix {:?}", prefix);
            return PUT_ERROR;
        };
        match self.backend.list(&prefix) {
            Ok(names) => {
                out_names.extend(names.into_iter().map(|n| String::from(n.as_str())));
                PUT_OK
            }
            Err(e) => {
                warn!("data store list {} failed: {}", prefix, e);
                PUT_ERROR
            }
        }
    }
}
