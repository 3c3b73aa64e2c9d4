#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use ztds_core::{GET_ERROR, GET_NOT_FOUND};

/// Callback used by the node to fetch an object from the data store.
///
/// Object names may contain forward slash separators. They never contain
/// `..` or a backslash, so they are safe to map onto a Unix-style path;
/// implementations should still return an error if either shows up.
///
/// INVARIANT: Must not block on anything owned by the node.
pub trait DataStoreGetListener: Send + Sync {
    /// Copy the object named `name` into `out_buffer`, starting at object
    /// offset `buffer_index`.
    ///
    /// Returns the number of bytes copied, [`GET_NOT_FOUND`] (-1) if the
    /// object does not exist or [`GET_ERROR`] (-2) on any other error. If the
    /// rest of the object does not fit, the buffer is filled completely and
    /// the caller asks again at a later offset. `out_object_size[0]` is set
    /// to the total object size whenever the object exists.
    fn on_data_store_get(
        &self,
        name: &str,
        out_buffer: &mut [u8],
        buffer_index: u64,
        out_object_size: &mut [u64; 1],
    ) -> i64;

    /// Query the total size of an object without copying anything.
    /// Returns the size, or the negative sentinel reported by the listener.
    fn object_size(&self, name: &str) -> Result<u64, i64> {
        let mut size = [0u64; 1];
        match self.on_data_store_get(name, &mut [], 0, &mut size) {
            n if n >= 0 => Ok(size[0]),
            GET_NOT_FOUND => Err(GET_NOT_FOUND),
            _ => Err(GET_ERROR),
        }
    }
}

/// Callback used by the node to persist or remove an object.
pub trait DataStorePutListener: Send + Sync {
    /// Store `data` under `name`, replacing any previous object. `secure`
    /// objects should only be readable by the owner of the store.
    /// Returns [`ztds_core::PUT_OK`] or a negative error code.
    fn on_data_store_put(&self, name: &str, data: &[u8], secure: bool) -> i32;

    /// Remove `name`. Removing a missing object is not an error.
    fn on_delete(&self, name: &str) -> i32;
}

/// Callback used by the node to enumerate objects, e.g. the stored network
/// configurations it should rejoin after a restart.
pub trait DataStoreListListener: Send + Sync {
    /// Append the names of objects directly below `prefix` to `out_names`.
    /// A prefix with nothing under it is not an error.
    /// Returns [`ztds_core::PUT_OK`] or a negative error code.
    fn on_data_store_list(&self, prefix: &str, out_names: &mut Vec<String>) -> i32;
}

/// Full read/write data store as seen by the node.
pub trait DataStore: DataStoreGetListener + DataStorePutListener + DataStoreListListener {}

impl<T> DataStore for T where
    T: DataStoreGetListener + DataStorePutListener + DataStoreListListener + ?Sized
{
}

macro_rules! forward_listeners {
    ($wrapper:ident) => {
        impl<T: DataStoreGetListener + ?Sized> DataStoreGetListener for $wrapper<T> {
            fn on_data_store_get(
                &self,
                name: &str,
                out_buffer: &mut [u8],
                buffer_index: u64,
                out_object_size: &mut [u64; 1],
            ) -> i64 {
                (**self).on_data_store_get(name, out_buffer, buffer_index, out_object_size)
            }
        }

        impl<T: DataStorePutListener + ?Sized> DataStorePutListener for $wrapper<T> {
            fn on_data_store_put(&self, name: &str, data: &[u8], secure: bool) -> i32 {
                (**self).on_data_store_put(name, data, secure)
            }

            fn on_delete(&self, name: &str) -> i32 {
                (**self).on_delete(name)
            }
        }

        impl<T: DataStoreListListener + ?Sized> DataStoreListListener for $wrapper<T> {
            fn on_data_store_list(&self, prefix: &str, out_names: &mut Vec<String>) -> i32 {
                (**self).on_data_store_list(prefix, out_names)
            }
        }
    };
}

forward_listeners!(Box);
forward_listeners!(Arc);
