use std::collections::BTreeMap;
use std::sync::Mutex;

use ztds_core::{GET_ERROR, GET_NOT_FOUND, PUT_OK};
use ztds_hal::{DataStore, DataStoreGetListener, DataStoreListListener, DataStorePutListener};

struct Fixed {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl DataStoreGetListener for Fixed {
    fn on_data_store_get(
        &self,
        name: &str,
        out_buffer: &mut [u8],
        buffer_index: u64,
        out_object_size: &mut [u64; 1],
    ) -> i64 {
        if name == "broken" {
            return GET_ERROR;
        }
        let objects = self.objects.lock().unwrap();
        let Some(obj) = objects.get(name) else { return GET_NOT_FOUND };
        out_object_size[0] = obj.len() as u64;
        let start = (buffer_index as usize).min(obj.len());
        let n = (obj.len() - start).min(out_buffer.len());
        out_buffer[..n].copy_from_slice(&obj[start..start + n]);
        n as i64
    }
}

impl DataStorePutListener for Fixed {
    fn on_data_store_put(&self, name: &str, data: &[u8], _secure: bool) -> i32 {
        self.objects.lock().unwrap().insert(name.to_string(), data.to_vec());
        PUT_OK
    }
    fn on_delete(&self, name: &str) -> i32 {
        self.objects.lock().unwrap().remove(name);
        PUT_OK
    }
}

impl DataStoreListListener for Fixed {
    fn on_data_store_list(&self, prefix: &str, out_names: &mut Vec<String>) -> i32 {
        let dir = format!("{}/", prefix);
        out_names.extend(self.objects.lock().unwrap().keys().filter(|k| k.starts_with(&dir)).cloned());
        PUT_OK
    }
}

#[test]
fn test_trait_object_safety() {
    let store = Fixed { objects: Mutex::new(BTreeMap::new()) };
    let obj: &dyn DataStore = &store;

    assert_eq!(obj.on_data_store_put("planet", b"root servers", false), PUT_OK);
    let mut buf = [0u8; 4];
    let mut size = [0u64; 1];
    assert_eq!(obj.on_data_store_get("planet", &mut buf, 0, &mut size), 4);
    assert_eq!(&buf, b"root");
    assert_eq!(size[0], 12);
}

#[test]
fn test_object_size_default() {
    let store = Fixed { objects: Mutex::new(BTreeMap::new()) };
    store.on_data_store_put("identity.public", b"abcdef", false);

    assert_eq!(store.object_size("identity.public"), Ok(6));
    assert_eq!(store.object_size("identity.secret"), Err(GET_NOT_FOUND));
    assert_eq!(store.object_size("broken"), Err(GET_ERROR));

    store.on_delete("identity.public");
    assert_eq!(store.object_size("identity.public"), Err(GET_NOT_FOUND));
}

#[test]
fn test_listing_through_box() {
    let store: Box<dyn DataStore> = Box::new(Fixed { objects: Mutex::new(BTreeMap::new()) });
    store.on_data_store_put("peers.d/89e92ceee5.peer", b"a", false);
    store.on_data_store_put("planet", b"b", false);

    let mut names = Vec::new();
    assert_eq!(store.on_data_store_list("peers.d", &mut names), PUT_OK);
    assert_eq!(names, vec!["peers.d/89e92ceee5.peer".to_string()]);
}
