use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use spin::Mutex;

use ztds_core::{DsError, DsResult, ObjectName};

use crate::backend::{copy_window, ReadChunk, StorageBackend};

struct Entry {
    data: Vec<u8>,
    secure: bool,
}

/// Volatile backend. Useful for tests and for nodes that persist nothing.
#[derive(Default)]
pub struct MemoryBackend {
    objects: Mutex<BTreeMap<String, Entry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }

    /// Whether the object was last written with the secure flag.
    pub fn is_secure(&self, name: &ObjectName) -> bool {
        self.objects
            .lock()
            .get(name.as_str())
            .map(|e| e.secure)
            .unwrap_or(false)
    }

    pub fn names(&self) -> Vec<String> {
        self.objects.lock().keys().cloned().collect()
    }
}

impl StorageBackend for MemoryBackend {
    fn read_at(&self, name: &ObjectName, buf: &mut [u8], offset: u64) -> DsResult<ReadChunk> {
        let objects = self.objects.lock();
        let entry = objects.get(name.as_str()).ok_or(DsError::NotFound)?;
        Ok(copy_window(&entry.data, buf, offset))
    }

    fn write(&self, name: &ObjectName, data: &[u8], secure: bool) -> DsResult<()> {
        self.objects
            .lock()
            .insert(String::from(name.as_str()), Entry { data: data.to_vec(), secure });
        Ok(())
    }

    fn delete(&self, name: &ObjectName) -> DsResult<()> {
        self.objects.lock().remove(name.as_str());
        Ok(())
    }

    fn exists(&self, name: &ObjectName) -> bool {
        self.objects.lock().contains_key(name.as_str())
    }

    fn list(&self, prefix: &ObjectName) -> DsResult<Vec<ObjectName>> {
        let dir = format!("{}/", prefix);
        let objects = self.objects.lock();
        // BTreeMap keeps keys ordered, so the result is already sorted.
        Ok(objects
            .range(dir.clone()..)
            .map(|(k, _)| k)
            .take_while(|k| k.starts_with(&dir))
            .filter(|k| !k[dir.len()..].contains('/'))
            .filter_map(|k| ObjectName::new(k).ok())
            .collect())
    }
}
