use alloc::vec::Vec;
use ztds_core::{DsResult, ObjectName};

/// Outcome of a positional read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadChunk {
    /// Bytes copied into the caller's buffer.
    pub bytes_read: usize,
    /// Total size of the object.
    pub object_size: u64,
}

/// Typed interface to the medium that actually holds the objects.
/// Names reaching a backend have already been validated.
pub trait StorageBackend: Send + Sync {
    /// Copy as much of the object as fits into `buf`, starting at `offset`.
    /// An offset past the end copies nothing but still reports the size.
    fn read_at(&self, name: &ObjectName, buf: &mut [u8], offset: u64) -> DsResult<ReadChunk>;

    /// Atomically replace the object. MUST be durable before returning.
    fn write(&self, name: &ObjectName, data: &[u8], secure: bool) -> DsResult<()>;

    /// Delete the object. Deleting a missing object succeeds.
    fn delete(&self, name: &ObjectName) -> DsResult<()>;

    fn exists(&self, name: &ObjectName) -> bool;

    /// Objects directly below `prefix` (e.g. every `networks.d/<nwid>.conf`
    /// for prefix `networks.d`), sorted. A missing prefix lists nothing.
    fn list(&self, prefix: &ObjectName) -> DsResult<Vec<ObjectName>>;
}

/// Copy the window of `object` that starts at `offset` into `buf`.
pub(crate) fn copy_window(object: &[u8], buf: &mut [u8], offset: u64) -> ReadChunk {
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(object.len());
    let n = (object.len() - start).min(buf.len());
    buf[..n].copy_from_slice(&object[start..start + n]);
    ReadChunk { bytes_read: n, object_size: object.len() as u64 }
}
