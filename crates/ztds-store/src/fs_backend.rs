#![cfg(feature = "std")]

use crate::backend::{ReadChunk, StorageBackend};
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::format;
use std::string::String;
use std::vec::Vec;
use ztds_core::{DsError, DsResult, ObjectName};

/// Prefix of in-flight temp files. Contains "..", which no object name may.
const TEMP_PREFIX: &str = "..ztds-";

/// Maps object names onto files below a root directory, one path segment
/// per directory level.
pub struct FileSystemBackend {
    root: PathBuf,
}

fn io_error(e: io::Error) -> DsError {
    if e.kind() == io::ErrorKind::NotFound {
        DsError::NotFound
    } else {
        DsError::StorageError
    }
}

impl FileSystemBackend {
    pub fn new<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        fs::create_dir_all(path.as_ref())?;
        Ok(Self { root: path.as_ref().to_path_buf() })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get_path(&self, name: &ObjectName) -> PathBuf {
        let mut path = self.root.clone();
        for segment in name.segments() {
            path.push(segment);
        }
        path
    }

    fn sync_dir(dir: &Path) {
        if let Ok(f) = File::open(dir) {
            let _ = f.sync_all();
        }
    }
}

impl StorageBackend for FileSystemBackend {
    fn read_at(&self, name: &ObjectName, buf: &mut [u8], offset: u64) -> DsResult<ReadChunk> {
        let path = self.get_path(name);
        let mut file = File::open(&path).map_err(io_error)?;
        let meta = file.metadata().map_err(|_| DsError::StorageError)?;
        if !meta.is_file() {
            warn!("data store object {} is not a regular file", name);
            return Err(DsError::StorageError);
        }
        let object_size = meta.len();
        if offset >= object_size || buf.is_empty() {
            return Ok(ReadChunk { bytes_read: 0, object_size });
        }

        file.seek(SeekFrom::Start(offset)).map_err(|_| DsError::StorageError)?;
        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => return Err(DsError::StorageError),
            }
        }
        Ok(ReadChunk { bytes_read: filled, object_size })
    }

    fn write(&self, name: &ObjectName, data: &[u8], secure: bool) -> DsResult<()> {
        let path = self.get_path(name);
        let parent = path.parent().unwrap_or(&self.root).to_path_buf();
        fs::create_dir_all(&parent).map_err(|_| DsError::StorageError)?;

        // 1. Write a uniquely named temp file. The ".." prefix keeps it out
        // of the object namespace, so it can never shadow a real object.
        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".tmp")
            .tempfile_in(&parent)
            .map_err(|_| DsError::StorageError)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = if secure { 0o600 } else { 0o644 };
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(mode))
                .map_err(|_| DsError::StorageError)?;
        }
        #[cfg(not(unix))]
        let _ = secure;

        tmp.write_all(data).map_err(|_| DsError::StorageError)?;

        // 2. FSYNC
        tmp.as_file().sync_all().map_err(|_| DsError::StorageError)?;

        // 3. Rename (atomic). A failed persist removes the temp file.
        if let Err(e) = tmp.persist(&path) {
            warn!("persisting {} failed: {}", path.display(), e.error);
            return Err(DsError::StorageError);
        }

        // 4. Sync parent dir
        Self::sync_dir(&parent);
        debug!("stored {} ({} bytes)", name, data.len());
        Ok(())
    }

    fn delete(&self, name: &ObjectName) -> DsResult<()> {
        let path = self.get_path(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                if let Some(parent) = path.parent() {
                    Self::sync_dir(parent);
                }
                Ok(())
            }
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(_) => Err(DsError::StorageError),
        }
    }

    fn exists(&self, name: &ObjectName) -> bool {
        self.get_path(name).is_file()
    }

    fn list(&self, prefix: &ObjectName) -> DsResult<Vec<ObjectName>> {
        let dir = self.get_path(prefix);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(_) => return Err(DsError::StorageError),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| DsError::StorageError)?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let Some(file) = entry.file_name().to_str().map(String::from) else { continue };
            // Temp files and anything else outside the namespace are skipped.
            if let Ok(name) = ObjectName::new(&format!("{}/{}", prefix, file)) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}
