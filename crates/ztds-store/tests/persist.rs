#[cfg(feature = "std")]
mod tests {
    use std::fs;
    use ztds_core::{DsError, ObjectName};
    use ztds_store::fs_backend::FileSystemBackend;
    use ztds_store::StorageBackend;

    fn name(s: &str) -> ObjectName {
        ObjectName::new(s).unwrap()
    }

    #[test]
    fn test_write_creates_nested_path() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileSystemBackend::new(dir.path()).unwrap();
        let obj = name("networks.d/8056c2e21c000001.conf");

        backend.write(&obj, b"nwid=8056c2e21c000001", false).expect("Write failed");

        let on_disk = fs::read(dir.path().join("networks.d").join("8056c2e21c000001.conf")).unwrap();
        assert_eq!(on_disk, b"nwid=8056c2e21c000001");
        assert!(backend.exists(&obj));
        // No temp file left behind
        assert!(!dir.path().join("networks.d").join("8056c2e21c000001.conf.tmp").exists());
    }

    #[test]
    fn test_positional_reads() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileSystemBackend::new(dir.path()).unwrap();
        let obj = name("planet");
        backend.write(&obj, b"0123456789", false).unwrap();

        let mut buf = [0u8; 4];
        let c = backend.read_at(&obj, &mut buf, 0).unwrap();
        assert_eq!((c.bytes_read, c.object_size), (4, 10));
        assert_eq!(&buf, b"0123");

        let c = backend.read_at(&obj, &mut buf, 8).unwrap();
        assert_eq!((c.bytes_read, c.object_size), (2, 10));
        assert_eq!(&buf[..2], b"89");

        let c = backend.read_at(&obj, &mut buf, 10).unwrap();
        assert_eq!((c.bytes_read, c.object_size), (0, 10));

        let c = backend.read_at(&obj, &mut buf, 500).unwrap();
        assert_eq!((c.bytes_read, c.object_size), (0, 10));
    }

    #[test]
    fn test_overwrite_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileSystemBackend::new(dir.path()).unwrap();
        let obj = name("identity.public");

        backend.write(&obj, b"first version, longer", false).unwrap();
        backend.write(&obj, b"second", false).unwrap();
        let mut buf = [0u8; 64];
        let c = backend.read_at(&obj, &mut buf, 0).unwrap();
        assert_eq!(&buf[..c.bytes_read], b"second");

        backend.delete(&obj).unwrap();
        assert!(!backend.exists(&obj));
        assert_eq!(backend.read_at(&obj, &mut buf, 0), Err(DsError::NotFound));
        // Deleting twice is fine
        backend.delete(&obj).unwrap();
    }

    #[test]
    fn test_directory_is_not_an_object() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileSystemBackend::new(dir.path()).unwrap();
        fs::create_dir_all(dir.path().join("peers.d")).unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(backend.read_at(&name("peers.d"), &mut buf, 0), Err(DsError::StorageError));
        assert!(!backend.exists(&name("peers.d")));
    }

    #[cfg(unix)]
    #[test]
    fn test_secure_objects_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let backend = FileSystemBackend::new(dir.path()).unwrap();
        let obj = name("identity.secret");
        backend.write(&obj, b"secret key material", true).unwrap();

        let mode = fs::metadata(backend.get_path(&obj)).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600, "secret readable by others: {:o}", mode);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let obj = name("moons.d/00000000deadbeef.moon");

        // Session 1: Write Data
        {
            let backend = FileSystemBackend::new(dir.path()).unwrap();
            backend.write(&obj, b"moon definition", false).unwrap();
        }

        // Session 2: Reopen
        {
            let backend = FileSystemBackend::new(dir.path()).unwrap();
            let mut buf = [0u8; 32];
            let c = backend.read_at(&obj, &mut buf, 0).unwrap();
            assert_eq!(&buf[..c.bytes_read], b"moon definition");
        }
    }

    #[test]
    fn test_write_leaves_sibling_objects_alone() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileSystemBackend::new(dir.path()).unwrap();

        backend.write(&name("planet.tmp"), b"keep me", false).unwrap();
        backend.write(&name("planet"), b"root", false).unwrap();
        backend.write(&name("planet"), b"root v2", true).unwrap();

        let mut buf = [0u8; 16];
        let c = backend.read_at(&name("planet.tmp"), &mut buf, 0).unwrap();
        assert_eq!((c.bytes_read, &buf[..c.bytes_read]), (7, &b"keep me"[..]));
        let c = backend.read_at(&name("planet"), &mut buf, 0).unwrap();
        assert_eq!(&buf[..c.bytes_read], b"root v2");

        // Nothing but the two objects is left in the directory
        let mut files: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        files.sort();
        assert_eq!(files, vec!["planet", "planet.tmp"]);
    }

    #[test]
    fn test_concurrent_writers_never_tear() {
        use std::sync::Arc;
        use std::thread;

        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(FileSystemBackend::new(dir.path()).unwrap());
        let obj = name("networks.d/8056c2e21c000001.conf");

        let handles: Vec<_> = (0..8u8)
            .map(|t| {
                let backend = backend.clone();
                let obj = obj.clone();
                thread::spawn(move || {
                    let payload = vec![t; 64 * 1024 + t as usize];
                    for _ in 0..10 {
                        backend.write(&obj, &payload, false).expect("Write failed");
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut buf = vec![0u8; 128 * 1024];
        let c = backend.read_at(&obj, &mut buf, 0).unwrap();
        let data = &buf[..c.bytes_read];
        let t = data[0];
        assert_eq!(data.len(), 64 * 1024 + t as usize, "torn object");
        assert!(data.iter().all(|&b| b == t), "mixed writers in one object");
    }

    #[test]
    fn test_listing_skips_dirs_and_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileSystemBackend::new(dir.path()).unwrap();
        backend.write(&name("networks.d/8056c2e21c000002.conf"), b"b", true).unwrap();
        backend.write(&name("networks.d/8056c2e21c000001.conf"), b"a", true).unwrap();
        fs::create_dir_all(dir.path().join("networks.d").join("sub")).unwrap();
        fs::write(dir.path().join("networks.d").join("..ztds-abc.tmp"), b"partial").unwrap();

        let names: Vec<String> = backend
            .list(&name("networks.d"))
            .unwrap()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(
            names,
            vec!["networks.d/8056c2e21c000001.conf", "networks.d/8056c2e21c000002.conf"]
        );
        assert!(backend.list(&name("moons.d")).unwrap().is_empty());
    }
}
