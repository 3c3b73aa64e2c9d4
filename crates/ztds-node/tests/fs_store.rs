use rand_core::OsRng;
use ztds_node::{Node, NodeConfig};
use ztds_store::fs_backend::FileSystemBackend;
use ztds_store::{ListenerBridge, StoreConfig};

fn boot(dir: &std::path::Path, chunk: usize) -> Node {
    let backend = FileSystemBackend::new(dir).unwrap();
    let config = NodeConfig {
        store: StoreConfig { read_chunk: chunk, ..StoreConfig::default() },
    };
    Node::new(Box::new(ListenerBridge::new(backend)), &mut OsRng, config).unwrap()
}

#[test]
fn test_identity_on_disk() {
    let dir = tempfile::tempdir().unwrap();

    // Session 1: generate
    let id = boot(dir.path(), 4096).identity().clone();
    let on_disk = std::fs::read_to_string(dir.path().join("identity.secret")).unwrap();
    assert_eq!(on_disk, id.to_identity_string(true));

    // Session 2: reload through tiny chunks
    let node = boot(dir.path(), 97);
    assert_eq!(node.identity(), &id);
    assert!(node.identity().has_private());
}

#[test]
fn test_network_config_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let nwid = 0x8056c2e21c000001;
    let path = dir.path().join("networks.d").join("8056c2e21c000001.conf");

    {
        let mut node = boot(dir.path(), 4096);
        node.join(nwid).unwrap();
        node.set_network_config(nwid, b"assigned 10.147.17.2/24").unwrap();
        assert!(path.exists());
    }
    {
        let mut node = boot(dir.path(), 4096);
        node.join(nwid).unwrap();
        assert_eq!(
            node.network(nwid).unwrap().config.as_deref(),
            Some(&b"assigned 10.147.17.2/24"[..])
        );
        node.leave(nwid).unwrap();
        assert!(!path.exists());
    }
}

#[test]
fn test_joined_network_on_disk_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let nwid = 0x8056c2e21c000001;

    boot(dir.path(), 4096).join(nwid).unwrap();
    let placeholder = std::fs::read(dir.path().join("networks.d").join("8056c2e21c000001.conf")).unwrap();
    assert_eq!(placeholder, b"\n");

    let node = boot(dir.path(), 4096);
    assert_eq!(node.networks(), vec![nwid]);
}
