#![no_std]
extern crate alloc;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use log::{info, warn};

use ztds_core::{DsError, DsResult, StateObjectType};
use ztds_hal::DataStore;
use ztds_identity::{Address, Identity};
use ztds_store::{CallbackStore, StoreConfig};

use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, RngCore, SeedableRng};

pub mod bootstrap;
pub mod network;
pub use network::{parse_nwid, Network};

#[derive(Debug, Clone, Copy, Default)]
pub struct NodeConfig {
    pub store: StoreConfig,
}

/// Node state that lives in the data store: identity, joined networks and
/// cached peer/root records.
pub struct Node {
    store: CallbackStore,
    identity: Identity,
    rng: ChaCha20Rng,
    networks: BTreeMap<u64, Network>,
    config: NodeConfig,
}

impl Node {
    pub fn new<R: RngCore + CryptoRng>(
        listener: Box<dyn DataStore>,
        rng: &mut R,
        config: NodeConfig,
    ) -> DsResult<Self> {
        let mut seed = [0u8; 32];
        rng.try_fill_bytes(&mut seed).map_err(|_| DsError::RngFailure)?;
        let mut rng = ChaCha20Rng::from_seed(seed);

        let store = CallbackStore::new(listener, config.store);
        let identity = bootstrap::load_or_generate(&store, &mut rng)?;

        let mut node = Self {
            store,
            identity,
            rng,
            networks: BTreeMap::new(),
            config,
        };
        node.restore_networks();
        Ok(node)
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn address(&self) -> Address {
        self.identity.address()
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn store(&self) -> &CallbackStore {
        &self.store
    }

    pub fn sign(&mut self, msg: &[u8]) -> DsResult<Vec<u8>> {
        self.identity.sign(msg, &mut self.rng)
    }

    /// Join a network. Joining twice is a no-op. Any cached configuration
    /// is loaded from the store; failing to read it is not fatal. Without a
    /// cached configuration a placeholder is stored so the membership
    /// survives a restart.
    pub fn join(&mut self, nwid: u64) -> DsResult<()> {
        if self.networks.contains_key(&nwid) {
            return Ok(());
        }
        let config = match self.store.get_state(StateObjectType::NetworkConfig, [nwid, 0]) {
            Ok(Some(config)) => network::usable_config(config),
            Ok(None) => {
                self.store
                    .put_state(StateObjectType::NetworkConfig, [nwid, 0], network::PLACEHOLDER_CONFIG)?;
                None
            }
            Err(e) => {
                warn!("cached config for {:016x} unreadable: {}", nwid, e);
                None
            }
        };
        info!(
            "joined network {:016x} ({})",
            nwid,
            if config.is_some() { "cached config" } else { "no config" }
        );
        self.networks.insert(nwid, Network::new(nwid, config));
        Ok(())
    }

    /// Rejoin every network with a stored configuration.
    fn restore_networks(&mut self) {
        let ids = match self.store.list_state(StateObjectType::NetworkConfig) {
            Ok(ids) => ids,
            Err(e) => {
                warn!("cannot list stored networks: {}", e);
                return;
            }
        };
        for id in ids {
            if let Err(e) = self.join(id[0]) {
                warn!("rejoining {:016x} failed: {}", id[0], e);
            }
        }
    }

    /// Leave a network and forget its stored configuration.
    pub fn leave(&mut self, nwid: u64) -> DsResult<()> {
        if self.networks.remove(&nwid).is_none() {
            return Ok(());
        }
        info!("left network {:016x}", nwid);
        self.store.delete_state(StateObjectType::NetworkConfig, [nwid, 0])
    }

    pub fn set_network_config(&mut self, nwid: u64, config: &[u8]) -> DsResult<()> {
        let network = self.networks.get_mut(&nwid).ok_or(DsError::InvalidState)?;
        self.store.put_state(StateObjectType::NetworkConfig, [nwid, 0], config)?;
        network.config = Some(config.to_vec());
        Ok(())
    }

    pub fn network(&self, nwid: u64) -> Option<&Network> {
        self.networks.get(&nwid)
    }

    pub fn networks(&self) -> Vec<u64> {
        self.networks.keys().copied().collect()
    }

    pub fn save_peer(&self, peer: Address, record: &[u8]) -> DsResult<()> {
        self.store.put_state(StateObjectType::Peer, [peer.to_u64(), 0], record)
    }

    pub fn load_peer(&self, peer: Address) -> DsResult<Option<Vec<u8>>> {
        self.store.get_state(StateObjectType::Peer, [peer.to_u64(), 0])
    }

    pub fn planet(&self) -> DsResult<Option<Vec<u8>>> {
        self.store.get_state(StateObjectType::Planet, [0, 0])
    }

    pub fn set_planet(&self, planet: &[u8]) -> DsResult<()> {
        self.store.put_state(StateObjectType::Planet, [0, 0], planet)
    }

    pub fn moon(&self, id: u64) -> DsResult<Option<Vec<u8>>> {
        self.store.get_state(StateObjectType::Moon, [id, 0])
    }

    pub fn set_moon(&self, id: u64, moon: &[u8]) -> DsResult<()> {
        self.store.put_state(StateObjectType::Moon, [id, 0], moon)
    }

    pub fn remove_moon(&self, id: u64) -> DsResult<()> {
        self.store.delete_state(StateObjectType::Moon, [id, 0])
    }
}
