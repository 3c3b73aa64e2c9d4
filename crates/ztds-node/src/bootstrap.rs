use alloc::string::String;
use log::{info, warn};
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use ztds_core::{DsResult, StateObjectType};
use ztds_identity::Identity;
use ztds_store::CallbackStore;

const NO_ID: [u64; 2] = [0, 0];

/// Load the node identity from the store, or create and persist a new one.
///
/// A missing, unparseable or inconsistent `identity.secret` is replaced.
/// Storage errors are returned so a flaky backend never causes an existing
/// identity to be overwritten.
pub fn load_or_generate<R: RngCore + CryptoRng>(
    store: &CallbackStore,
    rng: &mut R,
) -> DsResult<Identity> {
    let existing = match store.get_state(StateObjectType::IdentitySecret, NO_ID)? {
        Some(raw) => match parse_secret(&Zeroizing::new(raw)) {
            Some(id) => Some(id),
            None => {
                warn!("identity.secret is unreadable or fails validation, regenerating");
                None
            }
        },
        None => None,
    };

    let Some(identity) = existing else {
        let identity = Identity::generate(rng)?;
        info!("generated new identity {}", identity.address());
        let secret = Zeroizing::new(identity.to_identity_string(true));
        store.put_state(StateObjectType::IdentitySecret, NO_ID, secret.as_bytes())?;
        store.put_state(
            StateObjectType::IdentityPublic,
            NO_ID,
            identity.to_identity_string(false).as_bytes(),
        )?;
        return Ok(identity);
    };

    // Keep identity.public in step with the secret it derives from.
    let public_str = identity.to_identity_string(false);
    let stored_public = store.get_state(StateObjectType::IdentityPublic, NO_ID)?;
    let in_sync = stored_public
        .as_deref()
        .and_then(|raw| core::str::from_utf8(raw).ok())
        .map(|s| s.trim() == public_str)
        .unwrap_or(false);
    if !in_sync {
        info!("rewriting identity.public for {}", identity.address());
        store.put_state(StateObjectType::IdentityPublic, NO_ID, public_str.as_bytes())?;
    }

    info!("loaded identity {}", identity.address());
    Ok(identity)
}

fn parse_secret(raw: &[u8]) -> Option<Identity> {
    let text = String::from_utf8_lossy(raw);
    let id: Identity = text.parse().ok()?;
    (id.has_private() && id.locally_validate()).then_some(id)
}
