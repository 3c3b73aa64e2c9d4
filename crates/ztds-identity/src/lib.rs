#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use fips204::ml_dsa_87;
use fips204::traits::{KeyGen, SerDes, Signer, Verifier};
use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, RngCore, SeedableRng};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};
use ztds_core::{DsError, DsResult};

pub const PUBLIC_KEY_SIZE: usize = ml_dsa_87::PK_LEN;
pub const SECRET_KEY_SIZE: usize = ml_dsa_87::SK_LEN;
pub const SIGNATURE_SIZE: usize = ml_dsa_87::SIG_LEN;

/// Identity type tag in the text form. Only one type exists.
const IDENTITY_TYPE: &str = "0";
const MAX_GENERATE_ATTEMPTS: usize = 64;
const CHECK_MESSAGE: &[u8] = b"ztds identity self-test";

/// 40-bit node address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address {
    pub const MASK: u64 = 0xff_ffff_ffff;

    pub fn new(value: u64) -> Self {
        Self(value & Self::MASK)
    }

    /// First five bytes of SHA-256 over the public key.
    pub fn from_public(public: &[u8]) -> Self {
        let digest = Sha256::digest(public);
        let mut v = 0u64;
        for b in &digest[..5] {
            v = (v << 8) | u64::from(*b);
        }
        Self(v)
    }

    /// Zero and anything in the 0xff.. range are never assigned.
    pub fn is_reserved(&self) -> bool {
        self.0 == 0 || (self.0 >> 32) == 0xff
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010x}", self.0)
    }
}

impl FromStr for Address {
    type Err = DsError;

    fn from_str(s: &str) -> DsResult<Self> {
        if s.len() != 10 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DsError::Corrupt);
        }
        u64::from_str_radix(s, 16).map(Self).map_err(|_| DsError::Corrupt)
    }
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct SecretKey([u8; SECRET_KEY_SIZE]);

/// A node identity: address, public key and optionally the secret key.
#[derive(Clone)]
pub struct Identity {
    address: Address,
    public: [u8; PUBLIC_KEY_SIZE],
    secret: Option<SecretKey>,
}

impl Identity {
    /// Generate a fresh keypair, retrying until the address is not reserved.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> DsResult<Self> {
        for _ in 0..MAX_GENERATE_ATTEMPTS {
            let (pk, sk) = ml_dsa_87::KG::try_keygen_with_rng(rng).map_err(|_| DsError::RngFailure)?;
            let public = pk.into_bytes();
            let address = Address::from_public(&public);
            if address.is_reserved() {
                continue;
            }
            return Ok(Self { address, public, secret: Some(SecretKey(sk.into_bytes())) });
        }
        Err(DsError::RngFailure)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public
    }

    pub fn has_private(&self) -> bool {
        self.secret.is_some()
    }

    /// Copy without the secret key.
    pub fn public_only(&self) -> Self {
        Self { address: self.address, public: self.public, secret: None }
    }

    /// Text form: `<address>:0:<public hex>[:<secret hex>]`.
    pub fn to_identity_string(&self, include_private: bool) -> String {
        let mut s = format!("{}:{}:{}", self.address, IDENTITY_TYPE, hex::encode(&self.public));
        if include_private {
            if let Some(secret) = &self.secret {
                s.push(':');
                s.push_str(&hex::encode(&secret.0));
            }
        }
        s
    }

    /// Check that the address belongs to the public key and, when present,
    /// that the secret key signs for the public key.
    pub fn locally_validate(&self) -> bool {
        if self.address.is_reserved() || self.address != Address::from_public(&self.public) {
            return false;
        }
        let Some(secret) = &self.secret else { return true };

        let mut seed = [0u8; 32];
        seed.copy_from_slice(&Sha256::digest(self.public));
        let mut rng = ChaCha20Rng::from_seed(seed);
        match sign_with(&secret.0, CHECK_MESSAGE, &mut rng) {
            Ok(sig) => self.verify(CHECK_MESSAGE, &sig),
            Err(_) => false,
        }
    }

    pub fn sign<R: RngCore + CryptoRng>(&self, msg: &[u8], rng: &mut R) -> DsResult<Vec<u8>> {
        let secret = self.secret.as_ref().ok_or(DsError::InvalidState)?;
        sign_with(&secret.0, msg, rng).map(|sig| sig.to_vec())
    }

    pub fn verify(&self, msg: &[u8], sig: &[u8]) -> bool {
        let Ok(sig_array) = <[u8; SIGNATURE_SIZE]>::try_from(sig) else { return false };
        match ml_dsa_87::PublicKey::try_from_bytes(self.public) {
            Ok(pk) => pk.verify(msg, &sig_array, b""),
            Err(_) => false,
        }
    }
}

fn sign_with<R: RngCore + CryptoRng>(
    secret: &[u8; SECRET_KEY_SIZE],
    msg: &[u8],
    rng: &mut R,
) -> DsResult<[u8; SIGNATURE_SIZE]> {
    let sk = ml_dsa_87::PrivateKey::try_from_bytes(*secret).map_err(|_| DsError::Corrupt)?;
    sk.try_sign_with_rng(rng, msg, b"").map_err(|_| DsError::CryptoFailure)
}

fn decode_exact<const N: usize>(field: &str) -> DsResult<[u8; N]> {
    let mut out = [0u8; N];
    hex::decode_to_slice(field, &mut out).map_err(|_| DsError::Corrupt)?;
    Ok(out)
}

impl FromStr for Identity {
    type Err = DsError;

    fn from_str(s: &str) -> DsResult<Self> {
        let fields: Vec<&str> = s.trim().split(':').collect();
        if fields.len() != 3 && fields.len() != 4 {
            return Err(DsError::Corrupt);
        }
        if fields[1] != IDENTITY_TYPE {
            return Err(DsError::Corrupt);
        }
        let address: Address = fields[0].parse()?;
        let public = decode_exact::<PUBLIC_KEY_SIZE>(fields[2])?;
        let secret = match fields.get(3) {
            Some(field) => Some(SecretKey(decode_exact::<SECRET_KEY_SIZE>(field)?)),
            None => None,
        };
        Ok(Self { address, public, secret })
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.public == other.public
    }
}

impl Eq for Identity {}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_identity_string(false))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address)
            .field("has_private", &self.has_private())
            .finish()
    }
}
