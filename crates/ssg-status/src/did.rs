//! # Issuer DID Derivation
//!
//! Status list credentials are issued by a `did:key` derived from the
//! configured secret key seed. The seed is 32 bytes of Ed25519 key material,
//! given either as multibase base58btc (`z…`, optionally with the identity
//! multicodec header `0x00 0x20`) or as 64 hex characters.

use ed25519_dalek::SigningKey;
use thiserror::Error;

/// Multicodec prefix for an Ed25519 public key.
const ED25519_PUB_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// Multicodec identity header some tools prepend to encoded seeds.
const IDENTITY_SEED_HEADER: [u8; 2] = [0x00, 0x20];

const SEED_LENGTH: usize = 32;

/// Errors deriving the issuer DID.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DidError {
    /// The seed is neither multibase base58btc nor hex.
    #[error("invalid DID seed: {0}")]
    InvalidSeed(String),
}

/// Derive `did:key:z6Mk…` from a secret key seed.
pub fn did_key_from_seed(seed: &str) -> Result<String, DidError> {
    let seed = decode_seed(seed.trim())?;
    let public_key = SigningKey::from_bytes(&seed).verifying_key().to_bytes();

    let mut multikey = Vec::with_capacity(ED25519_PUB_MULTICODEC.len() + public_key.len());
    multikey.extend_from_slice(&ED25519_PUB_MULTICODEC);
    multikey.extend_from_slice(&public_key);
    Ok(format!("did:key:z{}", bs58::encode(multikey).into_string()))
}

fn decode_seed(seed: &str) -> Result<[u8; SEED_LENGTH], DidError> {
    if seed.is_empty() {
        return Err(DidError::InvalidSeed("seed is empty".into()));
    }

    let bytes = if let Some(encoded) = seed.strip_prefix('z') {
        let decoded = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| DidError::InvalidSeed(format!("base58btc: {e}")))?;
        match decoded.len() {
            SEED_LENGTH => decoded,
            34 if decoded[..2] == IDENTITY_SEED_HEADER => decoded[2..].to_vec(),
            n => {
                return Err(DidError::InvalidSeed(format!(
                    "decoded seed is {n} bytes, expected {SEED_LENGTH}"
                )))
            }
        }
    } else {
        hex_decode(seed)?
    };

    bytes
        .try_into()
        .map_err(|_| DidError::InvalidSeed(format!("seed must be {SEED_LENGTH} bytes")))
}

fn hex_decode(s: &str) -> Result<Vec<u8>, DidError> {
    if s.len() != SEED_LENGTH * 2 {
        return Err(DidError::InvalidSeed(format!(
            "hex seed must be {} characters, got {}",
            SEED_LENGTH * 2,
            s.len()
        )));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            s.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| DidError::InvalidSeed(format!("invalid hex at position {i}")))
        })
        .collect()
}
