//! Signing service for LightChain
//!
//! Keys are closed enums over [`KeyAlgorithm`], so a service handed a key of
//! the wrong variant rejects it instead of guessing at its shape.

use crate::error::{ChainError, Result};
use ed25519_dalek::Signer;
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::{
    constants::{COMPACT_SIGNATURE_SIZE, PUBLIC_KEY_SIZE, SECRET_KEY_SIZE},
    ecdsa, All, Message, Secp256k1,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// A thread-safe, lazily initialized Secp256k1 context.
static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Byte width of each of the two ECDSA signature components (`r`, `s`).
pub const SIGNATURE_COMPONENT_SIZE: usize = COMPACT_SIGNATURE_SIZE / 2;

const ED25519_KEY_SIZE: usize = ed25519_dalek::SECRET_KEY_LENGTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyAlgorithm {
    #[serde(alias = "secp256k1", alias = "ecdsa")]
    Secp256k1Ecdsa,
    Ed25519,
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyAlgorithm::Secp256k1Ecdsa => write!(f, "secp256k1-ecdsa"),
            KeyAlgorithm::Ed25519 => write!(f, "ed25519"),
        }
    }
}

#[derive(Clone)]
pub enum PrivateKey {
    Secp256k1(secp256k1::SecretKey),
    Ed25519(ed25519_dalek::SigningKey),
}

impl PrivateKey {
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            PrivateKey::Secp256k1(_) => KeyAlgorithm::Secp256k1Ecdsa,
            PrivateKey::Ed25519(_) => KeyAlgorithm::Ed25519,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            PrivateKey::Secp256k1(secret_key) => PublicKey::Secp256k1(
                secp256k1::PublicKey::from_secret_key(&SECP256K1_CONTEXT, secret_key),
            ),
            PrivateKey::Ed25519(signing_key) => PublicKey::Ed25519(signing_key.verifying_key()),
        }
    }

    /// Rebuilds a private key from raw secret bytes.
    pub fn from_secret_bytes(algorithm: KeyAlgorithm, bytes: &[u8]) -> Result<Self> {
        match algorithm {
            KeyAlgorithm::Secp256k1Ecdsa => {
                if bytes.len() != SECRET_KEY_SIZE {
                    return Err(ChainError::InvalidKey(format!(
                        "Secret key must be {} bytes, got {}",
                        SECRET_KEY_SIZE,
                        bytes.len()
                    )));
                }
                secp256k1::SecretKey::from_slice(bytes)
                    .map(PrivateKey::Secp256k1)
                    .map_err(|e| ChainError::InvalidKey(format!("Invalid secret key bytes: {}", e)))
            }
            KeyAlgorithm::Ed25519 => {
                let bytes: [u8; ED25519_KEY_SIZE] = bytes.try_into().map_err(|_| {
                    ChainError::InvalidKey(format!(
                        "Secret key must be {} bytes, got {}",
                        ED25519_KEY_SIZE,
                        bytes.len()
                    ))
                })?;
                Ok(PrivateKey::Ed25519(ed25519_dalek::SigningKey::from_bytes(&bytes)))
            }
        }
    }

    pub fn secret_bytes(&self) -> Vec<u8> {
        match self {
            PrivateKey::Secp256k1(secret_key) => secret_key.secret_bytes().to_vec(),
            PrivateKey::Ed25519(signing_key) => signing_key.to_bytes().to_vec(),
        }
    }
}

// Never print secret material.
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PrivateKey({}, <redacted>)", self.algorithm())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicKey {
    Secp256k1(secp256k1::PublicKey),
    Ed25519(ed25519_dalek::VerifyingKey),
}

impl PublicKey {
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            PublicKey::Secp256k1(_) => KeyAlgorithm::Secp256k1Ecdsa,
            PublicKey::Ed25519(_) => KeyAlgorithm::Ed25519,
        }
    }

    /// Compressed SEC1 encoding for secp256k1, raw 32 bytes for ed25519.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            PublicKey::Secp256k1(public_key) => public_key.serialize().to_vec(),
            PublicKey::Ed25519(verifying_key) => verifying_key.to_bytes().to_vec(),
        }
    }

    pub fn from_bytes(algorithm: KeyAlgorithm, bytes: &[u8]) -> Result<Self> {
        match algorithm {
            KeyAlgorithm::Secp256k1Ecdsa => {
                if bytes.len() != PUBLIC_KEY_SIZE {
                    return Err(ChainError::InvalidKey(format!(
                        "Public key must be exactly {} bytes (compressed), got {}",
                        PUBLIC_KEY_SIZE,
                        bytes.len()
                    )));
                }
                secp256k1::PublicKey::from_slice(bytes)
                    .map(PublicKey::Secp256k1)
                    .map_err(|e| ChainError::InvalidKey(format!("Invalid public key: {}", e)))
            }
            KeyAlgorithm::Ed25519 => {
                let bytes: [u8; ED25519_KEY_SIZE] = bytes.try_into().map_err(|_| {
                    ChainError::InvalidKey(format!(
                        "Public key must be exactly {} bytes, got {}",
                        ED25519_KEY_SIZE,
                        bytes.len()
                    ))
                })?;
                ed25519_dalek::VerifyingKey::from_bytes(&bytes)
                    .map(PublicKey::Ed25519)
                    .map_err(|e| ChainError::InvalidKey(format!("Invalid public key: {}", e)))
            }
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(algorithm: KeyAlgorithm, hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| ChainError::InvalidKey(format!("Invalid hex public key: {}", e)))?;
        Self::from_bytes(algorithm, &bytes)
    }
}

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub private_key: PrivateKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        KeyPair {
            private_key,
            public_key,
        }
    }
}

/// Serialized signature bytes.
///
/// Both built-in algorithms produce 64 bytes. For ECDSA this is `r || s`,
/// each left-padded to [`SIGNATURE_COMPONENT_SIZE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    bytes: Vec<u8>,
}

impl Signature {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Signature { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Splits a fixed-width signature into its two halves, or `None` if the
    /// length is not the compact size.
    pub fn components(&self) -> Option<(&[u8], &[u8])> {
        if self.bytes.len() != COMPACT_SIGNATURE_SIZE {
            return None;
        }
        Some(self.bytes.split_at(SIGNATURE_COMPONENT_SIZE))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        hex::decode(hex_str)
            .map(Signature::from_bytes)
            .map_err(|e| ChainError::InvalidKey(format!("Invalid hex signature: {}", e)))
    }
}

/// Capability to generate key pairs, sign and verify.
pub trait SigningService: Send + Sync {
    fn algorithm(&self) -> KeyAlgorithm;

    fn generate_key_pair(&self) -> Result<KeyPair>;

    fn sign(&self, message: &[u8], private_key: &PrivateKey) -> Result<Signature>;

    /// Fails closed: any malformed input yields `false`, never an error.
    fn verify(&self, message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool;
}

/// Builds the signing service for a configured algorithm.
pub fn signing_service_for(algorithm: KeyAlgorithm) -> Arc<dyn SigningService> {
    match algorithm {
        KeyAlgorithm::Secp256k1Ecdsa => Arc::new(EcdsaSigner::new()),
        KeyAlgorithm::Ed25519 => Arc::new(Ed25519Signer::new()),
    }
}

fn fresh_secret_bytes() -> Result<[u8; 32]> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| ChainError::KeyGenerationFailure(format!("OS entropy unavailable: {}", e)))?;
    Ok(bytes)
}

/// ECDSA over secp256k1. Messages are hashed with SHA-256 before signing.
#[derive(Debug, Default, Clone, Copy)]
pub struct EcdsaSigner;

impl EcdsaSigner {
    pub fn new() -> Self {
        EcdsaSigner
    }

    fn message_digest(message: &[u8]) -> Message {
        let digest: [u8; 32] = Sha256::digest(message).into();
        Message::from_digest(digest)
    }
}

impl SigningService for EcdsaSigner {
    fn algorithm(&self) -> KeyAlgorithm {
        KeyAlgorithm::Secp256k1Ecdsa
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        let bytes = fresh_secret_bytes()?;
        let secret_key = secp256k1::SecretKey::from_slice(&bytes)
            .map_err(|e| ChainError::KeyGenerationFailure(format!("Invalid secret scalar: {}", e)))?;
        Ok(KeyPair::from_private_key(PrivateKey::Secp256k1(secret_key)))
    }

    fn sign(&self, message: &[u8], private_key: &PrivateKey) -> Result<Signature> {
        let PrivateKey::Secp256k1(secret_key) = private_key else {
            return Err(ChainError::InvalidKeyType {
                expected: self.algorithm(),
                found: private_key.algorithm(),
            });
        };

        let message = Self::message_digest(message);
        let signature = SECP256K1_CONTEXT.sign_ecdsa(&message, secret_key);
        let compact: [u8; COMPACT_SIGNATURE_SIZE] = signature.serialize_compact();
        Ok(Signature::from_bytes(compact.to_vec()))
    }

    fn verify(&self, message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
        let PublicKey::Secp256k1(public_key) = public_key else {
            return false;
        };
        if signature.len() != COMPACT_SIGNATURE_SIZE {
            return false;
        }
        let Ok(signature) = ecdsa::Signature::from_compact(signature.as_bytes()) else {
            return false;
        };

        let message = Self::message_digest(message);
        SECP256K1_CONTEXT
            .verify_ecdsa(&message, &signature, public_key)
            .is_ok()
    }
}

/// Ed25519 signing over the raw message.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519Signer;

impl Ed25519Signer {
    pub fn new() -> Self {
        Ed25519Signer
    }
}

impl SigningService for Ed25519Signer {
    fn algorithm(&self) -> KeyAlgorithm {
        KeyAlgorithm::Ed25519
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        let bytes = fresh_secret_bytes()?;
        let signing_key = ed25519_dalek::SigningKey::from_bytes(&bytes);
        Ok(KeyPair::from_private_key(PrivateKey::Ed25519(signing_key)))
    }

    fn sign(&self, message: &[u8], private_key: &PrivateKey) -> Result<Signature> {
        let PrivateKey::Ed25519(signing_key) = private_key else {
            return Err(ChainError::InvalidKeyType {
                expected: self.algorithm(),
                found: private_key.algorithm(),
            });
        };

        let signature = signing_key
            .try_sign(message)
            .map_err(|e| ChainError::SignFailure(e.to_string()))?;
        Ok(Signature::from_bytes(signature.to_bytes().to_vec()))
    }

    fn verify(&self, message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
        let PublicKey::Ed25519(verifying_key) = public_key else {
            return false;
        };
        let Ok(signature) = ed25519_dalek::Signature::from_slice(signature.as_bytes()) else {
            return false;
        };
        verifying_key.verify_strict(message, &signature).is_ok()
    }
}
