//! Player public keys and hand encryption.
//!
//! Players may present an RSA public key at connect time (`X-Public-Key`,
//! base64 of a PEM `PUBLIC KEY` block). Their private hand is then shipped
//! inside every public game state, encrypted so only they can read it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand_core::OsRng;
use rsa::pkcs8::spki;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPublicKey};
use sha2::Sha256;
use thiserror::Error;

use crate::errors::ErrorCode;

pub const PUBLIC_KEY_HEADER: &str = "X-Public-Key";

/// OAEP with SHA-256 spends two digests plus two bytes of every block.
const OAEP_SHA256_OVERHEAD: usize = 2 * 32 + 2;

/// Smallest modulus accepted from a player, in bytes (1024 bits).
pub const MIN_KEY_SIZE: usize = 128;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Invalid public key encoding: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("Failed to decode PEM public key: {0}")]
    PemDecoding(String),
    #[error("Public key is not an RSA key")]
    NotRsa,
    #[error("RSA public key is {bits} bits; at least {} are required", MIN_KEY_SIZE * 8)]
    TooSmall { bits: usize },
    #[error("Failed to encrypt hand: {0}")]
    Encrypt(#[from] rsa::Error),
    #[error("Failed to serialize hand: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl KeyError {
    pub fn code(&self) -> ErrorCode {
        match self {
            KeyError::Encoding(_) => ErrorCode::InvalidPublicKeyEncoding,
            KeyError::PemDecoding(_) => ErrorCode::PemDecoding,
            KeyError::NotRsa => ErrorCode::NotRsaPublicKey,
            KeyError::TooSmall { .. } => ErrorCode::PublicKeyTooSmall,
            KeyError::Encrypt(_) | KeyError::Serialize(_) => ErrorCode::EncryptionFailed,
        }
    }
}

/// Decodes the `X-Public-Key` header value.
pub fn decode_public_key_header(value: &str) -> Result<RsaPublicKey, KeyError> {
    let pem_bytes = STANDARD.decode(value.trim())?;
    parse_public_key_pem(&pem_bytes)
}

pub fn parse_public_key_pem(pem_bytes: &[u8]) -> Result<RsaPublicKey, KeyError> {
    let block = pem::parse(pem_bytes).map_err(|e| KeyError::PemDecoding(e.to_string()))?;
    if block.tag() != "PUBLIC KEY" {
        return Err(KeyError::PemDecoding(format!(
            "expected a PUBLIC KEY block, got {}",
            block.tag()
        )));
    }

    let key = RsaPublicKey::from_public_key_der(block.contents()).map_err(|err| match err {
        spki::Error::OidUnknown { .. } => KeyError::NotRsa,
        other => KeyError::PemDecoding(other.to_string()),
    })?;
    if key.size() < MIN_KEY_SIZE {
        return Err(KeyError::TooSmall {
            bits: key.size() * 8,
        });
    }
    Ok(key)
}

/// Encrypts `plaintext` to `key` with RSA-OAEP(SHA-256).
///
/// RSA only seals short messages, so the plaintext is split into blocks
/// that fit the key; each ciphertext block is returned base64 encoded.
/// Decrypt every block in order and concatenate to recover the plaintext.
pub fn encrypt_blocks(key: &RsaPublicKey, plaintext: &[u8]) -> Result<Vec<String>, KeyError> {
    let block_len = key.size().saturating_sub(OAEP_SHA256_OVERHEAD);
    if block_len == 0 {
        return Err(KeyError::Encrypt(rsa::Error::MessageTooLong));
    }

    let mut rng = OsRng;
    plaintext
        .chunks(block_len)
        .map(|chunk| {
            key.encrypt(&mut rng, Oaep::new::<Sha256>(), chunk)
                .map(|ciphertext| STANDARD.encode(ciphertext))
                .map_err(KeyError::from)
        })
        .collect()
}
