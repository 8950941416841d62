//! Field-level encryption for credential material.
//!
//! Uses AES-256-GCM for authenticated encryption of tokens before they are
//! written to the database. The owning session id is bound as associated
//! data, so a ciphertext copied into another session's row fails to open.

use anyhow::{Context, Result};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Size of the encryption key (32 bytes = 256 bits).
pub const KEY_SIZE: usize = 32;

/// Size of the nonce (12 bytes for AES-GCM).
const NONCE_SIZE: usize = 12;

/// Encryptor for sensitive credential fields.
pub struct FieldEncryptor {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl FieldEncryptor {
    /// Create a new encryptor with the given master key.
    pub fn new(master_key: &[u8; KEY_SIZE]) -> Result<Self> {
        let unbound_key = UnboundKey::new(&AES_256_GCM, master_key)
            .map_err(|_| anyhow::anyhow!("Failed to create encryption key"))?;
        let key = LessSafeKey::new(unbound_key);
        let rng = SystemRandom::new();

        Ok(Self { key, rng })
    }

    /// Encrypt `plaintext` bound to `context`.
    ///
    /// Returns hex(nonce + ciphertext + tag).
    pub fn seal(&self, plaintext: &str, context: &str) -> Result<String> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| anyhow::anyhow!("Failed to generate nonce"))?;

        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut in_out = plaintext.as_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(nonce, Aad::from(context.as_bytes()), &mut in_out)
            .map_err(|_| anyhow::anyhow!("Encryption failed"))?;

        let mut result = nonce_bytes.to_vec();
        result.extend_from_slice(&in_out);

        Ok(hex::encode(result))
    }

    /// Decrypt a value produced by [`seal`](Self::seal) with the same `context`.
    pub fn open(&self, sealed_hex: &str, context: &str) -> Result<Zeroizing<String>> {
        let sealed = hex::decode(sealed_hex).context("Invalid hex encoding")?;

        if sealed.len() < NONCE_SIZE + AES_256_GCM.tag_len() {
            anyhow::bail!("Ciphertext too short");
        }

        let (nonce_bytes, encrypted) = sealed.split_at(NONCE_SIZE);
        let nonce_array: [u8; NONCE_SIZE] = nonce_bytes
            .try_into()
            .map_err(|_| anyhow::anyhow!("Invalid nonce"))?;
        let nonce = Nonce::assume_unique_for_key(nonce_array);

        let mut in_out = Zeroizing::new(encrypted.to_vec());
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::from(context.as_bytes()), &mut in_out)
            .map_err(|_| anyhow::anyhow!("Decryption failed - wrong key, wrong session or corrupted data"))?;

        let text = std::str::from_utf8(plaintext).context("Decrypted data is not valid UTF-8")?;
        Ok(Zeroizing::new(text.to_string()))
    }
}

/// Generate a random master key.
pub fn generate_master_key() -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let rng = SystemRandom::new();
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    rng.fill(&mut key[..])
        .map_err(|_| anyhow::anyhow!("Failed to generate random key"))?;
    Ok(key)
}

/// Parse a hex-encoded 32-byte master key (e.g. from `WPBRIDGE_MASTER_KEY`).
pub fn parse_master_key(hex_key: &str) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let bytes = Zeroizing::new(hex::decode(hex_key.trim()).context("Master key is not valid hex")?);
    if bytes.len() != KEY_SIZE {
        anyhow::bail!(
            "Master key must be {} bytes ({} hex chars), got {} bytes",
            KEY_SIZE,
            KEY_SIZE * 2,
            bytes.len()
        );
    }

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    key.copy_from_slice(&bytes);
    Ok(key)
}
