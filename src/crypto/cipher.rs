//! AES-256-GCM sealing of credential secrets
//!
//! Each sealed value carries its own random nonce.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use super::{MasterKey, SecureString};
use crate::error::{VaultError, VaultResult};

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// A sealed secret as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedSecret {
    /// Base64 nonce
    pub nonce: String,
    /// Base64 ciphertext with authentication tag
    pub ciphertext: String,
}

/// Seal a secret under the master key
pub fn seal(secret: &str, key: &MasterKey) -> VaultResult<SealedSecret> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Encryption(format!("Failed to create cipher: {}", e)))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), secret.as_bytes())
        .map_err(|e| VaultError::Encryption(format!("Encryption failed: {}", e)))?;

    Ok(SealedSecret {
        nonce: STANDARD.encode(nonce_bytes),
        ciphertext: STANDARD.encode(ciphertext),
    })
}

/// Open a sealed secret
///
/// The plaintext is returned as a `SecureString` so it is wiped as soon
/// as the caller drops it.
pub fn open(sealed: &SealedSecret, key: &MasterKey) -> VaultResult<SecureString> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Encryption(format!("Failed to create cipher: {}", e)))?;

    let nonce_bytes = STANDARD
        .decode(&sealed.nonce)
        .map_err(|e| VaultError::Encryption(format!("Invalid nonce encoding: {}", e)))?;
    if nonce_bytes.len() != NONCE_SIZE {
        return Err(VaultError::Encryption(format!(
            "Invalid nonce size: expected {}, got {}",
            NONCE_SIZE,
            nonce_bytes.len()
        )));
    }

    let ciphertext = STANDARD
        .decode(&sealed.ciphertext)
        .map_err(|e| VaultError::Encryption(format!("Invalid ciphertext encoding: {}", e)))?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
        .map_err(|_| {
            VaultError::Encryption("Decryption failed: wrong master key or corrupted store".into())
        })?;

    String::from_utf8(plaintext)
        .map(SecureString::new)
        .map_err(|_| VaultError::Encryption("Decrypted secret is not valid UTF-8".into()))
}
