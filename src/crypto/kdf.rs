//! Master key derivation using Argon2id
//!
//! The credential store is sealed with a key derived from the master
//! passphrase. Parameters are stored alongside the sealed records so the
//! same key can be re-derived on every run.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Algorithm, Argon2, Params, Version,
};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{VaultError, VaultResult};

/// Parameters for key derivation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Salt (PHC base64 encoding)
    pub salt: String,
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Iterations
    pub time_cost: u32,
    /// Parallelism degree
    pub parallelism: u32,
}

impl KdfParams {
    /// Fresh parameters with a random salt
    pub fn generate() -> Self {
        Self {
            salt: SaltString::generate(&mut OsRng).to_string(),
            memory_cost: 19456, // 19 MiB
            time_cost: 2,
            parallelism: 1,
        }
    }
}

/// A 256-bit key, wiped when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; 32],
}

impl MasterKey {
    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

/// Derive the master key from a passphrase
pub fn derive_master_key(passphrase: &str, params: &KdfParams) -> VaultResult<MasterKey> {
    if passphrase.is_empty() {
        return Err(VaultError::Encryption("Master passphrase is empty".into()));
    }

    let salt = SaltString::from_b64(&params.salt)
        .map_err(|e| VaultError::Encryption(format!("Invalid salt: {}", e)))?;

    let argon2_params = Params::new(params.memory_cost, params.time_cost, params.parallelism, Some(32))
        .map_err(|e| VaultError::Encryption(format!("Invalid Argon2 parameters: {}", e)))?;

    let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params)
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| VaultError::Encryption(format!("Key derivation failed: {}", e)))?;

    let output = hash
        .hash
        .ok_or_else(|| VaultError::Encryption("No hash output generated".into()))?;

    let mut bytes = [0u8; 32];
    let output = output.as_bytes();
    if output.len() < bytes.len() {
        return Err(VaultError::Encryption("Hash output too short for AES-256 key".into()));
    }
    bytes.copy_from_slice(&output[..32]);

    Ok(MasterKey { bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params() -> KdfParams {
        KdfParams {
            memory_cost: 1024,
            time_cost: 1,
            ..KdfParams::generate()
        }
    }

    #[test]
    fn test_same_passphrase_same_key() {
        let params = fast_params();
        let key1 = derive_master_key("hunter2", &params).unwrap();
        let key2 = derive_master_key("hunter2", &params).unwrap();
        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_salt_different_key() {
        let key1 = derive_master_key("hunter2", &fast_params()).unwrap();
        let key2 = derive_master_key("hunter2", &fast_params()).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_empty_passphrase_rejected() {
        assert!(derive_master_key("", &fast_params()).is_err());
    }

    #[test]
    fn test_invalid_salt_rejected() {
        let mut params = fast_params();
        params.salt = "!".into();
        assert!(matches!(
            derive_master_key("hunter2", &params),
            Err(VaultError::Encryption(_))
        ));
    }
}
