//! Cryptographic functions for pgvault
//!
//! Provides AES-256-GCM sealing with Argon2id key derivation for the
//! credential store, and a zeroizing string type for secrets in memory.

pub mod cipher;
pub mod kdf;
pub mod secret;

pub use cipher::{open, seal, SealedSecret};
pub use kdf::{derive_master_key, KdfParams, MasterKey};
pub use secret::SecureString;
