// file: src/utils/crypto.rs
// version: 1.0.0
// guid: f3b8d0e2-7c45-4a91-b6e8-29d0a1f7c534

//! Password hashing for the installer identity block
//!
//! Produces a salted SHA-512 hash in crypt-style `$6$` framing. Every hash
//! is verified against the input before it leaves this module; a mismatch
//! is an error rather than a silently broken login.

use crate::{IsoBuildError, Result};
use rand::Rng;
use sha2::{Digest, Sha512};

const ROUNDS: u32 = 4096;
const SALT_LEN: usize = 16;

/// Hash a plaintext password with a fresh random salt.
///
/// The returned hash is self-checked: it must verify against the input.
pub fn hash_password(password: &str) -> Result<String> {
    if password.is_empty() {
        return Err(IsoBuildError::HashError(
            "Password cannot be empty".to_string(),
        ));
    }

    let salt = generate_salt();
    let hash = hash_with_salt(password, &salt);

    if !verify_password(password, &hash) {
        return Err(IsoBuildError::HashError(
            "Produced hash failed self-verification".to_string(),
        ));
    }

    Ok(hash)
}

/// Check a plaintext password against a `$6$` hash from this module
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parts: Vec<&str> = hash.split('$').collect();
    // ["", "6", "rounds=N", salt, digest]
    if parts.len() != 5 || parts[1] != "6" {
        return false;
    }

    hash_with_salt(password, parts[3]) == hash
}

fn generate_salt() -> String {
    let mut rng = rand::thread_rng();
    let salt_bytes: [u8; SALT_LEN] = rng.gen();
    hex::encode(salt_bytes)[..SALT_LEN].to_string()
}

fn hash_with_salt(password: &str, salt: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(format!("{}${}${}", password, salt, ROUNDS).as_bytes());
    let digest = hex::encode(hasher.finalize());

    format!("$6$rounds={}${}${}", ROUNDS, salt, &digest[..86])
}
