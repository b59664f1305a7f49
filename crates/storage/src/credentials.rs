//! Password hashes stored as PBKDF2-SHA256 PHC strings
//! (`$pbkdf2-sha256$i=<rounds>,l=32$<salt>$<hash>`).

use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::{Params, Pbkdf2};
use rand::RngCore;

use crate::error::{Result, StorageError};

pub const DEFAULT_ROUNDS: u32 = 600_000;
const SALT_LEN: usize = 16;
const OUTPUT_LEN: usize = 32;

pub fn hash_password(password: &str) -> Result<String> {
    hash_password_with_rounds(password, DEFAULT_ROUNDS)
}

/// Hash with an explicit iteration count. Verification reads the count
/// back from the stored string.
pub fn hash_password_with_rounds(password: &str, rounds: u32) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(hash_error)?;

    let params = Params {
        rounds,
        output_length: OUTPUT_LEN,
    };
    let hash = Pbkdf2
        .hash_password_customized(password.as_bytes(), None, None, params, &salt)
        .map_err(hash_error)?;

    Ok(hash.to_string())
}

/// Constant-time check of a password against a stored PHC string.
/// Unparseable hashes never verify.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .is_ok_and(|parsed| Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok())
}

fn hash_error(e: pbkdf2::password_hash::Error) -> StorageError {
    StorageError::InvalidInput(format!("Could not hash password: {}", e))
}
