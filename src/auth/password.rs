//! Password hashing

use crate::error::Result;

/// Default bcrypt work factor
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Hash a plaintext password with the given work factor
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Compare a plaintext password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    Ok(bcrypt::verify(password, hash)?)
}
