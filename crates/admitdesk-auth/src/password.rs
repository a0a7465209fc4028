use bcrypt::{DEFAULT_COST, hash, verify};

use crate::error::ProviderError;

pub fn hash_password(password: &str) -> Result<String, ProviderError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

/// Lower costs are only meant for tests and local fixtures.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, ProviderError> {
    Ok(hash(password, cost)?)
}

pub fn verify_password(password: &str, hashed: &str) -> Result<bool, ProviderError> {
    Ok(verify(password, hashed)?)
}
