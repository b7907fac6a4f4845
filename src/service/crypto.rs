use sha3::{Digest, Sha3_256};
use uuid::Uuid;

pub fn get_sha3_256_hash(data: &str) -> String {
    let mut hasher = Sha3_256::default();
    hasher.update(data.as_bytes());
    format!("{:X}", hasher.finalize())
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    get_sha3_256_hash(password) == stored_hash
}

/// Opaque bearer token handed out at login and registration.
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}
