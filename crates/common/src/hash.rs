use sha3::{Digest, Keccak256};

use crate::{ADDRESS_LEN, HASH_LEN, PASSWORD_LEN};

/// Ethereum keccak-256 (original Keccak padding, not SHA3-256).
pub fn keccak256(data: &[u8]) -> [u8; HASH_LEN] {
    Keccak256::digest(data).into()
}

/// The commitment a drop creator publishes: `keccak256(password ∥ locker)`.
pub fn lock_hash(password: &[u8; PASSWORD_LEN], locker: &[u8; ADDRESS_LEN]) -> [u8; HASH_LEN] {
    let mut hasher = Keccak256::new();
    hasher.update(password);
    hasher.update(locker);
    hasher.finalize().into()
}
