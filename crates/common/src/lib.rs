//! Shared types for the hash-lock proof service: strict hex decoding, the
//! lock predicate inputs, and the native keccak-256 commitment.

pub mod codec;
pub mod error;
pub mod hash;
pub mod inputs;

pub use error::{HexError, InputError, Result};
pub use hash::{keccak256, lock_hash};
pub use inputs::{InputField, LockPredicateInputs, PublicInputs};

/// Password length in bytes.
pub const PASSWORD_LEN: usize = 32;

/// Ethereum address length in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Keccak-256 digest length in bytes.
pub const HASH_LEN: usize = 32;
