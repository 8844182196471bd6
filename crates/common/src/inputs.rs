use std::fmt;

use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::codec;
use crate::error::InputError;
use crate::{ADDRESS_LEN, HASH_LEN, PASSWORD_LEN};

/// The four request fields, in circuit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InputField {
    Password,
    Locker,
    Unlocker,
    LockHash,
}

impl InputField {
    pub const ALL: [InputField; 4] = [
        InputField::Password,
        InputField::Locker,
        InputField::Unlocker,
        InputField::LockHash,
    ];

    /// Name of the field in the JSON request body.
    pub fn wire_name(&self) -> &'static str {
        match self {
            InputField::Password => "passwordHex",
            InputField::Locker => "lockerAddressHex",
            InputField::Unlocker => "unlockerAddressHex",
            InputField::LockHash => "lockHashHex",
        }
    }

    /// Human readable name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            InputField::Password => "Password",
            InputField::Locker => "Locker address",
            InputField::Unlocker => "Unlocker address",
            InputField::LockHash => "Lock hash",
        }
    }

    /// Exact decoded length in bytes.
    pub fn expected_len(&self) -> usize {
        match self {
            InputField::Password => PASSWORD_LEN,
            InputField::Locker | InputField::Unlocker => ADDRESS_LEN,
            InputField::LockHash => HASH_LEN,
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Validated inputs to the unlock predicate.
///
/// `password` is the private witness; everything else is public. The
/// password is wiped from memory on drop and never printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct LockPredicateInputs {
    pub password: [u8; PASSWORD_LEN],
    pub locker: [u8; ADDRESS_LEN],
    pub unlocker: [u8; ADDRESS_LEN],
    pub lock_hash: [u8; HASH_LEN],
}

/// The public part of [`LockPredicateInputs`], as seen by a verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicInputs {
    pub locker: [u8; ADDRESS_LEN],
    pub unlocker: [u8; ADDRESS_LEN],
    pub lock_hash: [u8; HASH_LEN],
}

impl LockPredicateInputs {
    pub fn new(
        password: [u8; PASSWORD_LEN],
        locker: [u8; ADDRESS_LEN],
        unlocker: [u8; ADDRESS_LEN],
        lock_hash: [u8; HASH_LEN],
    ) -> Self {
        Self {
            password,
            locker,
            unlocker,
            lock_hash,
        }
    }

    /// Decode the four hex fields, checking each against its exact length.
    ///
    /// Fields are checked in circuit order and the first bad one is reported.
    pub fn from_hex(
        password_hex: &str,
        locker_hex: &str,
        unlocker_hex: &str,
        lock_hash_hex: &str,
    ) -> crate::Result<Self> {
        Ok(Self {
            password: decode_field(InputField::Password, password_hex)?,
            locker: decode_field(InputField::Locker, locker_hex)?,
            unlocker: decode_field(InputField::Unlocker, unlocker_hex)?,
            lock_hash: decode_field(InputField::LockHash, lock_hash_hex)?,
        })
    }

    pub fn public(&self) -> PublicInputs {
        PublicInputs {
            locker: self.locker,
            unlocker: self.unlocker,
            lock_hash: self.lock_hash,
        }
    }
}

impl fmt::Debug for LockPredicateInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockPredicateInputs")
            .field("password", &"<redacted>")
            .field("locker", &codec::encode_prefixed(self.locker))
            .field("unlocker", &codec::encode_prefixed(self.unlocker))
            .field("lock_hash", &codec::encode_prefixed(self.lock_hash))
            .finish()
    }
}

impl PublicInputs {
    pub fn from_hex(locker_hex: &str, unlocker_hex: &str, lock_hash_hex: &str) -> crate::Result<Self> {
        Ok(Self {
            locker: decode_field(InputField::Locker, locker_hex)?,
            unlocker: decode_field(InputField::Unlocker, unlocker_hex)?,
            lock_hash: decode_field(InputField::LockHash, lock_hash_hex)?,
        })
    }
}

fn decode_field<const N: usize>(field: InputField, value: &str) -> Result<[u8; N], InputError> {
    debug_assert_eq!(field.expected_len(), N);
    codec::decode_array::<N>(value).map_err(|err| InputError::from_hex(field, err))
}
