//! Data models for the proof generation service

use hashlock_common::{InputError, InputField, LockPredicateInputs};
use serde::{Deserialize, Serialize};

use crate::encoding::SolidityProof;
use crate::readiness::ReadinessState;

/// Request to generate an unlock proof.
///
/// Every field is optional at the JSON level so that absent and empty
/// fields are both reported as missing, by name.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateProofRequest {
    /// 32-byte secret
    pub password_hex: Option<String>,

    /// 20-byte address of the drop creator
    pub locker_address_hex: Option<String>,

    /// 20-byte address of the finder
    pub unlocker_address_hex: Option<String>,

    /// keccak256(password ∥ locker), as committed on-chain
    pub lock_hash_hex: Option<String>,
}

impl GenerateProofRequest {
    /// Validate and decode the request into circuit inputs.
    pub fn into_inputs(self) -> Result<LockPredicateInputs, InputError> {
        let fields = [
            (InputField::Password, &self.password_hex),
            (InputField::Locker, &self.locker_address_hex),
            (InputField::Unlocker, &self.unlocker_address_hex),
            (InputField::LockHash, &self.lock_hash_hex),
        ];

        let missing: Vec<InputField> = fields
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(InputError::MissingFields(missing));
        }

        LockPredicateInputs::from_hex(
            self.password_hex.as_deref().unwrap_or_default(),
            self.locker_address_hex.as_deref().unwrap_or_default(),
            self.unlocker_address_hex.as_deref().unwrap_or_default(),
            self.lock_hash_hex.as_deref().unwrap_or_default(),
        )
    }
}

/// Response from proof generation
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateProofResponse {
    pub proof: SolidityProof,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
}

/// Service status, with circuit details once initialized.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub service: &'static str,
    pub state: ReadinessState,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit: Option<CircuitStatus>,
}

#[derive(Debug, Serialize)]
pub struct CircuitStatus {
    pub digest: String,
    pub key_strategy: &'static str,
    pub constraints: usize,
    pub public_inputs: usize,
}
