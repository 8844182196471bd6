//! Proving/verification key lifecycle.
//!
//! Keys are produced exactly once per process, by one of two strategies:
//!
//! - [`KeyStrategy::Generated`] runs a fresh trusted setup in memory. Every
//!   restart yields a new, unaudited CRS, so this is only for demos and tests.
//! - [`KeyStrategy::Persisted`] loads keys produced out-of-band by
//!   `hashlock-keygen`. The service never writes these files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use ark_bn254::Bn254;
use ark_groth16::{Groth16, PreparedVerifyingKey, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use hashlock_circuit::{CompiledProgram, LockCircuit};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use thiserror::Error;
use tracing::{info, warn};

use crate::encoding::VerificationKeyDocument;

pub const PROVING_KEY_FILE: &str = "proving.key";
pub const VERIFICATION_KEY_FILE: &str = "verification.key";

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize {}: {reason}", .path.display())]
    Serialize { path: PathBuf, reason: String },

    #[error("Key material was generated for circuit {found}, expected {expected}")]
    CircuitMismatch { expected: String, found: String },

    #[error("Trusted setup failed: {0}")]
    Setup(String),
}

/// Where the key pair comes from. Selected by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStrategy {
    Generated,
    Persisted {
        proving_key: PathBuf,
        verification_key: PathBuf,
    },
}

impl KeyStrategy {
    /// Persisted keys using the default file names inside `dir`.
    pub fn persisted_in(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        KeyStrategy::Persisted {
            proving_key: dir.join(PROVING_KEY_FILE),
            verification_key: dir.join(VERIFICATION_KEY_FILE),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            KeyStrategy::Generated => "generated",
            KeyStrategy::Persisted { .. } => "persisted",
        }
    }

    /// Produce the key pair for `program`.
    pub fn initialize(&self, program: &CompiledProgram) -> Result<KeyPair, SetupError> {
        match self {
            KeyStrategy::Generated => {
                warn!("Running an in-memory trusted setup; keys are not suitable for production");
                KeyPair::generate(program, &mut OsRng)
            }
            KeyStrategy::Persisted {
                proving_key,
                verification_key,
            } => KeyPair::load(program, proving_key, verification_key),
        }
    }
}

/// Key material bound to one compiled program.
pub struct KeyPair {
    proving_key: ProvingKey<Bn254>,
    prepared_vk: PreparedVerifyingKey<Bn254>,
    document: VerificationKeyDocument,
}

impl KeyPair {
    /// Run a circuit-specific trusted setup.
    pub fn generate<R: RngCore + CryptoRng>(
        program: &CompiledProgram,
        rng: &mut R,
    ) -> Result<Self, SetupError> {
        info!("Running trusted setup for circuit {}", program.digest_hex());
        let started = Instant::now();

        let (proving_key, verifying_key) =
            Groth16::<Bn254>::circuit_specific_setup(LockCircuit::blank(), rng)
                .map_err(|e| SetupError::Setup(e.to_string()))?;

        info!("Trusted setup finished in {:.2?}", started.elapsed());

        let document = VerificationKeyDocument::from_key(&verifying_key, program);
        Self::assemble(program, proving_key, verifying_key, document)
    }

    /// Read a proving key blob and a verification key document.
    pub fn load(
        program: &CompiledProgram,
        proving_key_path: &Path,
        verification_key_path: &Path,
    ) -> Result<Self, SetupError> {
        info!(
            "Loading keys from {} and {}",
            proving_key_path.display(),
            verification_key_path.display()
        );

        let document_json = read(verification_key_path)?;
        let document: VerificationKeyDocument =
            serde_json::from_slice(&document_json).map_err(|e| SetupError::Parse {
                path: verification_key_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if document.circuit != program.digest_hex() {
            return Err(SetupError::CircuitMismatch {
                expected: program.digest_hex(),
                found: document.circuit,
            });
        }

        let verifying_key = document.to_key().map_err(|e| SetupError::Parse {
            path: verification_key_path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Proving key points are not subgroup-checked; the blob is accepted only
        // if its embedded verification key equals the validated document.
        let blob = read(proving_key_path)?;
        let proving_key = ProvingKey::<Bn254>::deserialize_uncompressed_unchecked(&blob[..])
            .map_err(|e| SetupError::Parse {
                path: proving_key_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if VerificationKeyDocument::from_key(&proving_key.vk, program) != document {
            return Err(SetupError::Parse {
                path: proving_key_path.to_path_buf(),
                reason: "proving key does not match the verification key document".to_string(),
            });
        }

        Self::assemble(program, proving_key, verifying_key, document)
    }

    fn assemble(
        program: &CompiledProgram,
        proving_key: ProvingKey<Bn254>,
        verifying_key: VerifyingKey<Bn254>,
        document: VerificationKeyDocument,
    ) -> Result<Self, SetupError> {
        if verifying_key.gamma_abc_g1.len() != program.num_instance_variables() {
            return Err(SetupError::CircuitMismatch {
                expected: format!("{} public inputs", program.num_public_inputs()),
                found: format!("{} public inputs", verifying_key.gamma_abc_g1.len().saturating_sub(1)),
            });
        }

        let prepared_vk = Groth16::<Bn254>::process_vk(&verifying_key)
            .map_err(|e| SetupError::Setup(e.to_string()))?;

        Ok(Self {
            proving_key,
            prepared_vk,
            document,
        })
    }

    pub fn proving_key(&self) -> &ProvingKey<Bn254> {
        &self.proving_key
    }

    pub fn verifying_key(&self) -> &VerifyingKey<Bn254> {
        &self.proving_key.vk
    }

    pub fn prepared_verifying_key(&self) -> &PreparedVerifyingKey<Bn254> {
        &self.prepared_vk
    }

    pub fn document(&self) -> &VerificationKeyDocument {
        &self.document
    }

    /// Write both key files into `dir`. Used by `hashlock-keygen`; the service
    /// itself only ever reads key material.
    pub fn export(&self, dir: &Path) -> Result<(PathBuf, PathBuf), SetupError> {
        fs::create_dir_all(dir).map_err(|source| SetupError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        let proving_key_path = dir.join(PROVING_KEY_FILE);
        let mut blob = Vec::with_capacity(self.proving_key.uncompressed_size());
        self.proving_key
            .serialize_uncompressed(&mut blob)
            .map_err(|e| SetupError::Serialize {
                path: proving_key_path.clone(),
                reason: e.to_string(),
            })?;
        write(&proving_key_path, &blob)?;

        let verification_key_path = dir.join(VERIFICATION_KEY_FILE);
        let document =
            serde_json::to_vec_pretty(&self.document).map_err(|e| SetupError::Serialize {
                path: verification_key_path.clone(),
                reason: e.to_string(),
            })?;
        write(&verification_key_path, &document)?;

        Ok((proving_key_path, verification_key_path))
    }
}

fn read(path: &Path) -> Result<Vec<u8>, SetupError> {
    fs::read(path).map_err(|source| SetupError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, contents: &[u8]) -> Result<(), SetupError> {
    fs::write(path, contents).map_err(|source| SetupError::Write {
        path: path.to_path_buf(),
        source,
    })
}
