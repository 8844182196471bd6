//! One-time compilation of the lock circuit into a fixed constraint system.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use ark_relations::r1cs::{
    ConstraintSynthesizer, ConstraintSystem, ConstraintSystemRef, Matrix, OptimizationGoal, SynthesisMode,
};
use sha3::{Digest, Keccak256};
use thiserror::Error;
use tracing::{debug, info};

use crate::lock::LockCircuit;

/// Identifier mixed into the circuit digest. Bump when the predicate changes.
pub const CIRCUIT_ID: &str = "hashlock/keccak256-unlock/v1";

#[derive(Error, Debug)]
pub enum CircuitError {
    #[error("Circuit synthesis failed: {0}")]
    Synthesis(String),

    #[error("Compilation error: {0}")]
    Compile(String),
}

/// The compiled unlock circuit.
///
/// Arkworks re-synthesizes circuits on demand, so the program keeps the shape
/// of the constraint system and a digest over its matrices. Key material is
/// tagged with that digest so keys from another circuit revision are refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProgram {
    num_constraints: usize,
    num_instance_variables: usize,
    num_witness_variables: usize,
    digest: [u8; 32],
}

impl CompiledProgram {
    /// Synthesize the circuit in setup mode and fingerprint the result.
    pub fn compile() -> Result<Self, CircuitError> {
        info!("Compiling unlock circuit ({})", CIRCUIT_ID);

        let cs = ConstraintSystem::<Fr>::new_ref();
        cs.set_optimization_goal(OptimizationGoal::Constraints);
        cs.set_mode(SynthesisMode::Setup);

        LockCircuit::blank()
            .generate_constraints(cs.clone())
            .map_err(|e| CircuitError::Synthesis(e.to_string()))?;
        cs.finalize();

        let matrices = cs
            .to_matrices()
            .ok_or_else(|| CircuitError::Compile("constraint matrices unavailable".to_string()))?;

        let mut hasher = Keccak256::new();
        hasher.update(CIRCUIT_ID.as_bytes());
        for count in [
            matrices.num_constraints,
            matrices.num_instance_variables,
            matrices.num_witness_variables,
        ] {
            hasher.update((count as u64).to_le_bytes());
        }
        for matrix in [&matrices.a, &matrices.b, &matrices.c] {
            hash_matrix(&mut hasher, matrix);
        }

        let program = Self {
            num_constraints: matrices.num_constraints,
            num_instance_variables: matrices.num_instance_variables,
            num_witness_variables: matrices.num_witness_variables,
            digest: hasher.finalize().into(),
        };

        info!(
            "Circuit compiled: {} constraints, {} public inputs, digest {}",
            program.num_constraints,
            program.num_public_inputs(),
            program.digest_hex()
        );

        Ok(program)
    }

    pub fn num_constraints(&self) -> usize {
        self.num_constraints
    }

    /// Instance variables including the leading constant one.
    pub fn num_instance_variables(&self) -> usize {
        self.num_instance_variables
    }

    pub fn num_witness_variables(&self) -> usize {
        self.num_witness_variables
    }

    pub fn num_public_inputs(&self) -> usize {
        self.num_instance_variables - 1
    }

    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    pub fn digest_hex(&self) -> String {
        format!("0x{}", hex::encode(self.digest))
    }

    /// Whether a freshly synthesized system has this program's shape.
    pub fn matches_shape(&self, cs: &ConstraintSystemRef<Fr>) -> bool {
        cs.num_constraints() == self.num_constraints
            && cs.num_instance_variables() == self.num_instance_variables
            && cs.num_witness_variables() == self.num_witness_variables
    }
}

fn hash_matrix(hasher: &mut Keccak256, matrix: &Matrix<Fr>) {
    debug!("Hashing {} constraint rows", matrix.len());
    for row in matrix {
        hasher.update((row.len() as u64).to_le_bytes());
        for (coeff, index) in row {
            hasher.update(coeff.into_bigint().to_bytes_le());
            hasher.update((*index as u64).to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashlock_common::{ADDRESS_LEN, HASH_LEN};

    #[test]
    fn test_compile_is_deterministic() {
        let first = CompiledProgram::compile().unwrap();
        let second = CompiledProgram::compile().unwrap();

        assert_eq!(first, second);
        assert_eq!(first.num_public_inputs(), 2 * ADDRESS_LEN + HASH_LEN);
        assert!(first.num_constraints() > 0);
        assert!(first.digest_hex().starts_with("0x"));
        assert_eq!(first.digest_hex().len(), 66);
    }
}
