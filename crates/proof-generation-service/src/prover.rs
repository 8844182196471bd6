//! Groth16 prover for the unlock circuit

use std::time::Instant;

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, PreparedVerifyingKey};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem, OptimizationGoal};
use ark_snark::SNARK;
use hashlock_circuit::{public_inputs, CircuitError, CompiledProgram, LockCircuit};
use hashlock_common::{LockPredicateInputs, PublicInputs};
use rand::{CryptoRng, RngCore};
use thiserror::Error;
use tracing::{debug, info};

use crate::encoding::SolidityProof;
use crate::keys::{KeyPair, KeyStrategy, SetupError};

/// Proof generation failure.
///
/// `AssertionFailed` deliberately carries no detail: callers must not be able
/// to tell a wrong password from `unlocker == locker`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("Incorrect inputs, or assertions failed")]
    AssertionFailed,

    #[error("Internal prover error: {0}")]
    Internal(String),
}

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Compile(#[from] CircuitError),

    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Immutable proving context: the compiled program and its keys.
///
/// Built once at startup and shared read-only by every request.
pub struct Prover {
    program: CompiledProgram,
    keys: KeyPair,
    strategy: &'static str,
}

impl Prover {
    /// Compile the circuit, then obtain keys with `strategy`.
    pub fn initialize(strategy: &KeyStrategy) -> Result<Self, StartupError> {
        let program = CompiledProgram::compile()?;
        let keys = strategy.initialize(&program)?;

        info!(
            "Prover initialized with {} keys for circuit {}",
            strategy.name(),
            program.digest_hex()
        );

        Ok(Self::new(program, keys, strategy.name()))
    }

    pub fn new(program: CompiledProgram, keys: KeyPair, strategy: &'static str) -> Self {
        Self {
            program,
            keys,
            strategy,
        }
    }

    pub fn program(&self) -> &CompiledProgram {
        &self.program
    }

    pub fn keys(&self) -> &KeyPair {
        &self.keys
    }

    /// Name of the key strategy this prover was built with.
    pub fn strategy(&self) -> &'static str {
        self.strategy
    }

    /// Generate a proof that `inputs` satisfy the unlock predicate.
    pub fn generate_proof(&self, inputs: &LockPredicateInputs) -> Result<SolidityProof, ProofError> {
        self.generate_proof_with_rng(inputs, &mut rand::thread_rng())
    }

    pub fn generate_proof_with_rng<R: RngCore + CryptoRng>(
        &self,
        inputs: &LockPredicateInputs,
        rng: &mut R,
    ) -> Result<SolidityProof, ProofError> {
        let started = Instant::now();
        let circuit = LockCircuit::new(inputs);

        self.compute_witness(circuit.clone())?;

        let proof = Groth16::<Bn254>::prove(self.keys.proving_key(), circuit, rng)
            .map_err(|e| ProofError::Internal(format!("proving failed: {}", e)))?;

        let public = public_inputs::<Fr>(&inputs.public());
        let valid = Groth16::<Bn254>::verify_with_processed_vk(
            self.keys.prepared_verifying_key(),
            &public,
            &proof,
        )
        .map_err(|e| ProofError::Internal(format!("self-verification errored: {}", e)))?;
        if !valid {
            return Err(ProofError::Internal(
                "generated proof failed self-verification".to_string(),
            ));
        }

        info!("Proof generated in {:.2?}", started.elapsed());
        Ok(SolidityProof::from_proof(&proof))
    }

    /// Check an encoded proof against public inputs.
    pub fn verify_proof(&self, proof: &SolidityProof, public: &PublicInputs) -> Result<bool, ProofError> {
        verify_proof(self.keys.prepared_verifying_key(), proof, public)
    }

    /// Evaluate the circuit on a concrete assignment.
    ///
    /// Both assertions are checked here, before any proving work. A synthesis
    /// error is how a failed `unlocker != locker` check surfaces, so it is
    /// reported exactly like an unsatisfied hash constraint.
    fn compute_witness(&self, circuit: LockCircuit) -> Result<(), ProofError> {
        let cs = ConstraintSystem::<Fr>::new_ref();
        cs.set_optimization_goal(OptimizationGoal::Constraints);

        if let Err(err) = circuit.generate_constraints(cs.clone()) {
            debug!("Witness computation aborted: {}", err);
            return Err(ProofError::AssertionFailed);
        }
        cs.finalize();

        if !self.program.matches_shape(&cs) {
            return Err(ProofError::Internal(format!(
                "witness shape differs from compiled program {}",
                self.program.digest_hex()
            )));
        }

        match cs.is_satisfied() {
            Ok(true) => Ok(()),
            Ok(false) => {
                debug!("Witness does not satisfy the unlock predicate");
                Err(ProofError::AssertionFailed)
            }
            Err(e) => Err(ProofError::Internal(format!("satisfiability check failed: {}", e))),
        }
    }
}

/// Verify an encoded proof with a prepared verification key.
pub fn verify_proof(
    pvk: &PreparedVerifyingKey<Bn254>,
    proof: &SolidityProof,
    public: &PublicInputs,
) -> Result<bool, ProofError> {
    let proof = proof
        .to_proof()
        .map_err(|e| ProofError::Internal(format!("malformed proof: {}", e)))?;

    Groth16::<Bn254>::verify_with_processed_vk(pvk, &public_inputs::<Fr>(public), &proof)
        .map_err(|e| ProofError::Internal(e.to_string()))
}
