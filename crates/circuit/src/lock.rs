use std::fmt;

use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use hashlock_common::{LockPredicateInputs, PublicInputs, ADDRESS_LEN, HASH_LEN, PASSWORD_LEN};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::keccak;

/// The unlock predicate with a concrete assignment.
///
/// Setup only needs the shape, so it runs on [`LockCircuit::blank`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct LockCircuit {
    password: [u8; PASSWORD_LEN],
    locker: [u8; ADDRESS_LEN],
    unlocker: [u8; ADDRESS_LEN],
    lock_hash: [u8; HASH_LEN],
}

impl LockCircuit {
    pub fn new(inputs: &LockPredicateInputs) -> Self {
        Self {
            password: inputs.password,
            locker: inputs.locker,
            unlocker: inputs.unlocker,
            lock_hash: inputs.lock_hash,
        }
    }

    /// All-zero assignment, used for compilation and key generation.
    pub fn blank() -> Self {
        Self {
            password: [0; PASSWORD_LEN],
            locker: [0; ADDRESS_LEN],
            unlocker: [0; ADDRESS_LEN],
            lock_hash: [0; HASH_LEN],
        }
    }
}

impl fmt::Debug for LockCircuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockCircuit")
            .field("password", &"<redacted>")
            .field("locker", &hex::encode(self.locker))
            .field("unlocker", &hex::encode(self.unlocker))
            .field("lock_hash", &hex::encode(self.lock_hash))
            .finish()
    }
}

impl<F: PrimeField> ConstraintSynthesizer<F> for LockCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<F>) -> Result<(), SynthesisError> {
        let password = self
            .password
            .iter()
            .map(|byte| UInt8::new_witness(cs.clone(), || Ok(*byte)))
            .collect::<Result<Vec<_>, _>>()?;

        // Public inputs are allocated in the order verifiers supply them.
        let (locker, locker_packed) = alloc_public_bytes(&cs, &self.locker)?;
        let (_, unlocker_packed) = alloc_public_bytes(&cs, &self.unlocker)?;
        let (lock_hash, _) = alloc_public_bytes(&cs, &self.lock_hash)?;

        let preimage: Vec<UInt8<F>> = password.into_iter().chain(locker).collect();
        let digest = keccak::keccak256(&preimage)?;
        for (computed, expected) in digest.iter().zip(&lock_hash) {
            computed.enforce_equal(expected)?;
        }

        locker_packed.enforce_not_equal(&unlocker_packed)?;

        Ok(())
    }
}

/// Allocate each byte as one public field element, bind it to an 8-bit
/// witness decomposition, and return the bytes plus their big-endian packing.
fn alloc_public_bytes<F: PrimeField>(
    cs: &ConstraintSystemRef<F>,
    bytes: &[u8],
) -> Result<(Vec<UInt8<F>>, FpVar<F>), SynthesisError> {
    let mut vars = Vec::with_capacity(bytes.len());
    let mut packed = FpVar::<F>::zero();

    for byte in bytes {
        let input = FpVar::new_input(cs.clone(), || Ok(F::from(*byte as u64)))?;
        let var = UInt8::new_witness(cs.clone(), || Ok(*byte))?;

        let recomposed = var
            .to_bits_le()?
            .into_iter()
            .enumerate()
            .fold(FpVar::<F>::zero(), |acc, (i, bit)| {
                acc + FpVar::from(bit) * F::from(1u64 << i)
            });
        recomposed.enforce_equal(&input)?;

        packed = packed * F::from(256u64) + input;
        vars.push(var);
    }

    Ok((vars, packed))
}

/// Public inputs in allocation order: locker, unlocker, lock hash, one field
/// element per byte.
pub fn public_inputs<F: PrimeField>(public: &PublicInputs) -> Vec<F> {
    public
        .locker
        .iter()
        .chain(&public.unlocker)
        .chain(&public.lock_hash)
        .map(|byte| F::from(*byte as u64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;
    use ark_relations::r1cs::ConstraintSystem;

    fn scenario_a() -> LockPredicateInputs {
        let password = [0x11; 32];
        let locker = [0xaa; 20];
        LockPredicateInputs::new(
            password,
            locker,
            [0xbb; 20],
            hashlock_common::lock_hash(&password, &locker),
        )
    }

    /// Synthesis errors count as unsatisfied, as they do for the prover.
    fn satisfied(inputs: &LockPredicateInputs) -> bool {
        let cs = ConstraintSystem::<Fr>::new_ref();
        match LockCircuit::new(inputs).generate_constraints(cs.clone()) {
            Ok(()) => cs.is_satisfied().unwrap(),
            Err(_) => false,
        }
    }

    #[test]
    fn test_valid_unlock_is_satisfied() {
        assert!(satisfied(&scenario_a()));
    }

    #[test]
    fn test_unlocker_equal_to_locker_fails() {
        let mut inputs = scenario_a();
        inputs.unlocker = inputs.locker;
        assert!(!satisfied(&inputs));
    }

    #[test]
    fn test_flipped_hash_byte_fails() {
        let mut inputs = scenario_a();
        inputs.lock_hash[7] ^= 0x01;
        assert!(!satisfied(&inputs));
    }

    #[test]
    fn test_wrong_password_fails() {
        let mut inputs = scenario_a();
        inputs.password[31] = 0x12;
        assert!(!satisfied(&inputs));
    }

    #[test]
    fn test_unlocker_differing_in_one_byte_passes() {
        let mut inputs = scenario_a();
        inputs.unlocker = inputs.locker;
        inputs.unlocker[19] = 0xab;
        assert!(satisfied(&inputs));
    }

    #[test]
    fn test_public_input_layout() {
        let inputs = scenario_a();
        let cs = ConstraintSystem::<Fr>::new_ref();
        LockCircuit::new(&inputs).generate_constraints(cs.clone()).unwrap();

        let expected = public_inputs::<Fr>(&inputs.public());
        assert_eq!(expected.len(), 2 * ADDRESS_LEN + HASH_LEN);
        // Instance variable 0 is the constant one.
        assert_eq!(cs.num_instance_variables(), expected.len() + 1);
        assert_eq!(expected[0], Fr::from(0xaau64));
        assert_eq!(expected[ADDRESS_LEN], Fr::from(0xbbu64));
        assert_eq!(expected[2 * ADDRESS_LEN], Fr::from(inputs.lock_hash[0] as u64));
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", LockCircuit::new(&scenario_a()));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(&"11".repeat(32)));
    }
}
