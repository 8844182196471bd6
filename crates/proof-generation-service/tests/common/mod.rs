//! Shared fixtures for the integration suites.
//!
//! Trusted setup is the slow part, so each test binary runs it once with a
//! fixed seed and hands out the same prover.

#![allow(dead_code)]

use hashlock_circuit::CompiledProgram;
use hashlock_common::{lock_hash, LockPredicateInputs};
use proof_generation_service::{KeyPair, Prover};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::sync::{Arc, OnceLock};

pub const SETUP_SEED: u64 = 0x6861_7368_6c6f_636b;

pub fn prover() -> Arc<Prover> {
    static PROVER: OnceLock<Arc<Prover>> = OnceLock::new();

    PROVER
        .get_or_init(|| {
            let program = CompiledProgram::compile().expect("circuit compiles");
            let keys = KeyPair::generate(&program, &mut StdRng::seed_from_u64(SETUP_SEED))
                .expect("trusted setup succeeds");
            Arc::new(Prover::new(program, keys, "generated"))
        })
        .clone()
}

/// Password 0x11..11, locker 0xAA..AA, unlocker 0xBB..BB, honest lock hash.
pub fn scenario_a() -> LockPredicateInputs {
    let password = [0x11; 32];
    let locker = [0xaa; 20];
    LockPredicateInputs::new(password, locker, [0xbb; 20], lock_hash(&password, &locker))
}

/// Scenario A with the unlocker set to the locker.
pub fn scenario_b() -> LockPredicateInputs {
    let mut inputs = scenario_a();
    inputs.unlocker = inputs.locker;
    inputs
}

/// Scenario A with one lock hash byte flipped.
pub fn scenario_c() -> LockPredicateInputs {
    let mut inputs = scenario_a();
    inputs.lock_hash[0] ^= 0xff;
    inputs
}

/// Request body for `inputs`, as a client would send it.
pub fn request_body(inputs: &LockPredicateInputs) -> serde_json::Value {
    json!({
        "passwordHex": format!("0x{}", hex::encode(inputs.password)),
        "lockerAddressHex": format!("0x{}", hex::encode(inputs.locker)),
        "unlockerAddressHex": format!("0x{}", hex::encode(inputs.unlocker)),
        "lockHashHex": format!("0x{}", hex::encode(inputs.lock_hash)),
    })
}
