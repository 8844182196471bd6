//! End-to-end proving tests against a shared trusted setup

mod common;

use common::{prover, scenario_a, scenario_b, scenario_c};
use hashlock_common::LockPredicateInputs;
use proof_generation_service::keys::{PROVING_KEY_FILE, VERIFICATION_KEY_FILE};
use proof_generation_service::{
    KeyPair, KeyStrategy, ProofError, Prover, SetupError, SolidityProof, VerificationKeyDocument,
};
use std::fs;

#[test]
fn test_valid_unlock_produces_verifying_proof() {
    let prover = prover();
    let inputs = scenario_a();

    let proof = prover.generate_proof(&inputs).expect("proof for scenario A");

    assert!(prover.verify_proof(&proof, &inputs.public()).unwrap());
}

#[test]
fn test_proof_does_not_verify_for_other_unlocker() {
    let prover = prover();
    let inputs = scenario_a();
    let proof = prover.generate_proof(&inputs).unwrap();

    let mut public = inputs.public();
    public.unlocker[0] = 0xcc;

    assert!(!prover.verify_proof(&proof, &public).unwrap());
}

#[test]
fn test_proof_encoding_layout() {
    let proof = prover().generate_proof(&scenario_a()).unwrap();
    let SolidityProof(a, b, c) = &proof;

    for element in a.iter().chain(b.iter().flatten()).chain(c.iter()) {
        assert!(element.starts_with("0x"));
        assert_eq!(element.len(), 66);
    }

    let json = serde_json::to_value(&proof).unwrap();
    let decoded: SolidityProof = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, proof);
}

#[test]
fn test_unlocker_equal_to_locker_is_rejected() {
    assert_eq!(
        prover().generate_proof(&scenario_b()).unwrap_err(),
        ProofError::AssertionFailed
    );
}

#[test]
fn test_wrong_lock_hash_is_rejected() {
    assert_eq!(
        prover().generate_proof(&scenario_c()).unwrap_err(),
        ProofError::AssertionFailed
    );
}

#[test]
fn test_failures_are_indistinguishable() {
    let prover = prover();

    let wrong_locker = prover.generate_proof(&scenario_b()).unwrap_err();
    let wrong_hash = prover.generate_proof(&scenario_c()).unwrap_err();

    // Both clauses false at once still fails the same way.
    let mut both = scenario_b();
    both.lock_hash[31] ^= 0x01;
    let both = prover.generate_proof(&both).unwrap_err();

    assert_eq!(wrong_locker, wrong_hash);
    assert_eq!(wrong_locker, both);
    assert_eq!(wrong_locker.to_string(), wrong_hash.to_string());
}

#[test]
fn test_short_password_rejected_before_proving() {
    let err = LockPredicateInputs::from_hex(
        &"11".repeat(31),
        &"aa".repeat(20),
        &"bb".repeat(20),
        &"cc".repeat(32),
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "Password must be 32 bytes, got 31");
}

#[test]
fn test_persisted_keys_round_trip() {
    let prover = prover();
    let dir = tempfile::tempdir().unwrap();
    let (pk_path, vk_path) = prover.keys().export(dir.path()).unwrap();

    assert_eq!(pk_path, dir.path().join(PROVING_KEY_FILE));
    assert_eq!(vk_path, dir.path().join(VERIFICATION_KEY_FILE));

    let strategy = KeyStrategy::persisted_in(dir.path());
    let keys = strategy.initialize(prover.program()).expect("persisted keys load");
    assert_eq!(keys.document(), prover.keys().document());

    let reloaded = Prover::new(prover.program().clone(), keys, strategy.name());
    let inputs = scenario_a();
    let proof = reloaded.generate_proof(&inputs).unwrap();

    // Proofs from the reloaded keys verify under the original ones.
    assert!(prover.verify_proof(&proof, &inputs.public()).unwrap());
}

#[test]
fn test_missing_key_files_are_io_errors() {
    let dir = tempfile::tempdir().unwrap();

    let err = KeyStrategy::persisted_in(dir.path())
        .initialize(prover().program())
        .err()
        .unwrap();

    assert!(matches!(err, SetupError::Io { .. }));
}

#[test]
fn test_malformed_verification_key_is_parse_error() {
    let prover = prover();
    let dir = tempfile::tempdir().unwrap();
    let (pk_path, vk_path) = prover.keys().export(dir.path()).unwrap();

    fs::write(&vk_path, b"{ not json").unwrap();

    let err = KeyPair::load(prover.program(), &pk_path, &vk_path).err().unwrap();
    assert!(matches!(err, SetupError::Parse { .. }));
}

#[test]
fn test_truncated_proving_key_is_parse_error() {
    let prover = prover();
    let dir = tempfile::tempdir().unwrap();
    let (pk_path, vk_path) = prover.keys().export(dir.path()).unwrap();

    let blob = fs::read(&pk_path).unwrap();
    fs::write(&pk_path, &blob[..blob.len() / 2]).unwrap();

    let err = KeyPair::load(prover.program(), &pk_path, &vk_path).err().unwrap();
    assert!(matches!(err, SetupError::Parse { .. }));
}

#[test]
fn test_keys_for_another_circuit_are_refused() {
    let prover = prover();
    let dir = tempfile::tempdir().unwrap();
    let (pk_path, vk_path) = prover.keys().export(dir.path()).unwrap();

    let mut document: VerificationKeyDocument =
        serde_json::from_slice(&fs::read(&vk_path).unwrap()).unwrap();
    document.circuit = format!("0x{}", "00".repeat(32));
    fs::write(&vk_path, serde_json::to_vec(&document).unwrap()).unwrap();

    let err = KeyPair::load(prover.program(), &pk_path, &vk_path).err().unwrap();
    assert!(matches!(err, SetupError::CircuitMismatch { .. }));
}

#[test]
fn test_proving_key_must_match_document() {
    let prover = prover();
    let dir = tempfile::tempdir().unwrap();
    let (pk_path, vk_path) = prover.keys().export(dir.path()).unwrap();

    // Same circuit, different setup.
    let other = KeyPair::generate(prover.program(), &mut rand::thread_rng()).unwrap();
    let other_dir = tempfile::tempdir().unwrap();
    let (_, other_vk_path) = other.export(other_dir.path()).unwrap();
    fs::copy(&other_vk_path, &vk_path).unwrap();

    let err = KeyPair::load(prover.program(), &pk_path, &vk_path).err().unwrap();
    assert!(matches!(err, SetupError::Parse { .. }));
}

#[test]
fn test_export_into_a_file_is_write_error() {
    let dir = tempfile::tempdir().unwrap();
    let occupied = dir.path().join("keys");
    fs::write(&occupied, b"not a directory").unwrap();

    let err = prover().keys().export(&occupied).unwrap_err();

    assert!(matches!(err, SetupError::Write { ref path, .. } if path == &occupied));
    assert!(err.to_string().starts_with("Failed to write"));
}
