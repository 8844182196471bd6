//! Hash-lock key generation and proof utility
//!
//! Commands:
//! - setup: Compile the circuit, run a trusted setup, write key files
//! - lock-hash: Compute the on-chain commitment for a password and locker
//! - verify: Check an encoded proof against a verification key document
//! - inspect: Show the compiled circuit's digest and shape

use anyhow::{Context, Result};
use ark_bn254::Bn254;
use ark_groth16::Groth16;
use ark_snark::SNARK;
use clap::{Parser, Subcommand};
use hashlock_circuit::CompiledProgram;
use hashlock_common::{codec, lock_hash, PublicInputs, ADDRESS_LEN, PASSWORD_LEN};
use proof_generation_service::keys::KeyPair;
use proof_generation_service::prover::verify_proof;
use proof_generation_service::{SolidityProof, VerificationKeyDocument};
use rand::rngs::OsRng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hashlock-keygen")]
#[command(about = "Groth16 key generation and proof tooling for the hash-lock circuit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a trusted setup and write proving.key and verification.key
    Setup {
        /// Directory to write the key files into
        #[arg(short, long, default_value = "./keys")]
        out_dir: PathBuf,
    },

    /// Compute keccak256(password ∥ locker)
    LockHash {
        /// 32-byte password (hex)
        #[arg(short, long)]
        password: String,

        /// 20-byte locker address (hex)
        #[arg(short, long)]
        locker: String,
    },

    /// Verify a JSON-encoded proof
    Verify {
        /// Verification key document
        #[arg(long, default_value = "./keys/verification.key")]
        verification_key: PathBuf,

        /// File containing the proof, or a `{"proof": ...}` response body
        #[arg(long)]
        proof: PathBuf,

        #[arg(long)]
        locker: String,

        #[arg(long)]
        unlocker: String,

        #[arg(long)]
        lock_hash: String,
    },

    /// Print the circuit digest and constraint counts
    Inspect,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "proof_generation_service=info,hashlock_circuit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Setup { out_dir } => setup(&out_dir)?,
        Commands::LockHash { password, locker } => print_lock_hash(&password, &locker)?,
        Commands::Verify {
            verification_key,
            proof,
            locker,
            unlocker,
            lock_hash,
        } => verify(&verification_key, &proof, &locker, &unlocker, &lock_hash)?,
        Commands::Inspect => inspect()?,
    }

    Ok(())
}

fn setup(out_dir: &Path) -> Result<()> {
    println!("=== Hash-Lock Trusted Setup ===\n");

    let program = CompiledProgram::compile()?;
    let keys = KeyPair::generate(&program, &mut OsRng)?;
    let (proving_key, verification_key) = keys.export(out_dir)?;

    println!("Circuit digest:   {}", program.digest_hex());
    println!("Proving key:      {}", proving_key.display());
    println!("Verification key: {}", verification_key.display());
    println!();
    println!("=== Copy to .env file ===");
    println!("KEY_STRATEGY=persisted");
    println!("PROVING_KEY_PATH={}", proving_key.display());
    println!("VERIFICATION_KEY_PATH={}", verification_key.display());

    Ok(())
}

fn print_lock_hash(password_hex: &str, locker_hex: &str) -> Result<()> {
    let password = codec::decode_array::<PASSWORD_LEN>(password_hex).context("Invalid password")?;
    let locker = codec::decode_array::<ADDRESS_LEN>(locker_hex).context("Invalid locker address")?;

    println!("{}", codec::encode_prefixed(lock_hash(&password, &locker)));

    Ok(())
}

fn verify(
    verification_key: &Path,
    proof_path: &Path,
    locker: &str,
    unlocker: &str,
    lock_hash: &str,
) -> Result<()> {
    let document: VerificationKeyDocument = read_json(verification_key)?;

    let program = CompiledProgram::compile()?;
    if document.circuit != program.digest_hex() {
        anyhow::bail!(
            "Verification key is for circuit {}, this build compiles {}",
            document.circuit,
            program.digest_hex()
        );
    }

    let vk = document
        .to_key()
        .with_context(|| format!("Invalid verification key {}", verification_key.display()))?;
    let pvk = Groth16::<Bn254>::process_vk(&vk)
        .map_err(|e| anyhow::anyhow!("Failed to prepare verification key: {}", e))?;

    let proof = read_proof(proof_path)?;
    let public = PublicInputs::from_hex(locker, unlocker, lock_hash)?;

    if verify_proof(&pvk, &proof, &public)? {
        println!("Proof is valid");
        Ok(())
    } else {
        anyhow::bail!("Proof is NOT valid for these public inputs")
    }
}

fn inspect() -> Result<()> {
    let program = CompiledProgram::compile()?;

    println!("Circuit digest:      {}", program.digest_hex());
    println!("Constraints:         {}", program.num_constraints());
    println!("Public inputs:       {}", program.num_public_inputs());
    println!("Witness variables:   {}", program.num_witness_variables());

    Ok(())
}

/// Accepts either a bare proof tuple or a service response body.
fn read_proof(path: &Path) -> Result<SolidityProof> {
    let value: serde_json::Value = read_json(path)?;
    let proof = match value.get("proof") {
        Some(inner) => inner.clone(),
        None => value,
    };

    serde_json::from_value(proof).with_context(|| format!("Malformed proof in {}", path.display()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_proof() -> SolidityProof {
        let g1 = || ["0x01".to_string(), "0x02".to_string()];
        SolidityProof(g1(), [g1(), g1()], g1())
    }

    #[test]
    fn test_read_bare_proof() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proof.json");
        fs::write(&path, serde_json::to_vec(&sample_proof()).unwrap()).unwrap();

        assert_eq!(read_proof(&path).unwrap(), sample_proof());
    }

    #[test]
    fn test_read_proof_from_response_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("response.json");
        let body = serde_json::json!({ "proof": sample_proof() });
        fs::write(&path, serde_json::to_vec(&body).unwrap()).unwrap();

        assert_eq!(read_proof(&path).unwrap(), sample_proof());
    }

    #[test]
    fn test_read_proof_rejects_other_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proof.json");
        fs::write(&path, br#"{"proof": [["0x01"]]}"#).unwrap();

        let err = read_proof(&path).unwrap_err();
        assert!(err.to_string().starts_with("Malformed proof"));
    }
}
