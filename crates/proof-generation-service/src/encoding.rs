//! Hex encodings shared with the on-chain verifier.
//!
//! Field elements are `0x`-prefixed, 32-byte, big-endian hex. G2 coordinates
//! are written imaginary part first (`[c1, c0]`), which is the order the
//! EVM pairing precompile consumes.

use ark_bn254::{Bn254, Fq, Fq2, G1Affine, G2Affine};
use ark_ff::{BigInteger, PrimeField};
use ark_groth16::{Proof, VerifyingKey};
use hashlock_circuit::CompiledProgram;
use hashlock_common::{codec, HexError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const FIELD_BYTES: usize = 32;

pub const SCHEME: &str = "g16";
pub const CURVE: &str = "bn128";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    #[error("invalid field element: {0}")]
    Hex(#[from] HexError),

    #[error("field element is not reduced: {0}")]
    NonCanonical(String),

    #[error("point is not on the curve or not in the prime-order subgroup")]
    InvalidPoint,

    #[error("unsupported {field}: {value}")]
    Unsupported { field: &'static str, value: String },
}

pub type G1Hex = [String; 2];
pub type G2Hex = [[String; 2]; 2];

/// A Groth16 proof in verifier ABI layout:
/// `[[a0, a1], [[b00, b01], [b10, b11]], [c0, c1]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolidityProof(pub G1Hex, pub G2Hex, pub G1Hex);

impl SolidityProof {
    pub fn from_proof(proof: &Proof<Bn254>) -> Self {
        Self(g1_to_hex(&proof.a), g2_to_hex(&proof.b), g1_to_hex(&proof.c))
    }

    pub fn to_proof(&self) -> Result<Proof<Bn254>, EncodingError> {
        Ok(Proof {
            a: g1_from_hex(&self.0)?,
            b: g2_from_hex(&self.1)?,
            c: g1_from_hex(&self.2)?,
        })
    }
}

/// JSON verification key document, tagged with the circuit digest it was
/// generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationKeyDocument {
    pub scheme: String,
    pub curve: String,
    pub circuit: String,
    pub alpha: G1Hex,
    pub beta: G2Hex,
    pub gamma: G2Hex,
    pub delta: G2Hex,
    pub gamma_abc: Vec<G1Hex>,
}

impl VerificationKeyDocument {
    pub fn from_key(vk: &VerifyingKey<Bn254>, program: &CompiledProgram) -> Self {
        Self {
            scheme: SCHEME.to_string(),
            curve: CURVE.to_string(),
            circuit: program.digest_hex(),
            alpha: g1_to_hex(&vk.alpha_g1),
            beta: g2_to_hex(&vk.beta_g2),
            gamma: g2_to_hex(&vk.gamma_g2),
            delta: g2_to_hex(&vk.delta_g2),
            gamma_abc: vk.gamma_abc_g1.iter().map(g1_to_hex).collect(),
        }
    }

    pub fn to_key(&self) -> Result<VerifyingKey<Bn254>, EncodingError> {
        if self.scheme != SCHEME {
            return Err(EncodingError::Unsupported {
                field: "scheme",
                value: self.scheme.clone(),
            });
        }
        if self.curve != CURVE {
            return Err(EncodingError::Unsupported {
                field: "curve",
                value: self.curve.clone(),
            });
        }

        Ok(VerifyingKey {
            alpha_g1: g1_from_hex(&self.alpha)?,
            beta_g2: g2_from_hex(&self.beta)?,
            gamma_g2: g2_from_hex(&self.gamma)?,
            delta_g2: g2_from_hex(&self.delta)?,
            gamma_abc_g1: self
                .gamma_abc
                .iter()
                .map(g1_from_hex)
                .collect::<Result<_, _>>()?,
        })
    }
}

pub fn field_to_hex(value: &Fq) -> String {
    codec::encode_prefixed(value.into_bigint().to_bytes_be())
}

/// Parse a field element, rejecting values at or above the modulus.
pub fn field_from_hex(input: &str) -> Result<Fq, EncodingError> {
    let bytes = codec::decode(input, FIELD_BYTES)?;
    let value = Fq::from_be_bytes_mod_order(&bytes);
    if value.into_bigint().to_bytes_be() != bytes {
        return Err(EncodingError::NonCanonical(input.to_string()));
    }
    Ok(value)
}

fn g1_to_hex(point: &G1Affine) -> G1Hex {
    [field_to_hex(&point.x), field_to_hex(&point.y)]
}

fn g2_to_hex(point: &G2Affine) -> G2Hex {
    [
        [field_to_hex(&point.x.c1), field_to_hex(&point.x.c0)],
        [field_to_hex(&point.y.c1), field_to_hex(&point.y.c0)],
    ]
}

fn g1_from_hex(coords: &G1Hex) -> Result<G1Affine, EncodingError> {
    let point = G1Affine::new_unchecked(field_from_hex(&coords[0])?, field_from_hex(&coords[1])?);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(EncodingError::InvalidPoint);
    }
    Ok(point)
}

fn g2_from_hex(coords: &G2Hex) -> Result<G2Affine, EncodingError> {
    let [x, y] = coords;
    let point = G2Affine::new_unchecked(
        Fq2::new(field_from_hex(&x[1])?, field_from_hex(&x[0])?),
        Fq2::new(field_from_hex(&y[1])?, field_from_hex(&y[0])?),
    );
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(EncodingError::InvalidPoint);
    }
    Ok(point)
}
