//! Keccak-256 gadget over byte variables.
//!
//! Computes the Ethereum flavour of Keccak (pad10*1 with domain byte `0x01`),
//! so the result matches `hashlock_common::keccak256` bit for bit.

use ark_ff::PrimeField;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::SynthesisError;

/// Sponge rate in bytes for a 256-bit capacity-512 instance.
pub const RATE_BYTES: usize = 136;

const LANES: usize = 25;
const ROUNDS: usize = 24;

const ROUND_CONSTANTS: [u64; ROUNDS] = [
    0x0000_0000_0000_0001,
    0x0000_0000_0000_8082,
    0x8000_0000_0000_808a,
    0x8000_0000_8000_8000,
    0x0000_0000_0000_808b,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8009,
    0x0000_0000_0000_008a,
    0x0000_0000_0000_0088,
    0x0000_0000_8000_8009,
    0x0000_0000_8000_000a,
    0x0000_0000_8000_808b,
    0x8000_0000_0000_008b,
    0x8000_0000_0000_8089,
    0x8000_0000_0000_8003,
    0x8000_0000_0000_8002,
    0x8000_0000_0000_0080,
    0x0000_0000_0000_800a,
    0x8000_0000_8000_000a,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8080,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8008,
];

/// Rotation offsets indexed `[x][y]`.
const ROTATIONS: [[usize; 5]; 5] = [
    [0, 36, 3, 41, 18],
    [1, 44, 10, 45, 2],
    [62, 6, 43, 15, 61],
    [28, 55, 25, 21, 56],
    [27, 20, 39, 8, 14],
];

/// Hash `input` and return the 32 digest bytes.
pub fn keccak256<F: PrimeField>(input: &[UInt8<F>]) -> Result<Vec<UInt8<F>>, SynthesisError> {
    let padded = pad(input);
    let mut state: Vec<UInt64<F>> = (0..LANES).map(|_| UInt64::constant(0)).collect();

    for block in padded.chunks(RATE_BYTES) {
        for (i, lane_bytes) in block.chunks(8).enumerate() {
            let lane = bytes_to_lane(lane_bytes)?;
            state[i] = &state[i] ^ &lane;
        }
        keccak_f1600(&mut state);
    }

    let mut digest = Vec::with_capacity(32);
    for lane in &state[..4] {
        let bits = lane.to_bits_le()?;
        for byte_bits in bits.chunks(8) {
            digest.push(UInt8::from_bits_le(byte_bits));
        }
    }
    Ok(digest)
}

/// Append the constant pad10*1 suffix so the length is a multiple of the rate.
fn pad<F: PrimeField>(input: &[UInt8<F>]) -> Vec<UInt8<F>> {
    let pad_len = RATE_BYTES - input.len() % RATE_BYTES;
    let mut padded = input.to_vec();

    if pad_len == 1 {
        padded.push(UInt8::constant(0x81));
    } else {
        padded.push(UInt8::constant(0x01));
        padded.extend((0..pad_len - 2).map(|_| UInt8::constant(0x00)));
        padded.push(UInt8::constant(0x80));
    }
    padded
}

/// Little-endian lane from eight bytes.
fn bytes_to_lane<F: PrimeField>(bytes: &[UInt8<F>]) -> Result<UInt64<F>, SynthesisError> {
    let mut bits = Vec::with_capacity(64);
    for byte in bytes {
        bits.extend(byte.to_bits_le()?);
    }
    Ok(UInt64::from_bits_le(&bits))
}

fn keccak_f1600<F: PrimeField>(a: &mut [UInt64<F>]) {
    for rc in ROUND_CONSTANTS {
        // θ
        let c: Vec<UInt64<F>> = (0..5)
            .map(|x| &(&(&(&a[x] ^ &a[x + 5]) ^ &a[x + 10]) ^ &a[x + 15]) ^ &a[x + 20])
            .collect();
        for x in 0..5 {
            let d = &c[(x + 4) % 5] ^ &c[(x + 1) % 5].rotate_left(1);
            for y in 0..5 {
                a[x + 5 * y] = &a[x + 5 * y] ^ &d;
            }
        }

        // ρ and π
        let mut b = a.to_vec();
        for x in 0..5 {
            for y in 0..5 {
                b[y + 5 * ((2 * x + 3 * y) % 5)] = a[x + 5 * y].rotate_left(ROTATIONS[x][y]);
            }
        }

        // χ
        for y in 0..5 {
            for x in 0..5 {
                let masked = &(!&b[(x + 1) % 5 + 5 * y]) & &b[(x + 2) % 5 + 5 * y];
                a[x + 5 * y] = &b[x + 5 * y] ^ &masked;
            }
        }

        // ι
        a[0] = &a[0] ^ &UInt64::constant(rc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;
    use ark_relations::r1cs::{ConstraintSystem, ConstraintSystemRef};

    fn witness_bytes(cs: &ConstraintSystemRef<Fr>, data: &[u8]) -> Vec<UInt8<Fr>> {
        data.iter()
            .map(|byte| UInt8::new_witness(cs.clone(), || Ok(*byte)).unwrap())
            .collect()
    }

    fn assert_matches_native(data: &[u8]) {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let input = witness_bytes(&cs, data);

        let digest = keccak256(&input).unwrap();
        let value: Vec<u8> = digest.iter().map(|b| b.value().unwrap()).collect();

        assert!(cs.is_satisfied().unwrap());
        assert_eq!(value, hashlock_common::keccak256(data).to_vec(), "len {}", data.len());
    }

    #[test]
    fn test_empty_input() {
        assert_matches_native(&[]);
    }

    #[test]
    fn test_lock_preimage_length() {
        let mut data = vec![0x11u8; 32];
        data.extend_from_slice(&[0xaa; 20]);
        assert_matches_native(&data);
    }

    #[test]
    fn test_single_byte_padding() {
        // The domain byte and the final bit share the last byte of the block.
        let data: Vec<u8> = (0..RATE_BYTES as u8 - 1).collect();
        assert_matches_native(&data);
    }

    #[test]
    fn test_two_blocks() {
        let data: Vec<u8> = (0..RATE_BYTES as u8 + 4).map(|b| b.wrapping_mul(7)).collect();
        assert_matches_native(&data);
    }

    #[test]
    fn test_constant_input() {
        let input: Vec<UInt8<Fr>> = b"abc".iter().map(|b| UInt8::constant(*b)).collect();

        let digest = keccak256(&input).unwrap();
        let value: Vec<u8> = digest.iter().map(|b| b.value().unwrap()).collect();

        assert!(digest.iter().all(|b| b.is_constant()));
        assert_eq!(value, hashlock_common::keccak256(b"abc").to_vec());
    }
}
