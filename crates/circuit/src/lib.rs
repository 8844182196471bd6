//! Hash-lock unlock circuit
//!
//! Encodes the predicate
//!
//! ```text
//! keccak256(password ∥ locker) == lock_hash  ∧  unlocker != locker
//! ```
//!
//! as a rank-1 constraint system over the BN254 scalar field. `password` is a
//! private witness; `locker`, `unlocker` and `lock_hash` are public inputs,
//! one field element per byte, in that order.

pub mod keccak;
pub mod lock;
pub mod program;

pub use lock::{public_inputs, LockCircuit};
pub use program::{CircuitError, CompiledProgram, CIRCUIT_ID};
