//! # PQC Classroom Core
//!
//! Small-number cryptography toy-kernel used by the classroom tools.
//!
//! ```text
//! CLASSICAL   Caesar, Vigenère           mod-26 letter arithmetic
//! RSA         p, q < 200                 n = p·q, e·d ≡ 1 (mod φ)
//! LATTICE     v = i·b1 + j·b2            brute-force closest vector
//! ```
//!
//! Everything here is intentionally undersized. Nothing in this crate is
//! suitable for protecting real data.
//!
//! # Modules
//! - `classical` - Caesar and Vigenère over a fixed A-Z alphabet
//! - `rsa` - prime pool, key generation, modular inverse and exponentiation
//! - `lattice` - 2D integer lattices and the closest-vector sampler

pub mod classical;
pub mod lattice;
pub mod rsa;

pub use classical::{
    caesar_bruteforce, caesar_decrypt, caesar_encrypt, normalize, vigenere_decrypt,
    vigenere_encrypt, ALPHABET,
};
pub use lattice::{closest_vector, closest_vector_in, lattice_points, Basis, ClosestPoint, LatticePoint, Vec2};
pub use rsa::{
    generate_toy_rsa, generate_toy_rsa_with, mod_exp, mod_inv, rsa_decrypt, rsa_encrypt,
    PickSource, ScriptedPicks, ToyRsaKeypair,
};

/// Result type for pqc-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the edges of the kernel.
///
/// The kernel functions themselves are total. These only come from parsing
/// user-supplied values before they reach it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid modulus {0}: must be positive")]
    InvalidModulus(u64),
}
