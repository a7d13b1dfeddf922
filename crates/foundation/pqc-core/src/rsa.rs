//! Toy RSA
//!
//! Textbook RSA over primes in [11, 199]. Keys are small enough to factor by
//! hand, which is the point: students can check every step.
//!
//! ```text
//! p, q  ← prime pool, p ≠ q
//! n     = p · q
//! φ     = (p − 1)(q − 1)
//! e     ← {3, 5, 17, 257, 65537} with e < φ, gcd(e, φ) = 1
//! d     = e⁻¹ mod φ
//!
//! encrypt: c = mᵉ mod n
//! decrypt: m = cᵈ mod n
//! ```

use num_bigint::BigInt;
use num_traits::{One, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Smallest prime considered for p and q
pub const PRIME_POOL_MIN: u64 = 11;

/// Largest prime considered for p and q
pub const PRIME_POOL_MAX: u64 = 199;

/// Public exponents tried, in order, before filtering against φ
pub const EXPONENT_CANDIDATES: [u64; 5] = [3, 5, 17, 257, 65537];

/// Used when no candidate survives the filter. Not guaranteed coprime to φ.
pub const FALLBACK_EXPONENT: u64 = 3;

// ═══════════════════════════════════════════════════════════
// RANDOMNESS
// ═══════════════════════════════════════════════════════════

/// Source of uniform index choices for key generation.
///
/// Every [`rand::RngCore`] is a `PickSource`. Tests use [`ScriptedPicks`] to
/// replay an exact sequence.
pub trait PickSource {
    /// Returns an index in `0..len`. Callers never pass `len == 0`.
    fn pick(&mut self, len: usize) -> usize;
}

impl<R: rand::RngCore> PickSource for R {
    fn pick(&mut self, len: usize) -> usize {
        use rand::Rng;
        self.gen_range(0..len)
    }
}

/// Replays a fixed list of indices.
///
/// Each scripted index is reduced modulo `len`. Once the script runs out the
/// source counts upward from the number of picks made so far, so a retry loop
/// always makes progress.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPicks {
    picks: Vec<usize>,
    cursor: usize,
}

impl ScriptedPicks {
    pub fn new(picks: impl Into<Vec<usize>>) -> Self {
        Self {
            picks: picks.into(),
            cursor: 0,
        }
    }

    /// Number of picks consumed so far
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl PickSource for ScriptedPicks {
    fn pick(&mut self, len: usize) -> usize {
        let raw = self.picks.get(self.cursor).copied().unwrap_or(self.cursor);
        self.cursor += 1;
        raw % len
    }
}

// ═══════════════════════════════════════════════════════════
// NUMBER THEORY
// ═══════════════════════════════════════════════════════════

/// Trial division up to √n
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut i = 3;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}

/// All primes in [`PRIME_POOL_MIN`, `PRIME_POOL_MAX`], ascending
pub fn prime_pool() -> Vec<u64> {
    (PRIME_POOL_MIN..=PRIME_POOL_MAX).filter(|&n| is_prime(n)).collect()
}

pub fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

/// Extended Euclid: returns `(g, x, y)` with `a·x + b·y = g = gcd(a, b)`.
pub fn egcd(a: i128, b: i128) -> (i128, i128, i128) {
    if b == 0 {
        return (a, 1, 0);
    }
    let (g, x1, y1) = egcd(b, a.rem_euclid(b));
    (g, y1, x1 - a.div_euclid(b) * y1)
}

/// The unique `x` in `[0, m)` with `a·x ≡ 1 (mod m)`.
///
/// `None` when `gcd(a, m) ≠ 1` or `m == 0`. `a` may be negative or larger
/// than `m`; it is reduced first.
pub fn mod_inv(a: i64, m: u64) -> Option<u64> {
    if m == 0 {
        return None;
    }
    let m = m as i128;
    let (g, x, _) = egcd((a as i128).rem_euclid(m), m);
    if g != 1 {
        return None;
    }
    x.rem_euclid(m).to_u64()
}

/// `base^exp mod modulus` by square-and-multiply.
///
/// Intermediate products are arbitrary precision. A negative base, or one at
/// or above the modulus, is reduced into `[0, modulus)` first. A zero modulus
/// has no residues and yields 0.
pub fn mod_exp(base: impl Into<BigInt>, exp: u64, modulus: u64) -> u64 {
    if modulus == 0 {
        return 0;
    }
    let m = BigInt::from(modulus);
    let mut b = ((base.into() % &m) + &m) % &m;
    let mut result = BigInt::one() % &m;
    let mut e = exp;

    while e > 0 {
        if e & 1 == 1 {
            result = (&result * &b) % &m;
        }
        b = (&b * &b) % &m;
        e >>= 1;
    }

    // result < modulus, so it always fits
    result.to_u64().unwrap_or_default()
}

/// Reject a zero modulus before it reaches [`mod_exp`].
pub fn require_modulus(n: u64) -> Result<u64> {
    if n == 0 {
        Err(Error::InvalidModulus(n))
    } else {
        Ok(n)
    }
}

pub fn rsa_encrypt(m: impl Into<BigInt>, e: u64, n: u64) -> u64 {
    mod_exp(m, e, n)
}

pub fn rsa_decrypt(c: impl Into<BigInt>, d: u64, n: u64) -> u64 {
    mod_exp(c, d, n)
}

// ═══════════════════════════════════════════════════════════
// KEY GENERATION
// ═══════════════════════════════════════════════════════════

/// A toy RSA keypair with every intermediate value exposed for teaching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToyRsaKeypair {
    pub p: u64,
    pub q: u64,
    pub n: u64,
    pub phi: u64,
    pub e: u64,
    /// `None` only when the fallback exponent has no inverse mod φ
    pub d: Option<u64>,
}

impl ToyRsaKeypair {
    pub fn encrypt(&self, m: impl Into<BigInt>) -> u64 {
        rsa_encrypt(m, self.e, self.n)
    }

    pub fn decrypt(&self, c: impl Into<BigInt>) -> Option<u64> {
        self.d.map(|d| rsa_decrypt(c, d, self.n))
    }

    /// Checks the structural invariants: distinct pool primes, `n = p·q`,
    /// `φ = (p−1)(q−1)`, `gcd(e, φ) = 1` and `d·e ≡ 1 (mod φ)`.
    pub fn is_consistent(&self) -> bool {
        let in_pool = |x: u64| (PRIME_POOL_MIN..=PRIME_POOL_MAX).contains(&x) && is_prime(x);

        // The pool checks come first so the arithmetic below never sees φ = 0.
        in_pool(self.p)
            && in_pool(self.q)
            && self.p != self.q
            && self.n == self.p * self.q
            && self.phi == (self.p - 1) * (self.q - 1)
            && gcd(self.e, self.phi) == 1
            && self
                .d
                .is_some_and(|d| (d as u128 * self.e as u128) % self.phi as u128 == 1)
    }
}

/// Candidate exponents below φ and coprime to it, in candidate order
pub fn exponent_candidates(phi: u64) -> Vec<u64> {
    EXPONENT_CANDIDATES
        .iter()
        .copied()
        .filter(|&e| e < phi && gcd(e, phi) == 1)
        .collect()
}

/// Pick a public exponent for φ, falling back to [`FALLBACK_EXPONENT`].
pub fn select_exponent<S: PickSource + ?Sized>(phi: u64, source: &mut S) -> u64 {
    let candidates = exponent_candidates(phi);
    if candidates.is_empty() {
        tracing::warn!(phi, e = FALLBACK_EXPONENT, "no exponent candidate coprime to phi, using fallback");
        return FALLBACK_EXPONENT;
    }
    candidates[source.pick(candidates.len())]
}

/// Build the keypair for a fixed pair of primes. The exponent is still drawn
/// from `source`.
///
/// `p` and `q` are expected to be primes from [`prime_pool`]. Anything below 2
/// or large enough to overflow `p·q` is outside the contract.
pub fn keypair_from_primes<S: PickSource + ?Sized>(p: u64, q: u64, source: &mut S) -> ToyRsaKeypair {
    let n = p * q;
    let phi = (p - 1) * (q - 1);
    let e = select_exponent(phi, source);
    let d = mod_inv(e as i64, phi);

    if d.is_none() {
        tracing::warn!(p, q, phi, e, "public exponent has no inverse mod phi");
    }

    ToyRsaKeypair { p, q, n, phi, e, d }
}

/// Generate a keypair from the given pick source.
pub fn generate_toy_rsa_with<S: PickSource + ?Sized>(source: &mut S) -> ToyRsaKeypair {
    let primes = prime_pool();
    let p = primes[source.pick(primes.len())];
    let mut q = p;
    while q == p {
        q = primes[source.pick(primes.len())];
    }

    let keypair = keypair_from_primes(p, q, source);
    tracing::debug!(p, q, n = keypair.n, e = keypair.e, "generated toy RSA keypair");
    keypair
}

/// Generate a keypair from the thread-local RNG.
pub fn generate_toy_rsa() -> ToyRsaKeypair {
    generate_toy_rsa_with(&mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_prime_pool() {
        let pool = prime_pool();
        assert_eq!(pool.len(), 42);
        assert_eq!(pool.first(), Some(&11));
        assert_eq!(pool.last(), Some(&199));
        assert!(pool.contains(&13));
        assert!(!pool.contains(&121));
        assert!(!pool.contains(&169));
    }

    #[test]
    fn test_is_prime_small() {
        let primes: Vec<u64> = (0..30).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }

    #[test]
    fn test_egcd() {
        let (g, x, y) = egcd(240, 46);
        assert_eq!(g, 2);
        assert_eq!(240 * x + 46 * y, 2);
    }

    #[test]
    fn test_mod_inv() {
        assert_eq!(mod_inv(3, 11), Some(4));
        assert_eq!(mod_inv(17, 3120), Some(2753));
        assert_eq!(mod_inv(-3, 11), Some(7));
        assert_eq!(mod_inv(14, 11), Some(4));
        assert_eq!(mod_inv(1, 1), Some(0));
    }

    #[test]
    fn test_mod_inv_none_when_not_coprime() {
        assert_eq!(mod_inv(6, 9), None);
        assert_eq!(mod_inv(3, 255), None);
        assert_eq!(mod_inv(0, 7), None);
        assert_eq!(mod_inv(5, 0), None);
    }

    #[test]
    fn test_mod_exp() {
        assert_eq!(mod_exp(4, 13, 497), 445);
        assert_eq!(mod_exp(2, 10, 1000), 24);
        assert_eq!(mod_exp(7, 0, 13), 1);
        assert_eq!(mod_exp(7, 0, 1), 0);
        assert_eq!(mod_exp(7, 5, 0), 0);
    }

    #[test]
    fn test_mod_exp_reduces_base() {
        assert_eq!(mod_exp(-1, 3, 10), 9);
        assert_eq!(mod_exp(-7, 1, 5), 3);
        assert_eq!(mod_exp(1_000_003, 2, 1_000), mod_exp(3, 2, 1_000));
    }

    #[test]
    fn test_mod_exp_large_exponent() {
        // 65537 with a modulus near the top of the toy range
        let n = 197 * 199;
        let c = mod_exp(12345, 65537, n);
        assert!(c < n);
        assert_eq!(c, mod_exp(12345 % n, 65537, n));
    }

    #[test]
    fn test_textbook_round_trip() {
        // p = 61, q = 53 is outside the pool but a classic worked example
        let (n, e, d) = (3233, 17, 2753);
        assert_eq!(rsa_encrypt(65, e, n), 2790);
        assert_eq!(rsa_decrypt(2790, d, n), 65);
    }

    #[test]
    fn test_require_modulus() {
        assert!(require_modulus(0).is_err());
        assert_eq!(require_modulus(15).unwrap(), 15);
    }

    #[test]
    fn test_generated_keypairs_are_consistent() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let kp = generate_toy_rsa_with(&mut rng);
            assert!(kp.is_consistent(), "{kp:?}");
            assert_ne!(kp.p, kp.q);
            assert_eq!(kp.n, kp.p * kp.q);
            let d = kp.d.unwrap();
            assert_eq!((d * kp.e) % kp.phi, 1);
        }
    }

    #[test]
    fn test_round_trip_every_message() {
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..3 {
            let kp = generate_toy_rsa_with(&mut rng);
            for m in 0..kp.n {
                let c = kp.encrypt(m);
                assert_eq!(kp.decrypt(c), Some(m), "m={m} {kp:?}");
            }
        }
    }

    #[test]
    fn test_out_of_range_message_reduces() {
        let mut picks = ScriptedPicks::new(vec![0, 1, 0]);
        let kp = generate_toy_rsa_with(&mut picks);
        let m = 42;
        assert_eq!(kp.encrypt(m + kp.n), kp.encrypt(m));
        assert_eq!(kp.encrypt(m as i64 - kp.n as i64), kp.encrypt(m));
    }

    #[test]
    fn test_scripted_picks_select_exact_keypair() {
        // pool[0] = 11, pool[1] = 13, φ = 120 = 2³·3·5
        let mut picks = ScriptedPicks::new(vec![0, 1, 0]);
        let kp = generate_toy_rsa_with(&mut picks);
        assert_eq!((kp.p, kp.q), (11, 13));
        assert_eq!(kp.n, 143);
        assert_eq!(kp.phi, 120);
        assert_eq!(exponent_candidates(120), vec![17]);
        assert_eq!(kp.e, 17);
        assert_eq!(kp.d, Some(113));
        assert_eq!(picks.consumed(), 3);
    }

    #[test]
    fn test_scripted_picks_retry_until_distinct() {
        // 41 is the last pool index (199); repeated p forces q retries
        let mut picks = ScriptedPicks::new(vec![41, 41, 41, 2, 1]);
        let kp = generate_toy_rsa_with(&mut picks);
        assert_eq!(kp.p, 199);
        assert_eq!(kp.q, 17);
        assert_eq!(kp.phi, 198 * 16);
        assert_eq!(exponent_candidates(kp.phi), vec![5, 17, 257]);
        assert_eq!(kp.e, 17);
        assert_eq!(picks.consumed(), 5);
    }

    #[test]
    fn test_exhausted_script_still_progresses() {
        let mut picks = ScriptedPicks::new(vec![0]);
        let kp = generate_toy_rsa_with(&mut picks);
        assert_eq!(kp.p, 11);
        assert_ne!(kp.q, 11);
        assert!(kp.is_consistent());
    }

    #[test]
    fn test_fallback_exponent_without_inverse() {
        // 255 = 3·5·17, and 257 / 65537 are not below it
        assert!(exponent_candidates(255).is_empty());
        let mut picks = ScriptedPicks::default();
        assert_eq!(select_exponent(255, &mut picks), FALLBACK_EXPONENT);
        assert_eq!(picks.consumed(), 0);
        assert_eq!(mod_inv(FALLBACK_EXPONENT as i64, 255), None);
    }

    #[test]
    fn test_candidates_never_empty_for_pool() {
        let pool = prime_pool();
        for &p in &pool {
            for &q in &pool {
                if p != q {
                    assert!(!exponent_candidates((p - 1) * (q - 1)).is_empty());
                }
            }
        }
    }

    #[test]
    fn test_keypair_serializes() {
        let mut picks = ScriptedPicks::new(vec![0, 1, 0]);
        let kp = generate_toy_rsa_with(&mut picks);
        let json = serde_json::to_string(&kp).unwrap();
        assert!(json.contains("\"phi\":120"));
        let back: ToyRsaKeypair = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kp);
    }

    #[test]
    fn test_malformed_keypair_is_inconsistent() {
        let kp: ToyRsaKeypair =
            serde_json::from_str(r#"{"p":4,"q":4,"n":0,"phi":0,"e":3,"d":1}"#).unwrap();
        assert!(!kp.is_consistent());

        let mut kp = keypair_from_primes(11, 13, &mut ScriptedPicks::default());
        assert!(kp.is_consistent());
        kp.d = Some(112);
        assert!(!kp.is_consistent());
        kp.d = None;
        assert!(!kp.is_consistent());
    }
}
