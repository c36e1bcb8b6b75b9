//! Probable primes of a requested bit length.
//!
//! Each call reseeds the generator, so the answer depends only on the bit
//! length.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

pub const MAX_INDEX: i32 = 5000;

pub const TITLE: &str = "Random primes (Rust)";
pub const DESCRIPTION: &str = "\
Returns probably prime number with the given bit length.
The generator is reseeded on every request, so identical requests get identical answers.";

const SMALL_PRIMES: [u32; 24] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
];
const WITNESSES: [u32; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// A probable prime with exactly `bits` bits, drawn from a generator seeded
/// with zero.
///
/// # Errors
/// If `bits < 2`.
pub fn random_prime(bits: u32) -> anyhow::Result<BigUint> {
    anyhow::ensure!(bits >= 2, "bitLength < 2");
    let mut rng = StdRng::seed_from_u64(0);
    loop {
        let mut candidate = random_bits(&mut rng, bits);
        if bits > 2 {
            candidate.set_bit(0, true);
        }
        // Walk odd numbers upwards while the bit length holds.
        while candidate.bits() == u64::from(bits) {
            if is_probable_prime(&candidate) {
                return Ok(candidate);
            }
            candidate += 2u32;
        }
    }
}

/// Uniform `bits`-bit integer with the top bit set.
fn random_bits(rng: &mut StdRng, bits: u32) -> BigUint {
    let mut bytes = vec![0u8; bits.div_ceil(8) as usize];
    rng.fill_bytes(&mut bytes);
    let mut value = BigUint::from_bytes_le(&bytes);
    let excess = u64::from(bits.div_ceil(8) * 8 - bits);
    for bit in 0..excess {
        value.set_bit(u64::from(bits) + bit, false);
    }
    value.set_bit(u64::from(bits) - 1, true);
    value
}

/// Trial division by small primes, then Miller-Rabin with fixed witnesses.
pub fn is_probable_prime(n: &BigUint) -> bool {
    if *n < BigUint::from(2u32) {
        return false;
    }
    for p in SMALL_PRIMES {
        if *n == BigUint::from(p) {
            return true;
        }
        if (n % p).is_zero() {
            return false;
        }
    }

    let one = BigUint::one();
    let n_minus_one = n - &one;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    'witness: for a in WITNESSES {
        let mut x = BigUint::from(a).modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&BigUint::from(2u32), n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    n.is_odd()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_primality() {
        let primes: Vec<u32> = (0..200u32)
            .filter(|&n| is_probable_prime(&BigUint::from(n)))
            .collect();
        assert_eq!(&primes[..10], &[2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert_eq!(primes.len(), 46);
        assert!(is_probable_prime(&BigUint::from(104_729u32)));
        // Carmichael number
        assert!(!is_probable_prime(&BigUint::from(561u32)));
        assert!(is_probable_prime(&BigUint::from(2_305_843_009_213_693_951u64)));
    }

    #[test]
    fn test_bit_length_and_determinism() {
        for bits in [2u32, 3, 8, 17, 64, 130] {
            let p = random_prime(bits).unwrap();
            assert_eq!(p.bits(), u64::from(bits));
            assert!(is_probable_prime(&p));
            assert_eq!(random_prime(bits).unwrap(), p);
        }
    }

    #[test]
    fn test_too_short_is_rejected() {
        assert!(random_prime(0).is_err());
        assert_eq!(random_prime(1).unwrap_err().to_string(), "bitLength < 2");
    }
}
