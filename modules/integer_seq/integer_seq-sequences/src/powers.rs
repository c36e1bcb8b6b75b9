//! Powers of two and three.

use num_bigint::BigUint;
use num_traits::One;

pub const MAX_INDEX: i32 = 1_000_000;

pub const POW2_TITLE: &str = "Powers of 2 (Rust)";
pub const POW2_DESCRIPTION: &str = "\
Powers of two, implemented with the bit shift operation:
    pow2(i) = 1 << i.";

pub const POW3_TITLE: &str = "Powers of 3 (Rust)";
pub const POW3_DESCRIPTION: &str = "\
Powers of three, implemented with the fast exponentiation.";

pub const POW3_NAIVE_TITLE: &str = "Powers of 3, naive (Rust)";
pub const POW3_NAIVE_DESCRIPTION: &str = "\
Powers of three, implemented with the repeated multiplications.";

pub fn pow2(n: u32) -> BigUint {
    BigUint::one() << n
}

/// `3^n` by square-and-multiply.
pub fn pow3(n: u32) -> BigUint {
    let mut result = BigUint::one();
    let mut square = BigUint::from(3u32);
    let mut exponent = n;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result *= &square;
        }
        exponent >>= 1;
        if exponent > 0 {
            square = &square * &square;
        }
    }
    result
}

pub fn pow3_naive(n: u32) -> BigUint {
    (0..n).fold(BigUint::one(), |acc, _| acc * 3u32)
}
