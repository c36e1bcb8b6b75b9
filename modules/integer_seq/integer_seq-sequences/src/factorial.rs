//! Factorials by recursive splitting, plus the naive product.

use num_bigint::BigUint;
use num_traits::One;

pub const MAX_INDEX: i32 = 100_000;

pub const TITLE: &str = "Factorials (Rust)";
pub const DESCRIPTION: &str = "\
Factorials
    n! = 1 * 2 * ... * n;  0! = 1.
This implementation in Rust uses recursive splitting technique.";

pub const NAIVE_TITLE: &str = "Factorials, naive (Rust)";
pub const NAIVE_DESCRIPTION: &str = "\
Factorials
    n! = 1 * 2 * ... * n;  0! = 1.
This implementation in Rust uses multiplication and is rather slow for big n.";

/// `n` if odd, else `n - 1`.
fn nearest_odd(n: u32) -> u32 {
    n - (n + 1) % 2
}

/// `low * (low + 2) * ... * high` for odd bounds; empty products are 1.
fn odds_product(low: u32, high: u32) -> BigUint {
    if high < low {
        return BigUint::one();
    }
    if high == low {
        return BigUint::from(low);
    }
    if high == low + 2 {
        return BigUint::from(u64::from(low) * u64::from(high));
    }
    let mid = nearest_odd(low + (high - low) / 2);
    odds_product(low, mid) * odds_product(mid + 2, high)
}

/// `n!` as a product of odd parts of `n / 2^k` times a power of two.
pub fn factorial(n: u32) -> BigUint {
    if n < 2 {
        return BigUint::one();
    }
    let mut bounds = vec![n];
    let mut m = n;
    while m > 1 {
        m >>= 1;
        bounds.push(m);
    }
    bounds.reverse();

    let mut shift = 0u64;
    let mut product = BigUint::one();
    let mut odd_product = BigUint::one();
    for pair in bounds.windows(2) {
        odd_product *= odds_product(nearest_odd(pair[0]) + 2, nearest_odd(pair[1]));
        product *= &odd_product;
        shift += u64::from(pair[0]);
    }
    product << shift
}

pub fn factorial_naive(n: u32) -> BigUint {
    (2..=n).fold(BigUint::one(), |acc, i| acc * i)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_small_values() {
        for f in [factorial, factorial_naive] {
            assert_eq!(f(0), BigUint::one());
            assert_eq!(f(1), BigUint::one());
            assert_eq!(f(4), BigUint::from(24u32));
            assert_eq!(f(20).to_string(), "2432902008176640000");
            assert_eq!(f(25).to_string(), "15511210043330985984000000");
        }
    }

    #[test]
    fn test_splitting_agrees_with_definition() {
        for n in 0..400 {
            assert_eq!(factorial(n), factorial_naive(n), "{n}!");
        }
    }
}
