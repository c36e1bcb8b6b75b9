//! Fibonacci numbers: fast doubling and a naive iterative variant.

use num_bigint::BigUint;
use num_traits::{One, Zero};

pub const MAX_INDEX: i32 = 5_000_000;

pub const TITLE: &str = "Fibonacci numbers (Rust)";
pub const DESCRIPTION: &str = "\
Fibonacci numbers, defined by equalities
    fib(i) = fib(i-1) + fib(i-2), fib(0) = 0, fib(1) = 1.
This implementation in Rust uses the fast doubling identities
    fib(2k) = fib(k) * (2 fib(k+1) - fib(k)), fib(2k+1) = fib(k)^2 + fib(k+1)^2.

See http://en.wikipedia.org/wiki/Fibonacci_number, http://oeis.org/A000045";

pub const NAIVE_TITLE: &str = "Fibonacci numbers, naive (Rust)";
pub const NAIVE_DESCRIPTION: &str = "\
Fibonacci numbers, defined by equalities
    fib(i) = fib(i-1) + fib(i-2), fib(0) = 0, fib(1) = 1.
This implementation in Rust uses the definition for calculations, which is rather ineffective.

See http://en.wikipedia.org/wiki/Fibonacci_number, http://oeis.org/A000045";

/// `fib(n)` by fast doubling, walking the bits of `n` from the top.
pub fn fibonacci(n: u32) -> BigUint {
    // (a, b) = (fib(k), fib(k + 1))
    let mut a = BigUint::zero();
    let mut b = BigUint::one();
    for bit in (0..u32::BITS - n.leading_zeros()).rev() {
        let doubled = &a * ((&b << 1usize) - &a);
        let next = &a * &a + &b * &b;
        if (n >> bit) & 1 == 0 {
            a = doubled;
            b = next;
        } else {
            b = &doubled + &next;
            a = next;
        }
    }
    a
}

/// `fib(n)` by repeated addition.
pub fn fibonacci_naive(n: u32) -> BigUint {
    let mut a = BigUint::zero();
    let mut b = BigUint::one();
    for _ in 0..n {
        let t = &a + &b;
        a = std::mem::replace(&mut b, t);
    }
    a
}
