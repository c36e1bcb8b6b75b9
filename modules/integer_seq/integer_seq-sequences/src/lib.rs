//! Integer sequences hosted by `seq-server`.
//!
//! Every sequence is published under `<id>.<tag>`, or `<id>.naive-<tag>`
//! for the straightforward variant of an algorithm.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod factorial;
pub mod fibonacci;
pub mod powers;
pub mod primes;
pub mod random_prime;
pub mod sequence;

use std::sync::Arc;

use integer_seq::{Name, SequenceImplementation};
use num_bigint::BigUint;

pub use sequence::{Sequence, to_response};

/// All sequences, named with the implementation `tag`.
pub fn catalog(tag: &str) -> Vec<Arc<dyn SequenceImplementation>> {
    let naive = format!("naive-{tag}");
    let primes = primes::Primes::new();

    let sequences = vec![
        Sequence::new(
            Name::new("fib", tag),
            fibonacci::TITLE,
            fibonacci::DESCRIPTION,
            fibonacci::MAX_INDEX,
            |i| Ok(fibonacci::fibonacci(i)),
        ),
        Sequence::new(
            Name::new("fib", naive.as_str()),
            fibonacci::NAIVE_TITLE,
            fibonacci::NAIVE_DESCRIPTION,
            fibonacci::MAX_INDEX,
            |i| Ok(fibonacci::fibonacci_naive(i)),
        ),
        Sequence::new(
            Name::new("rnd-prime", tag),
            random_prime::TITLE,
            random_prime::DESCRIPTION,
            random_prime::MAX_INDEX,
            random_prime::random_prime,
        ),
        Sequence::new(
            Name::new("primes", tag),
            primes::TITLE,
            primes::DESCRIPTION,
            primes::MAX_INDEX,
            move |i| Ok(BigUint::from(primes.nth(i))),
        ),
        Sequence::new(
            Name::new("pow2", tag),
            powers::POW2_TITLE,
            powers::POW2_DESCRIPTION,
            powers::MAX_INDEX,
            |i| Ok(powers::pow2(i)),
        ),
        Sequence::new(
            Name::new("pow3", tag),
            powers::POW3_TITLE,
            powers::POW3_DESCRIPTION,
            powers::MAX_INDEX,
            |i| Ok(powers::pow3(i)),
        ),
        Sequence::new(
            Name::new("pow3", naive.as_str()),
            powers::POW3_NAIVE_TITLE,
            powers::POW3_NAIVE_DESCRIPTION,
            powers::MAX_INDEX,
            |i| Ok(powers::pow3_naive(i)),
        ),
        Sequence::new(
            Name::new("fac", tag),
            factorial::TITLE,
            factorial::DESCRIPTION,
            factorial::MAX_INDEX,
            |i| Ok(factorial::factorial(i)),
        ),
        Sequence::new(
            Name::new("fac", naive.as_str()),
            factorial::NAIVE_TITLE,
            factorial::NAIVE_DESCRIPTION,
            factorial::MAX_INDEX,
            |i| Ok(factorial::factorial_naive(i)),
        ),
    ];

    sequences
        .into_iter()
        .map(|s| Arc::new(s) as Arc<dyn SequenceImplementation>)
        .collect()
}
