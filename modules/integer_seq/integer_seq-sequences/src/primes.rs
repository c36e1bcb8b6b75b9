//! The n-th prime, zero-based, from a sieve that is kept and grown on demand.

use parking_lot::Mutex;
use tracing::debug;

pub const MAX_INDEX: i32 = 500_000;

pub const TITLE: &str = "Primes (Rust)";
pub const DESCRIPTION: &str = "Prime numbers implemented using the sieve of Eratosthenes.";

const MIN_LIMIT: u64 = 64;

/// Zero-based sequence of primes backed by a growing sieve.
#[derive(Debug, Default)]
pub struct Primes {
    known: Mutex<Vec<u64>>,
}

impl Primes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The `index`-th prime, `nth(0) == 2`.
    pub fn nth(&self, index: u32) -> u64 {
        let index = index as usize;
        let mut known = self.known.lock();
        if known.len() <= index {
            let mut limit = estimate_upper_bound(index as u64).max(MIN_LIMIT);
            loop {
                *known = sieve(limit);
                if known.len() > index {
                    break;
                }
                limit *= 2;
            }
            debug!(limit, count = known.len(), "prime sieve extended");
        }
        known[index]
    }
}

/// Smallest `x` with `x / ln x >= index`, found by bisection.
fn estimate_upper_bound(index: u64) -> u64 {
    let f = |x: u64| {
        #[allow(clippy::cast_precision_loss)]
        let x = x as f64;
        x / x.ln()
    };
    #[allow(clippy::cast_precision_loss)]
    let target = index as f64;
    let (mut lo, mut hi) = (2u64, index.saturating_mul(index).max(3));
    while lo + 1 < hi {
        let mid = lo + (hi - lo) / 2;
        if f(mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    hi
}

/// All primes `<= limit`.
fn sieve(limit: u64) -> Vec<u64> {
    let Ok(size) = usize::try_from(limit + 1) else {
        return Vec::new();
    };
    let mut composite = vec![false; size];
    let mut primes = Vec::new();
    for n in 2..size {
        if composite[n] {
            continue;
        }
        primes.push(n as u64);
        let mut multiple = n.saturating_mul(n);
        while multiple < size {
            composite[multiple] = true;
            multiple += n;
        }
    }
    primes
}
