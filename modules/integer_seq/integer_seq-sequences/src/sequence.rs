//! Adapter from plain arbitrary-precision functions to
//! [`SequenceImplementation`].

use integer_seq::{Name, SequenceImplementation};
use integer_seq_sdk::Response;
use num_bigint::BigUint;
use num_traits::ToPrimitive;

type ComputeFn = Box<dyn Fn(u32) -> anyhow::Result<BigUint> + Send + Sync>;

/// One hosted sequence: metadata plus the function computing its members.
pub struct Sequence {
    name: Name,
    title: &'static str,
    description: &'static str,
    max_index: i32,
    compute: ComputeFn,
}

impl Sequence {
    pub fn new(
        name: Name,
        title: &'static str,
        description: &'static str,
        max_index: i32,
        compute: impl Fn(u32) -> anyhow::Result<BigUint> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            title,
            description,
            max_index,
            compute: Box::new(compute),
        }
    }
}

/// Integers that fit into `i64` are sent as such, anything larger as text.
pub fn to_response(value: &BigUint) -> Response {
    value
        .to_i64()
        .map_or_else(|| Response::Text(value.to_string()), Response::Int)
}

impl SequenceImplementation for Sequence {
    fn name(&self) -> &str {
        self.title
    }

    fn description(&self) -> &str {
        self.description
    }

    fn max_index(&self) -> i32 {
        self.max_index
    }

    fn directory_name(&self) -> Name {
        self.name.clone()
    }

    fn compute(&self, index: i32) -> anyhow::Result<Response> {
        let index = u32::try_from(index)?;
        Ok(to_response(&(self.compute)(index)?))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_response_width() {
        assert_eq!(to_response(&BigUint::from(55u32)), Response::Int(55));
        let max = BigUint::from(u64::try_from(i64::MAX).unwrap());
        assert_eq!(to_response(&max), Response::Int(i64::MAX));
        let over = max + 1u32;
        assert_eq!(to_response(&over), Response::Text("9223372036854775808".to_owned()));
    }
}
