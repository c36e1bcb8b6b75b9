//! Human-readable listings of sequence implementations.

use std::fmt;

use integer_seq_sdk::IntegerSequence;
use orbkit::BrokerError;

use super::implementation::SequenceImplementation;
use super::name::Name;

/// Printed before every listing entry.
pub const DELIMITER: &str = "--------------------------------------------------";

/// Metadata a sequence reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescription {
    pub name: String,
    pub description: String,
    pub max_index: i32,
}

impl ServiceDescription {
    /// Fetches the metadata of a (possibly remote) sequence.
    ///
    /// # Errors
    /// The first failing call.
    pub async fn fetch(sequence: &dyn IntegerSequence) -> Result<Self, BrokerError> {
        Ok(Self {
            name: sequence.name().await?,
            description: sequence.description().await?,
            max_index: sequence.max_index().await?,
        })
    }

    #[must_use]
    pub fn of(implementation: &dyn SequenceImplementation) -> Self {
        Self {
            name: implementation.name().to_owned(),
            description: implementation.description().to_owned(),
            max_index: implementation.max_index(),
        }
    }
}

/// One entry of a listing. Entries that could not be described carry the
/// error message instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: Name,
    pub details: Result<ServiceDescription, String>,
}

impl fmt::Display for ListingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Sequence ID: {}, kind: {}",
            self.name.id(),
            self.name.kind()
        )?;
        match &self.details {
            Ok(d) => write!(
                f,
                "Name: {}\nMaximal supported index: {}\nDescription:\n{}",
                d.name, d.max_index, d.description
            ),
            Err(message) => f.write_str(message),
        }
    }
}
