//! Server-side publication of sequence implementations.

use std::fmt;
use std::sync::Arc;

use integer_seq_sdk::IntegerSequenceServant;
use tracing::{debug, info};

use super::directory::ServiceDirectory;
use super::error::DirectoryError;
use super::implementation::{HostedSequence, SequenceImplementation};
use super::name::Name;

/// Selects the directory entries a registrar owns from a previous run.
pub struct StaleFilter(Box<dyn Fn(&Name) -> bool + Send + Sync>);

impl StaleFilter {
    pub fn new(predicate: impl Fn(&Name) -> bool + Send + Sync + 'static) -> Self {
        Self(Box::new(predicate))
    }

    /// Matches names whose kind ends with `suffix`.
    pub fn kind_suffix(suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        Self::new(move |name| name.kind().ends_with(suffix.as_str()))
    }

    /// Matches nothing.
    #[must_use]
    pub fn none() -> Self {
        Self::new(|_| false)
    }

    #[must_use]
    pub fn matches(&self, name: &Name) -> bool {
        (self.0)(name)
    }
}

impl fmt::Debug for StaleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaleFilter(..)")
    }
}

/// Outcome of [`ServiceRegistrar::publish`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Publication {
    /// Stale names removed before binding.
    pub unbound: Vec<Name>,
    /// Names bound, in implementation order.
    pub bound: Vec<Name>,
}

/// Publishes local implementations into a [`ServiceDirectory`].
pub struct ServiceRegistrar<'a> {
    directory: &'a ServiceDirectory,
    list_limit: usize,
}

impl<'a> ServiceRegistrar<'a> {
    pub fn new(directory: &'a ServiceDirectory, list_limit: usize) -> Self {
        Self {
            directory,
            list_limit,
        }
    }

    /// Clears stale bindings, then activates and binds every implementation.
    ///
    /// Stops at the first failing implementation; names bound before it stay
    /// bound. Running it again is safe.
    ///
    /// # Errors
    /// Directory, broker or activation failures.
    pub async fn publish(
        &self,
        implementations: &[Arc<dyn SequenceImplementation>],
        stale: &StaleFilter,
    ) -> Result<Publication, DirectoryError> {
        self.directory.ensure_directory(true).await?;
        let mut publication = Publication::default();

        for name in self.directory.list(self.list_limit).await? {
            if !stale.matches(&name) {
                continue;
            }
            info!(%name, "unbinding stale name");
            match self.directory.unbind(&name).await {
                Ok(()) => publication.unbound.push(name),
                Err(DirectoryError::NameNotFound(_)) => {
                    debug!(%name, "stale name already gone");
                }
                Err(e) => return Err(e),
            }
        }

        let adapter = self
            .directory
            .broker()
            .resolve_object_adapter()
            .await
            .map_err(|e| DirectoryError::from_broker(e, "object adapter"))?;

        for implementation in implementations {
            let name = implementation.directory_name();
            let servant = IntegerSequenceServant::new(Arc::new(HostedSequence::new(Arc::clone(
                implementation,
            ))));
            let object = adapter
                .activate(Arc::new(servant))
                .map_err(|e| DirectoryError::from_broker(e, &name.to_string()))?;
            debug!(%name, %object, "servant activated");
            self.directory.bind(&name, object).await?;
            info!(%name, "implementation bound");
            publication.bound.push(name);
        }
        Ok(publication)
    }
}
