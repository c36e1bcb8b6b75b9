//! Discovery and selection of services by name.

use std::sync::Arc;

use integer_seq_sdk::IntegerSequenceRef;
use tracing::{debug, warn};

use super::directory::ServiceDirectory;
use super::error::DirectoryError;
use super::listing::{ListingEntry, ServiceDescription};
use super::proxy::InvocationProxy;

/// Finds services in a [`ServiceDirectory`].
pub struct DirectoryClient {
    directory: ServiceDirectory,
    list_limit: usize,
}

impl DirectoryClient {
    pub fn new(directory: ServiceDirectory, list_limit: usize) -> Self {
        Self {
            directory,
            list_limit,
        }
    }

    pub fn directory(&self) -> &ServiceDirectory {
        &self.directory
    }

    /// Returns a proxy for the first listed service that matches `pattern`
    /// and is alive. Candidates that cannot be resolved are logged and
    /// skipped.
    ///
    /// # Errors
    /// [`DirectoryError::NoMatchingService`] if no candidate works, or the
    /// error of listing the directory itself.
    pub async fn select(
        &self,
        pattern: &str,
        shorten: bool,
    ) -> Result<InvocationProxy, DirectoryError> {
        let names = self.directory.list(self.list_limit).await?;
        for name in names.into_iter().filter(|n| n.matches(pattern)) {
            match self.directory.get::<IntegerSequenceRef>(&name).await {
                Ok(stub) => {
                    debug!(%name, "service selected");
                    return Ok(InvocationProxy::new(name, Arc::new(stub), shorten));
                }
                Err(e) => warn!(%name, error = %e, "Error accessing service {name}"),
            }
        }
        Err(DirectoryError::NoMatchingService(pattern.to_owned()))
    }

    /// Describes every bound service. Services that cannot be reached are
    /// listed with the reason.
    ///
    /// # Errors
    /// Only failures of listing the directory itself.
    pub async fn list_services(&self) -> Result<Vec<ListingEntry>, DirectoryError> {
        let names = self.directory.list(self.list_limit).await?;
        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let details = match self.directory.get::<IntegerSequenceRef>(&name).await {
                Ok(stub) => ServiceDescription::fetch(&stub)
                    .await
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            entries.push(ListingEntry { name, details });
        }
        Ok(entries)
    }
}
