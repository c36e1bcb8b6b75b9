//! Naming directory scoped to one sub-context of the broker's naming service.

use std::sync::Arc;

use orbkit::{BindingType, Broker, BrokerError, NamePath, NamingContext, ObjectRef, RemoteInterface};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::error::DirectoryError;
use super::name::Name;
use super::resolver;

/// Bind, resolve, list and unbind under one named sub-context.
///
/// Nothing touches the broker until the first operation; the resolved
/// context is then kept for the lifetime of the directory.
pub struct ServiceDirectory {
    broker: Arc<dyn Broker>,
    path: NamePath,
    context: OnceCell<Arc<dyn NamingContext>>,
}

impl ServiceDirectory {
    /// Creates a directory handle for the stringified `directory_name`.
    ///
    /// # Errors
    /// [`DirectoryError::InvalidDirectoryName`] if the name cannot be parsed.
    pub fn new(broker: Arc<dyn Broker>, directory_name: &str) -> Result<Self, DirectoryError> {
        let path =
            NamePath::parse(directory_name).map_err(|source| DirectoryError::InvalidDirectoryName {
                name: directory_name.to_owned(),
                source,
            })?;
        Ok(Self {
            broker,
            path,
            context: OnceCell::new(),
        })
    }

    pub fn broker(&self) -> &Arc<dyn Broker> {
        &self.broker
    }

    pub fn path(&self) -> &NamePath {
        &self.path
    }

    /// Resolves the directory context, creating it when absent and
    /// `create_if_absent` is set. A creation that loses the race against
    /// another process falls back to resolving the existing context.
    ///
    /// # Errors
    /// [`DirectoryError::DirectoryUnavailable`] if the context is missing and
    /// was not created, [`DirectoryError::BrokerUnavailable`] if the naming
    /// service cannot be reached.
    pub async fn ensure_directory(
        &self,
        create_if_absent: bool,
    ) -> Result<Arc<dyn NamingContext>, DirectoryError> {
        self.context
            .get_or_try_init(|| self.open(create_if_absent))
            .await
            .cloned()
    }

    async fn open(&self, create_if_absent: bool) -> Result<Arc<dyn NamingContext>, DirectoryError> {
        let root = self
            .broker
            .resolve_naming_root()
            .await
            .map_err(|e| self.map_error(e))?;

        match root.resolve_context(&self.path).await {
            Ok(ctx) => return Ok(ctx),
            Err(BrokerError::NotFound { .. }) if create_if_absent => {}
            Err(e) => return Err(self.map_error(e)),
        }

        match root.bind_new_context(&self.path).await {
            Ok(ctx) => {
                info!(directory = %self.path, "created service directory");
                Ok(ctx)
            }
            Err(BrokerError::AlreadyBound(_)) => {
                debug!(directory = %self.path, "directory created concurrently, resolving");
                root.resolve_context(&self.path)
                    .await
                    .map_err(|e| self.map_error(e))
            }
            Err(e) => Err(self.map_error(e)),
        }
    }

    fn map_error(&self, err: BrokerError) -> DirectoryError {
        match err {
            BrokerError::NotFound { .. } => DirectoryError::DirectoryUnavailable(self.path.to_string()),
            e => DirectoryError::from_broker(e, &self.path.to_string()),
        }
    }

    /// Returns up to `limit` names bound in the directory. Sub-contexts are
    /// not services and are left out.
    ///
    /// # Errors
    /// Propagates directory resolution and broker failures.
    pub async fn list(&self, limit: usize) -> Result<Vec<Name>, DirectoryError> {
        let ctx = self.ensure_directory(false).await?;
        let bindings = ctx
            .list(limit)
            .await
            .map_err(|e| DirectoryError::from_broker(e, &self.path.to_string()))?;
        Ok(bindings
            .into_iter()
            .filter(|b| b.binding_type == BindingType::Object)
            .map(|b| Name::from(b.name))
            .collect())
    }

    /// Binds `object` at `name`, replacing any previous binding.
    ///
    /// # Errors
    /// Propagates directory resolution and broker failures.
    pub async fn bind(&self, name: &Name, object: ObjectRef) -> Result<(), DirectoryError> {
        let ctx = self.ensure_directory(false).await?;
        ctx.rebind(&name.to_path(), object)
            .await
            .map_err(|e| DirectoryError::from_broker(e, &name.to_string()))
    }

    /// Removes the binding at `name`.
    ///
    /// # Errors
    /// [`DirectoryError::NameNotFound`] if nothing is bound there.
    pub async fn unbind(&self, name: &Name) -> Result<(), DirectoryError> {
        let ctx = self.ensure_directory(false).await?;
        ctx.unbind(&name.to_path())
            .await
            .map_err(|e| DirectoryError::from_broker(e, &name.to_string()))
    }

    /// Returns the raw reference bound at `name`.
    ///
    /// # Errors
    /// [`DirectoryError::NameNotFound`] if nothing is bound there.
    pub async fn resolve(&self, name: &Name) -> Result<ObjectRef, DirectoryError> {
        let ctx = self.ensure_directory(false).await?;
        ctx.resolve(&name.to_path())
            .await
            .map_err(|e| DirectoryError::from_broker(e, &name.to_string()))
    }

    /// Resolves `name` and narrows it to a live `I`.
    ///
    /// # Errors
    /// Any resolution error, [`DirectoryError::IncompatibleService`] or
    /// [`DirectoryError::ServiceUnreachable`].
    pub async fn get<I: RemoteInterface>(&self, name: &Name) -> Result<I, DirectoryError> {
        let object = self.resolve(name).await?;
        resolver::narrow_live::<I>(Arc::clone(&self.broker), name, object).await
    }
}
