//! gRPC naming service backed by a [`NamingTree`].

use std::sync::Arc;

use orbkit::{BrokerError, NamingTree};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tonic::{Request, Response, Status};
use uuid::Uuid;

use crate::proto::{
    ContextResponse, Empty, ListRequest, ListResponse, NameRequest, ObjectRefMsg, RebindRequest,
    name_from_msg,
};
use crate::rpc::naming_service_server::{NamingService, NamingServiceServer};
use crate::status::to_status;

pub struct NamingServiceImpl {
    tree: Arc<NamingTree>,
}

impl NamingServiceImpl {
    pub fn new(tree: Arc<NamingTree>) -> Self {
        Self { tree }
    }
}

fn context_id(raw: &str) -> Result<Uuid, Status> {
    Uuid::parse_str(raw)
        .map_err(|_| to_status(&BrokerError::ObjectNotExist(format!("naming context {raw}"))))
}

fn fail(err: &BrokerError) -> Status {
    tracing::debug!(error = %err, "naming request failed");
    to_status(err)
}

#[tonic::async_trait]
impl NamingService for NamingServiceImpl {
    async fn bind_new_context(
        &self,
        request: Request<NameRequest>,
    ) -> Result<Response<ContextResponse>, Status> {
        let req = request.into_inner();
        let ctx = context_id(&req.context_id)?;
        let name = name_from_msg(req.name).map_err(|e| fail(&e))?;
        let id = self
            .tree
            .bind_new_context(ctx, &name)
            .map_err(|e| fail(&e))?;
        tracing::info!(name = %name, context = %id, "context bound");
        Ok(Response::new(ContextResponse {
            context_id: id.to_string(),
        }))
    }

    async fn resolve(&self, request: Request<NameRequest>) -> Result<Response<ObjectRefMsg>, Status> {
        let req = request.into_inner();
        let ctx = context_id(&req.context_id)?;
        let name = name_from_msg(req.name).map_err(|e| fail(&e))?;
        let object = self.tree.resolve(ctx, &name).map_err(|e| fail(&e))?;
        Ok(Response::new(object.into()))
    }

    async fn resolve_context(
        &self,
        request: Request<NameRequest>,
    ) -> Result<Response<ContextResponse>, Status> {
        let req = request.into_inner();
        let ctx = context_id(&req.context_id)?;
        let name = name_from_msg(req.name).map_err(|e| fail(&e))?;
        let id = self
            .tree
            .resolve_context(ctx, &name)
            .map_err(|e| fail(&e))?;
        Ok(Response::new(ContextResponse {
            context_id: id.to_string(),
        }))
    }

    async fn rebind(&self, request: Request<RebindRequest>) -> Result<Response<Empty>, Status> {
        let req = request.into_inner();
        let ctx = context_id(&req.context_id)?;
        let name = name_from_msg(req.name).map_err(|e| fail(&e))?;
        let object = req
            .object
            .ok_or_else(|| fail(&BrokerError::Marshal("rebind without an object".to_owned())))?;
        self.tree
            .rebind(ctx, &name, object.into())
            .map_err(|e| fail(&e))?;
        tracing::info!(name = %name, "object bound");
        Ok(Response::new(Empty {}))
    }

    async fn unbind(&self, request: Request<NameRequest>) -> Result<Response<Empty>, Status> {
        let req = request.into_inner();
        let ctx = context_id(&req.context_id)?;
        let name = name_from_msg(req.name).map_err(|e| fail(&e))?;
        self.tree.unbind(ctx, &name).map_err(|e| fail(&e))?;
        tracing::info!(name = %name, "name unbound");
        Ok(Response::new(Empty {}))
    }

    async fn list(&self, request: Request<ListRequest>) -> Result<Response<ListResponse>, Status> {
        let req = request.into_inner();
        let ctx = context_id(&req.context_id)?;
        let how_many = usize::try_from(req.how_many).unwrap_or(usize::MAX);
        let bindings = self.tree.list(ctx, how_many).map_err(|e| fail(&e))?;
        Ok(Response::new(ListResponse {
            bindings: bindings.into_iter().map(Into::into).collect(),
        }))
    }
}

pub fn make_naming_service(tree: Arc<NamingTree>) -> NamingServiceServer<NamingServiceImpl> {
    NamingServiceServer::new(NamingServiceImpl::new(tree))
}

/// Serves `tree` on `listener` until `cancel` fires.
pub async fn serve_naming(
    listener: TcpListener,
    tree: Arc<NamingTree>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "naming service listening");

    Server::builder()
        .add_service(make_naming_service(tree))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
            cancel.cancelled().await;
        })
        .await?;

    tracing::info!(%addr, "naming service stopped");
    Ok(())
}
