//! gRPC object service: routes calls to the servants of one endpoint.

use std::sync::Arc;

use orbkit::ServantRegistry;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

use crate::proto::{BoolResponse, InvokeRequest, InvokeResponse, IsARequest, ObjectKeyRequest};
use crate::rpc::object_service_server::{ObjectService, ObjectServiceServer};
use crate::status::to_status;

pub struct ObjectServiceImpl {
    registry: Arc<ServantRegistry>,
}

impl ObjectServiceImpl {
    pub fn new(registry: Arc<ServantRegistry>) -> Self {
        Self { registry }
    }
}

#[tonic::async_trait]
impl ObjectService for ObjectServiceImpl {
    async fn invoke(
        &self,
        request: Request<InvokeRequest>,
    ) -> Result<Response<InvokeResponse>, Status> {
        let req = request.into_inner();
        let payload = self
            .registry
            .dispatch(&req.object_key, &req.operation, req.payload)
            .await
            .map_err(|e| to_status(&e))?;
        Ok(Response::new(InvokeResponse { payload }))
    }

    async fn is_a(&self, request: Request<IsARequest>) -> Result<Response<BoolResponse>, Status> {
        let req = request.into_inner();
        let value = self
            .registry
            .is_a(&req.object_key, &req.type_id)
            .map_err(|e| to_status(&e))?;
        Ok(Response::new(BoolResponse { value }))
    }

    async fn non_existent(
        &self,
        request: Request<ObjectKeyRequest>,
    ) -> Result<Response<BoolResponse>, Status> {
        let value = self.registry.non_existent(&request.into_inner().object_key);
        Ok(Response::new(BoolResponse { value }))
    }
}

/// Serves the servants of `registry` on `listener` until `cancel` fires.
pub async fn serve_objects(
    listener: TcpListener,
    registry: Arc<ServantRegistry>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let endpoint = registry.endpoint().to_owned();
    tracing::info!(%endpoint, "object adapter listening");

    Server::builder()
        .add_service(ObjectServiceServer::new(ObjectServiceImpl::new(registry)))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
            cancel.cancelled().await;
        })
        .await?;

    tracing::info!(%endpoint, "object adapter stopped");
    Ok(())
}
