//! Generates the naming and object gRPC services.
//!
//! Messages are declared by hand with `prost` derives in `src/proto.rs`, so
//! only the service glue is generated and no `protoc` is required.

use tonic_build::manual::{Builder, Method, Service};

const CODEC: &str = "tonic_prost::ProstCodec";

fn method(name: &str, route: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("crate::proto::{input}"))
        .output_type(format!("crate::proto::{output}"))
        .codec_path(CODEC)
        .build()
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let naming = Service::builder()
        .name("NamingService")
        .package("orbkit.naming.v1")
        .method(method(
            "bind_new_context",
            "BindNewContext",
            "NameRequest",
            "ContextResponse",
        ))
        .method(method("resolve", "Resolve", "NameRequest", "ObjectRefMsg"))
        .method(method(
            "resolve_context",
            "ResolveContext",
            "NameRequest",
            "ContextResponse",
        ))
        .method(method("rebind", "Rebind", "RebindRequest", "Empty"))
        .method(method("unbind", "Unbind", "NameRequest", "Empty"))
        .method(method("list", "List", "ListRequest", "ListResponse"))
        .build();

    let object = Service::builder()
        .name("ObjectService")
        .package("orbkit.object.v1")
        .method(method("invoke", "Invoke", "InvokeRequest", "InvokeResponse"))
        .method(method("is_a", "IsA", "IsARequest", "BoolResponse"))
        .method(method(
            "non_existent",
            "NonExistent",
            "ObjectKeyRequest",
            "BoolResponse",
        ))
        .build();

    Builder::new().compile(&[naming, object]);
}
