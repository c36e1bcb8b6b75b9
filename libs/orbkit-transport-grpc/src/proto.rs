//! Wire messages of the naming and object services, plus conversions to the
//! broker types.

use orbkit::{Binding, BindingType, BrokerError, NameComponent, NamePath, ObjectRef};

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NameComponentMsg {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub kind: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ObjectRefMsg {
    #[prost(string, tag = "1")]
    pub endpoint: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub object_key: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub type_id: ::prost::alloc::string::String,
}

/// Addresses a name relative to one naming context.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NameRequest {
    #[prost(string, tag = "1")]
    pub context_id: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub name: ::prost::alloc::vec::Vec<NameComponentMsg>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RebindRequest {
    #[prost(string, tag = "1")]
    pub context_id: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub name: ::prost::alloc::vec::Vec<NameComponentMsg>,
    #[prost(message, optional, tag = "3")]
    pub object: ::core::option::Option<ObjectRefMsg>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContextResponse {
    #[prost(string, tag = "1")]
    pub context_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListRequest {
    #[prost(string, tag = "1")]
    pub context_id: ::prost::alloc::string::String,
    #[prost(uint32, tag = "2")]
    pub how_many: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BindingMsg {
    #[prost(message, optional, tag = "1")]
    pub name: ::core::option::Option<NameComponentMsg>,
    #[prost(bool, tag = "2")]
    pub is_context: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListResponse {
    #[prost(message, repeated, tag = "1")]
    pub bindings: ::prost::alloc::vec::Vec<BindingMsg>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Empty {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeRequest {
    #[prost(string, tag = "1")]
    pub object_key: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub operation: ::prost::alloc::string::String,
    #[prost(bytes = "bytes", tag = "3")]
    pub payload: ::prost::bytes::Bytes,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeResponse {
    #[prost(bytes = "bytes", tag = "1")]
    pub payload: ::prost::bytes::Bytes,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IsARequest {
    #[prost(string, tag = "1")]
    pub object_key: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub type_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ObjectKeyRequest {
    #[prost(string, tag = "1")]
    pub object_key: ::prost::alloc::string::String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct BoolResponse {
    #[prost(bool, tag = "1")]
    pub value: bool,
}

impl From<&NameComponent> for NameComponentMsg {
    fn from(c: &NameComponent) -> Self {
        Self {
            id: c.id.clone(),
            kind: c.kind.clone(),
        }
    }
}

impl From<NameComponentMsg> for NameComponent {
    fn from(m: NameComponentMsg) -> Self {
        Self::new(m.id, m.kind)
    }
}

impl From<ObjectRef> for ObjectRefMsg {
    fn from(o: ObjectRef) -> Self {
        Self {
            endpoint: o.endpoint,
            object_key: o.object_key,
            type_id: o.type_id,
        }
    }
}

impl From<ObjectRefMsg> for ObjectRef {
    fn from(m: ObjectRefMsg) -> Self {
        Self::new(m.endpoint, m.object_key, m.type_id)
    }
}

pub fn name_to_msg(name: &NamePath) -> Vec<NameComponentMsg> {
    name.components().iter().map(NameComponentMsg::from).collect()
}

pub fn name_from_msg(name: Vec<NameComponentMsg>) -> Result<NamePath, BrokerError> {
    NamePath::new(name.into_iter().map(NameComponent::from).collect())
}

impl From<Binding> for BindingMsg {
    fn from(b: Binding) -> Self {
        Self {
            name: Some(NameComponentMsg::from(&b.name)),
            is_context: b.binding_type == BindingType::Context,
        }
    }
}

impl TryFrom<BindingMsg> for Binding {
    type Error = BrokerError;

    fn try_from(m: BindingMsg) -> Result<Self, Self::Error> {
        let name = m
            .name
            .ok_or_else(|| BrokerError::Marshal("binding without a name".to_owned()))?;
        Ok(Self {
            name: name.into(),
            binding_type: if m.is_context {
                BindingType::Context
            } else {
                BindingType::Object
            },
        })
    }
}
