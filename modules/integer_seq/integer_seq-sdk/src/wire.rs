//! Payload encoding of the integer sequence operations.

use bytes::Bytes;
use orbkit::BrokerError;
use prost::Message;

use crate::api::Response;

pub const OP_NAME: &str = "_get_name";
pub const OP_DESCRIPTION: &str = "_get_description";
pub const OP_MAX_INDEX: &str = "_get_max_index";
pub const OP_VALUE_AT: &str = "value_at";
pub const OP_VALUES_AT: &str = "values_at";

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Unit {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringValue {
    #[prost(string, tag = "1")]
    pub value: ::prost::alloc::string::String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Int32Value {
    #[prost(int32, tag = "1")]
    pub value: i32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct ValueAtRequest {
    #[prost(int32, tag = "1")]
    pub index: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValuesAtRequest {
    #[prost(int32, repeated, tag = "1")]
    pub indices: ::prost::alloc::vec::Vec<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResponseMsg {
    #[prost(oneof = "response_msg::Value", tags = "1, 2, 3")]
    pub value: ::core::option::Option<response_msg::Value>,
}

pub mod response_msg {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(int64, tag = "1")]
        IntVal(i64),
        #[prost(string, tag = "2")]
        StringVal(::prost::alloc::string::String),
        #[prost(string, tag = "3")]
        Message(::prost::alloc::string::String),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResponseList {
    #[prost(message, repeated, tag = "1")]
    pub responses: ::prost::alloc::vec::Vec<ResponseMsg>,
}

impl From<Response> for ResponseMsg {
    fn from(r: Response) -> Self {
        let value = match r {
            Response::Int(v) => response_msg::Value::IntVal(v),
            Response::Text(s) => response_msg::Value::StringVal(s),
            Response::Error(m) => response_msg::Value::Message(m),
        };
        Self { value: Some(value) }
    }
}

impl TryFrom<ResponseMsg> for Response {
    type Error = BrokerError;

    fn try_from(m: ResponseMsg) -> Result<Self, BrokerError> {
        match m.value {
            Some(response_msg::Value::IntVal(v)) => Ok(Self::Int(v)),
            Some(response_msg::Value::StringVal(s)) => Ok(Self::Text(s)),
            Some(response_msg::Value::Message(m)) => Ok(Self::Error(m)),
            None => Err(BrokerError::Marshal("response without a value".to_owned())),
        }
    }
}

pub fn encode<M: Message>(msg: &M) -> Bytes {
    Bytes::from(msg.encode_to_vec())
}

pub fn decode<M: Message + Default>(payload: Bytes) -> Result<M, BrokerError> {
    M::decode(payload).map_err(|e| BrokerError::Marshal(e.to_string()))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_empty_response_is_a_marshal_error() {
        let err = Response::try_from(ResponseMsg { value: None }).unwrap_err();
        assert!(matches!(err, BrokerError::Marshal(_)));
    }

    #[test]
    fn test_response_list_keeps_order() {
        let list = ResponseList {
            responses: vec![
                Response::Text("354224848179261915075".to_owned()).into(),
                Response::error("Index is too big").into(),
                Response::Int(55).into(),
            ],
        };
        let decoded: ResponseList = decode(encode(&list)).unwrap();
        let responses: Vec<Response> = decoded
            .responses
            .into_iter()
            .map(Response::try_from)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            responses,
            vec![
                Response::Text("354224848179261915075".to_owned()),
                Response::error("Index is too big"),
                Response::Int(55),
            ]
        );
    }

    #[test]
    fn test_garbage_payload_is_a_marshal_error() {
        let err = decode::<ValuesAtRequest>(Bytes::from_static(&[0xff, 0xff, 0xff])).unwrap_err();
        assert!(matches!(err, BrokerError::Marshal(_)));
    }
}
