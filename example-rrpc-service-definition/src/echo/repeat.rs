use super::{SERVICE_NAME, invalid_data};
use bitcode::{Decode, Encode};
use rrpc::{RpcKind, RpcProcedure};
use std::io;

#[derive(Encode, Decode, Clone, PartialEq, Debug)]
pub struct RepeatRequest {
    pub text: String,
    pub count: u32,
}

#[derive(Encode, Decode, PartialEq, Debug)]
struct RepeatItem {
    pub index: u32,
    pub text: String,
}

/// Streams `count` copies of the text back, each prefixed with its index.
pub struct Repeat;

impl RpcProcedure for Repeat {
    const SERVICE_NAME: &'static str = SERVICE_NAME;
    const PROCEDURE_NAME: &'static str = "repeat";
    const KIND: RpcKind = RpcKind::RequestStream;

    type Request = RepeatRequest;
    type Response = (u32, String);

    fn encode_request(request: &Self::Request) -> Result<Vec<u8>, io::Error> {
        Ok(bitcode::encode(request))
    }

    fn decode_request(bytes: &[u8]) -> Result<Self::Request, io::Error> {
        bitcode::decode::<RepeatRequest>(bytes).map_err(invalid_data)
    }

    fn encode_response((index, text): &Self::Response) -> Result<Vec<u8>, io::Error> {
        Ok(bitcode::encode(&RepeatItem {
            index: *index,
            text: text.clone(),
        }))
    }

    fn decode_response(bytes: &[u8]) -> Result<Self::Response, io::Error> {
        let raw = bitcode::decode::<RepeatItem>(bytes).map_err(invalid_data)?;

        Ok((raw.index, raw.text))
    }
}
