use super::{IDEMPOTENT, SERVICE_NAME, invalid_data};
use bitcode::{Decode, Encode};
use rrpc::{Options, RpcKind, RpcProcedure};
use std::io;

#[derive(Encode, Decode, PartialEq, Debug)]
struct SayRequestParams {
    pub text: String,
}

#[derive(Encode, Decode, PartialEq, Debug)]
struct SayResponseParams {
    pub text: String,
}

/// Replies with the text it was sent.
pub struct Say;

impl RpcProcedure for Say {
    const SERVICE_NAME: &'static str = SERVICE_NAME;
    const PROCEDURE_NAME: &'static str = "say";
    const KIND: RpcKind = RpcKind::RequestResponse;

    type Request = String;
    type Response = String;

    fn encode_request(text: &Self::Request) -> Result<Vec<u8>, io::Error> {
        Ok(bitcode::encode(&SayRequestParams { text: text.clone() }))
    }

    fn decode_request(bytes: &[u8]) -> Result<Self::Request, io::Error> {
        let raw = bitcode::decode::<SayRequestParams>(bytes).map_err(invalid_data)?;

        Ok(raw.text)
    }

    fn encode_response(text: &Self::Response) -> Result<Vec<u8>, io::Error> {
        Ok(bitcode::encode(&SayResponseParams { text: text.clone() }))
    }

    fn decode_response(bytes: &[u8]) -> Result<Self::Response, io::Error> {
        let raw = bitcode::decode::<SayResponseParams>(bytes).map_err(invalid_data)?;

        Ok(raw.text)
    }

    fn options() -> Options {
        Options::builder().set(&IDEMPOTENT, true).build()
    }
}
