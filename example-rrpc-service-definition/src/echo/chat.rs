use super::{SERVICE_NAME, invalid_data};
use rrpc::{RpcKind, RpcProcedure};
use std::io;

/// Answers every line sent over the channel with one line back.
pub struct Chat;

impl RpcProcedure for Chat {
    const SERVICE_NAME: &'static str = SERVICE_NAME;
    const PROCEDURE_NAME: &'static str = "chat";
    const KIND: RpcKind = RpcKind::RequestChannel;

    type Request = String;
    type Response = String;

    fn encode_request(line: &Self::Request) -> Result<Vec<u8>, io::Error> {
        Ok(bitcode::encode(line))
    }

    fn decode_request(bytes: &[u8]) -> Result<Self::Request, io::Error> {
        bitcode::decode::<String>(bytes).map_err(invalid_data)
    }

    fn encode_response(line: &Self::Response) -> Result<Vec<u8>, io::Error> {
        Ok(bitcode::encode(line))
    }

    fn decode_response(bytes: &[u8]) -> Result<Self::Response, io::Error> {
        bitcode::decode::<String>(bytes).map_err(invalid_data)
    }
}
