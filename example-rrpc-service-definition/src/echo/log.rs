use super::{SERVICE_NAME, invalid_data};
use rrpc::{RpcKind, RpcProcedure};
use std::io;

/// Records a line on the server. Nothing is sent back.
pub struct Log;

impl RpcProcedure for Log {
    const SERVICE_NAME: &'static str = SERVICE_NAME;
    const PROCEDURE_NAME: &'static str = "log";
    const KIND: RpcKind = RpcKind::FireAndForget;

    type Request = String;
    type Response = ();

    fn encode_request(line: &Self::Request) -> Result<Vec<u8>, io::Error> {
        Ok(bitcode::encode(line))
    }

    fn decode_request(bytes: &[u8]) -> Result<Self::Request, io::Error> {
        bitcode::decode::<String>(bytes).map_err(invalid_data)
    }

    fn encode_response(_: &Self::Response) -> Result<Vec<u8>, io::Error> {
        Ok(Vec::new())
    }

    fn decode_response(_: &[u8]) -> Result<Self::Response, io::Error> {
        Ok(())
    }
}
