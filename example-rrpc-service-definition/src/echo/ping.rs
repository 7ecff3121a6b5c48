use super::SERVICE_NAME;
use rrpc::{RpcKind, RpcProcedure};
use std::io;

/// A metadata-only notification; its `extra` entries are the message.
pub struct Ping;

impl RpcProcedure for Ping {
    const SERVICE_NAME: &'static str = SERVICE_NAME;
    const PROCEDURE_NAME: &'static str = "ping";
    const KIND: RpcKind = RpcKind::MetadataPush;

    type Request = ();
    type Response = ();

    fn encode_request(_: &Self::Request) -> Result<Vec<u8>, io::Error> {
        Ok(Vec::new())
    }

    fn decode_request(_: &[u8]) -> Result<Self::Request, io::Error> {
        Ok(())
    }

    fn encode_response(_: &Self::Response) -> Result<Vec<u8>, io::Error> {
        Ok(Vec::new())
    }

    fn decode_response(_: &[u8]) -> Result<Self::Response, io::Error> {
        Ok(())
    }
}
