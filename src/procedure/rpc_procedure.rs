use super::RpcKind;
use crate::metadata::ClientMetadata;
use crate::options::Options;
use std::io;

/// Couples a procedure's identity with its payload codecs.
///
/// Service definitions implement this once per procedure; both the client
/// helpers and the server registry build on it, so the two sides cannot
/// disagree on names or encodings.
///
/// For `MetadataPush` procedures the request and response types are unused.
pub trait RpcProcedure {
    const SERVICE_NAME: &'static str;

    const PROCEDURE_NAME: &'static str;

    const KIND: RpcKind;

    /// The high-level request type (a single message, or one item of a
    /// request channel).
    type Request: Send + 'static;

    /// The high-level response type (a single message, or one item of a
    /// response stream).
    type Response: Send + 'static;

    fn encode_request(request: &Self::Request) -> Result<Vec<u8>, io::Error>;

    fn decode_request(bytes: &[u8]) -> Result<Self::Request, io::Error>;

    fn encode_response(response: &Self::Response) -> Result<Vec<u8>, io::Error>;

    fn decode_response(bytes: &[u8]) -> Result<Self::Response, io::Error>;

    /// Metadata addressing this procedure, with an empty `extra` map.
    fn client_metadata() -> ClientMetadata {
        ClientMetadata::new(Self::SERVICE_NAME, Self::PROCEDURE_NAME)
    }

    /// Options declared for this procedure in the schema.
    fn options() -> Options {
        Options::empty()
    }
}
