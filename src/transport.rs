use crate::error::{ProtocolViolation, RpcError};
use futures::stream::{self, BoxStream, StreamExt};
use std::io;

/// One frame as exchanged with the transport.
///
/// Either half may be absent; which absences are legal depends on the call
/// shape and on the frame's position in a stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    pub metadata: Option<Vec<u8>>,
    pub data: Option<Vec<u8>>,
}

impl Payload {
    pub fn new(metadata: Vec<u8>, data: Vec<u8>) -> Self {
        Self {
            metadata: Some(metadata),
            data: Some(data),
        }
    }

    pub fn metadata_only(metadata: Vec<u8>) -> Self {
        Self {
            metadata: Some(metadata),
            data: None,
        }
    }

    pub fn data_only(data: Vec<u8>) -> Self {
        Self {
            metadata: None,
            data: Some(data),
        }
    }
}

pub type PayloadStream = BoxStream<'static, Result<Payload, io::Error>>;

/// The five verbs the engine needs from a bidirectional streaming transport.
///
/// Implementations own framing, multiplexing, backpressure and connection
/// lifecycle. Returned streams must be lazy, and dropping one must release
/// the underlying subscription so the remote stops producing frames.
#[async_trait::async_trait]
pub trait RpcTransport: Send + Sync {
    /// Sends one frame and waits for exactly one frame back.
    async fn request_response(&self, payload: Payload) -> Result<Payload, io::Error>;

    /// Sends one frame and receives a stream of frames.
    fn request_stream(&self, payload: Payload) -> PayloadStream;

    /// Sends a stream of frames and receives a stream of frames.
    fn request_channel(&self, payloads: PayloadStream) -> PayloadStream;

    /// Resolves once the transport has accepted the frame.
    async fn fire_and_forget(&self, payload: Payload) -> Result<(), io::Error>;

    /// Sends metadata with no payload. Resolves once accepted.
    async fn metadata_push(&self, metadata: Vec<u8>) -> Result<(), io::Error>;
}

/// Turns the data frames of a response (everything after the metadata frame)
/// into decoded items.
///
/// A frame without a payload, a transport error or a decode failure is
/// yielded once as an `Err` and ends the stream; the remaining frames are
/// dropped, which unsubscribes from the transport.
pub fn decode_data_frames<T, D>(
    frames: PayloadStream,
    decode: D,
) -> BoxStream<'static, Result<T, RpcError>>
where
    T: Send + 'static,
    D: Fn(&[u8]) -> Result<T, RpcError> + Send + 'static,
{
    stream::unfold(Some((frames, decode)), |state| async move {
        let (mut frames, decode) = state?;
        let frame = frames.next().await?;

        let item = frame.map_err(RpcError::Transport).and_then(|frame| match frame.data {
            Some(bytes) => decode(bytes.as_slice()),
            None => {
                tracing::warn!("Data frame arrived without a payload");
                Err(ProtocolViolation::MissingPayload.into())
            }
        });

        let next = if item.is_ok() {
            Some((frames, decode))
        } else {
            None
        };

        Some((item, next))
    })
    .boxed()
}
