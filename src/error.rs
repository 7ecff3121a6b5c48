use std::error::Error;
use std::fmt;
use std::io;

/// A malformed or contractually impossible frame sequence from the remote peer.
///
/// Always fatal to the call it occurred on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// A call or stream opened with a frame that carried no metadata.
    MissingMetadata,
    /// A data frame arrived without a payload.
    MissingPayload,
    /// A stream completed before its metadata frame arrived.
    EmptyStream,
}

impl fmt::Display for ProtocolViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolViolation::MissingMetadata => {
                write!(f, "opening frame carried no metadata")
            }
            ProtocolViolation::MissingPayload => write!(f, "data frame carried no payload"),
            ProtocolViolation::EmptyStream => {
                write!(f, "stream ended before its metadata frame")
            }
        }
    }
}

/// Represents every terminal outcome of a call other than success.
///
/// The same type travels inside `DataVariant::Error` while interceptors run,
/// and is what the engine finally hands to the caller.
#[derive(Debug)]
pub enum RpcError {
    /// The transport failed to send or receive a frame.
    Transport(io::Error),
    /// A caller-supplied payload encoder or decoder failed.
    Codec(io::Error),
    /// Metadata bytes could not be decoded into an envelope.
    MetadataDecode(bitcode::Error),
    /// The remote peer broke the framing contract.
    Protocol(ProtocolViolation),
    /// An interceptor observed a problem (e.g. an auth rejection) and encoded it
    /// into the context instead of letting the call continue.
    Rejected(Box<dyn Error + Send + Sync>),
    /// An interceptor panicked. This is a defect in the interceptor, not a
    /// retryable failure.
    InterceptorPanicked { stage: usize },
    /// The context's data did not have the shape or type the engine expected
    /// when extracting the final payload.
    UnexpectedData {
        expected: &'static str,
        found: &'static str,
    },
}

impl RpcError {
    /// Shorthand for interceptors signaling a failure.
    pub fn rejected(reason: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        RpcError::Rejected(reason.into())
    }

    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, RpcError::Protocol(_))
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::Transport(e) => write!(f, "Transport error: {}", e),
            RpcError::Codec(e) => write!(f, "Payload codec error: {}", e),
            RpcError::MetadataDecode(e) => write!(f, "Metadata decode error: {}", e),
            RpcError::Protocol(violation) => write!(f, "Protocol violation: {}", violation),
            RpcError::Rejected(reason) => write!(f, "Call rejected by interceptor: {}", reason),
            RpcError::InterceptorPanicked { stage } => {
                write!(f, "Interceptor at stage {} panicked", stage)
            }
            RpcError::UnexpectedData { expected, found } => {
                write!(f, "Expected {} data, found {}", expected, found)
            }
        }
    }
}

impl Error for RpcError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RpcError::Transport(e) | RpcError::Codec(e) => Some(e),
            RpcError::MetadataDecode(e) => Some(e),
            RpcError::Rejected(reason) => Some(reason.as_ref()),
            _ => None,
        }
    }
}

impl From<ProtocolViolation> for RpcError {
    fn from(violation: ProtocolViolation) -> Self {
        RpcError::Protocol(violation)
    }
}

impl From<bitcode::Error> for RpcError {
    fn from(e: bitcode::Error) -> Self {
        RpcError::MetadataDecode(e)
    }
}

/// Transport errors pass through untouched; everything else is wrapped so it
/// can travel over an `io::Error`-typed transport.
impl From<RpcError> for io::Error {
    fn from(e: RpcError) -> Self {
        match e {
            RpcError::Transport(inner) => inner,
            other => io::Error::other(other),
        }
    }
}
