use rrpc::{RpcError, RpcKind};
use std::error::Error;
use std::fmt;
use std::io;

/// Why an incoming call could not be matched to a registered procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    NotFound {
        service: String,
        procedure: String,
    },
    KindMismatch {
        service: String,
        procedure: String,
        expected: RpcKind,
        actual: RpcKind,
    },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::NotFound { service, procedure } => {
                write!(f, "RPC '{}/{}' not found", service, procedure)
            }
            LookupError::KindMismatch {
                service,
                procedure,
                expected,
                actual,
            } => write!(
                f,
                "RPC '{}/{}' is registered as {} but was called as {}",
                service, procedure, actual, expected
            ),
        }
    }
}

impl Error for LookupError {}

#[derive(Debug)]
pub enum RpcServerError {
    /// A procedure with the same service and procedure name is already
    /// registered.
    DuplicateProcedure { service: String, procedure: String },
    Lookup(LookupError),
    Call(RpcError),
}

impl fmt::Display for RpcServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcServerError::DuplicateProcedure { service, procedure } => write!(
                f,
                "a handler for '{}/{}' is already registered",
                service, procedure
            ),
            RpcServerError::Lookup(e) => write!(f, "Lookup error: {}", e),
            RpcServerError::Call(e) => write!(f, "Call error: {}", e),
        }
    }
}

impl Error for RpcServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RpcServerError::Lookup(e) => Some(e),
            RpcServerError::Call(e) => Some(e),
            RpcServerError::DuplicateProcedure { .. } => None,
        }
    }
}

impl From<LookupError> for RpcServerError {
    fn from(e: LookupError) -> Self {
        RpcServerError::Lookup(e)
    }
}

impl From<RpcError> for RpcServerError {
    fn from(e: RpcError) -> Self {
        RpcServerError::Call(e)
    }
}

impl From<RpcServerError> for io::Error {
    fn from(e: RpcServerError) -> Self {
        match e {
            RpcServerError::Call(inner) => inner.into(),
            other => io::Error::other(other),
        }
    }
}
