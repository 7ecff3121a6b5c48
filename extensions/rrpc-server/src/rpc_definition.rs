use crate::RequestContext;
use futures::future::BoxFuture;
use rrpc::{DataVariant, DynMessage, Options, RpcError, RpcKind, RpcProcedure};
use std::any::type_name;
use std::fmt;
use std::sync::Arc;

/// Invokes a registered handler with the request data left by the server's
/// request interceptors, yielding the data for the response interceptors.
///
/// Unary shapes receive `Single`, channels receive `Stream` and metadata
/// pushes receive `Empty`. Handler failures come back as `DataVariant::Error`.
pub type RpcInvoker =
    Arc<dyn Fn(RequestContext, DataVariant) -> BoxFuture<'static, DataVariant> + Send + Sync>;

pub type DecodeFn = fn(&[u8]) -> Result<DynMessage, RpcError>;

pub type EncodeFn = fn(DynMessage) -> Result<Vec<u8>, RpcError>;

/// One registered procedure: its shape, declared options, type-erased
/// request decoder and response encoder, and handler.
#[derive(Clone)]
pub struct RpcDefinition {
    kind: RpcKind,
    options: Options,
    decode: DecodeFn,
    encode: EncodeFn,
    invoker: RpcInvoker,
}

impl RpcDefinition {
    /// Builds a definition whose codecs are those of `P`.
    pub fn for_procedure<P>(kind: RpcKind, invoker: RpcInvoker) -> Self
    where
        P: RpcProcedure + 'static,
    {
        Self {
            kind,
            options: P::options(),
            decode: decode_request::<P>,
            encode: encode_response::<P>,
            invoker,
        }
    }

    pub fn kind(&self) -> RpcKind {
        self.kind
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<DynMessage, RpcError> {
        (self.decode)(bytes)
    }

    pub fn encode(&self, message: DynMessage) -> Result<Vec<u8>, RpcError> {
        (self.encode)(message)
    }

    pub fn invoke(
        &self,
        context: RequestContext,
        data: DataVariant,
    ) -> BoxFuture<'static, DataVariant> {
        (self.invoker)(context, data)
    }
}

impl fmt::Debug for RpcDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcDefinition")
            .field("kind", &self.kind)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn decode_request<P: RpcProcedure>(bytes: &[u8]) -> Result<DynMessage, RpcError> {
    P::decode_request(bytes)
        .map(|request| Box::new(request) as DynMessage)
        .map_err(RpcError::Codec)
}

fn encode_response<P: RpcProcedure>(message: DynMessage) -> Result<Vec<u8>, RpcError> {
    let response = message
        .downcast::<P::Response>()
        .map_err(|_| RpcError::UnexpectedData {
            expected: type_name::<P::Response>(),
            found: "response of another type",
        })?;

    P::encode_response(&response).map_err(RpcError::Codec)
}
