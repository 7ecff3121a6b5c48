use super::CallContext;
use crate::metadata::RpcMetadata;

/// A transform applied to a call context in one direction.
///
/// The signature has no error channel. An interceptor that needs to fail the
/// call returns a context whose data is `DataVariant::Error`, and every later
/// interceptor decides whether to propagate or recover from it.
/// Panicking is a contract violation and ends the call with
/// `RpcError::InterceptorPanicked`.
#[async_trait::async_trait]
pub trait Interceptor<M: RpcMetadata>: Send + Sync {
    async fn intercept(&self, context: CallContext<M>) -> CallContext<M>;
}
