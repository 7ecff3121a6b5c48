use super::{CallContext, Interceptor};
use crate::metadata::RpcMetadata;
use std::future::Future;

/// Adapts an async closure into an `Interceptor`.
///
/// ```rust
/// use rrpc::{CallContext, ClientMetadata, RpcMetadata, interceptor_fn};
///
/// let tag_trace = interceptor_fn(|context: CallContext<ClientMetadata>| async move {
///     let metadata = context.metadata().with_extra_entry("trace", b"abc".to_vec());
///     context.modify(|builder| builder.set_metadata(metadata))
/// });
/// # let _ = tag_trace;
/// ```
pub struct InterceptorFn<F> {
    f: F,
}

pub fn interceptor_fn<F>(f: F) -> InterceptorFn<F> {
    InterceptorFn { f }
}

#[async_trait::async_trait]
impl<M, F, Fut> Interceptor<M> for InterceptorFn<F>
where
    M: RpcMetadata,
    F: Fn(CallContext<M>) -> Fut + Send + Sync,
    Fut: Future<Output = CallContext<M>> + Send,
{
    async fn intercept(&self, context: CallContext<M>) -> CallContext<M> {
        (self.f)(context).await
    }
}
