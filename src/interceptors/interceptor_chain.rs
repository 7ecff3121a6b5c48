use super::{CallContext, Interceptor};
use crate::data_variant::DataVariant;
use crate::error::RpcError;
use crate::instances::InstanceContainer;
use crate::metadata::{ClientMetadata, RpcMetadata, ServerMetadata};
use crate::options::Options;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

pub type RequestInterceptor = Arc<dyn Interceptor<ClientMetadata>>;
pub type ResponseInterceptor = Arc<dyn Interceptor<ServerMetadata>>;

/// Applies `interceptors` to `context` strictly in order.
///
/// An empty list returns the context untouched. Otherwise stage `n + 1` is
/// only started once stage `n` has resolved, and receives its output.
///
/// The only error this returns is `InterceptorPanicked`; failures that
/// interceptors signal themselves stay inside the returned context's data.
pub async fn run_interceptor_chain<M: RpcMetadata>(
    interceptors: &[Arc<dyn Interceptor<M>>],
    context: CallContext<M>,
) -> Result<CallContext<M>, RpcError> {
    if interceptors.is_empty() {
        return Ok(context);
    }

    let mut context = context;
    for (stage, interceptor) in interceptors.iter().enumerate() {
        tracing::trace!(
            direction = M::DIRECTION,
            stage,
            data = context.data().kind_name(),
            "Running interceptor"
        );

        context = AssertUnwindSafe(interceptor.intercept(context))
            .catch_unwind()
            .await
            .map_err(|_| {
                tracing::error!(
                    direction = M::DIRECTION,
                    stage,
                    "Interceptor panicked; terminating call"
                );
                RpcError::InterceptorPanicked { stage }
            })?;
    }

    Ok(context)
}

/// The ordered request-bound and response-bound interceptor lists.
///
/// Fixed at construction and shared by every call made through a module.
#[derive(Clone)]
pub struct Interceptors {
    request: Arc<[RequestInterceptor]>,
    response: Arc<[ResponseInterceptor]>,
}

impl Interceptors {
    pub fn new(request: Vec<RequestInterceptor>, response: Vec<ResponseInterceptor>) -> Self {
        Self {
            request: request.into(),
            response: response.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn builder() -> InterceptorsBuilder {
        InterceptorsBuilder::default()
    }

    pub fn request(&self) -> &[RequestInterceptor] {
        &self.request
    }

    pub fn response(&self) -> &[ResponseInterceptor] {
        &self.response
    }

    /// Builds the request context and runs the request list over it.
    pub async fn run_request_interceptors(
        &self,
        data: DataVariant,
        metadata: ClientMetadata,
        options: Options,
        instances: InstanceContainer,
    ) -> Result<CallContext<ClientMetadata>, RpcError> {
        let context = CallContext::new(data, metadata, options, instances);
        run_interceptor_chain(&self.request, context).await
    }

    /// Builds the response context and runs the response list over it.
    pub async fn run_response_interceptors(
        &self,
        data: DataVariant,
        metadata: ServerMetadata,
        options: Options,
        instances: InstanceContainer,
    ) -> Result<CallContext<ServerMetadata>, RpcError> {
        let context = CallContext::new(data, metadata, options, instances);
        run_interceptor_chain(&self.response, context).await
    }
}

impl Default for Interceptors {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Default)]
pub struct InterceptorsBuilder {
    request: Vec<RequestInterceptor>,
    response: Vec<ResponseInterceptor>,
}

impl InterceptorsBuilder {
    /// Appends to the request-bound list.
    pub fn request(mut self, interceptor: impl Interceptor<ClientMetadata> + 'static) -> Self {
        self.request.push(Arc::new(interceptor));
        self
    }

    /// Appends to the response-bound list.
    pub fn response(mut self, interceptor: impl Interceptor<ServerMetadata> + 'static) -> Self {
        self.response.push(Arc::new(interceptor));
        self
    }

    pub fn build(self) -> Interceptors {
        Interceptors::new(self.request, self.response)
    }
}
