mod call_context;
mod interceptor;
mod interceptor_chain;
mod interceptor_fn;

pub use call_context::{CallContext, CallContextBuilder};
pub use interceptor::Interceptor;
pub use interceptor_chain::{
    Interceptors, InterceptorsBuilder, RequestInterceptor, ResponseInterceptor,
    run_interceptor_chain,
};
pub use interceptor_fn::{InterceptorFn, interceptor_fn};
