use crate::RpcClientEngine;
use futures::stream::{BoxStream, Stream};
use rrpc::{Options, RpcError, RpcProcedure};

/// Typed entry points for every procedure, so callers can write
/// `Say::call(&engine, request)` without touching codecs or metadata.
///
/// Per-call `options` are layered over the procedure's declared options.
/// Which method is meaningful depends on `RpcProcedure::KIND`; the engine does
/// not check that the shape matches.
#[async_trait::async_trait]
pub trait RpcProcedureCall: RpcProcedure + Sized + Send + Sync {
    async fn call(
        engine: &RpcClientEngine,
        request: Self::Request,
    ) -> Result<Self::Response, RpcError>;

    async fn call_with_options(
        engine: &RpcClientEngine,
        request: Self::Request,
        options: Options,
    ) -> Result<Self::Response, RpcError>;

    fn call_stream(
        engine: &RpcClientEngine,
        request: Self::Request,
        options: Options,
    ) -> BoxStream<'static, Result<Self::Response, RpcError>>;

    fn call_channel<S>(
        engine: &RpcClientEngine,
        requests: S,
        options: Options,
    ) -> BoxStream<'static, Result<Self::Response, RpcError>>
    where
        S: Stream<Item = Result<Self::Request, RpcError>> + Send + 'static;

    async fn fire_and_forget(
        engine: &RpcClientEngine,
        request: Self::Request,
        options: Options,
    ) -> Result<(), RpcError>;

    async fn metadata_push(engine: &RpcClientEngine, options: Options) -> Result<(), RpcError>;
}

#[async_trait::async_trait]
impl<P> RpcProcedureCall for P
where
    P: RpcProcedure + Send + Sync + 'static,
{
    async fn call(
        engine: &RpcClientEngine,
        request: Self::Request,
    ) -> Result<Self::Response, RpcError> {
        Self::call_with_options(engine, request, Options::empty()).await
    }

    async fn call_with_options(
        engine: &RpcClientEngine,
        request: Self::Request,
        options: Options,
    ) -> Result<Self::Response, RpcError> {
        engine
            .request_response(
                P::client_metadata(),
                request,
                P::decode_response,
                P::encode_request,
                P::options().merge(&options),
            )
            .await
    }

    fn call_stream(
        engine: &RpcClientEngine,
        request: Self::Request,
        options: Options,
    ) -> BoxStream<'static, Result<Self::Response, RpcError>> {
        engine.request_stream(
            P::client_metadata(),
            request,
            P::decode_response,
            P::encode_request,
            P::options().merge(&options),
        )
    }

    fn call_channel<S>(
        engine: &RpcClientEngine,
        requests: S,
        options: Options,
    ) -> BoxStream<'static, Result<Self::Response, RpcError>>
    where
        S: Stream<Item = Result<Self::Request, RpcError>> + Send + 'static,
    {
        engine.request_channel(
            P::client_metadata(),
            requests,
            P::decode_response,
            P::encode_request,
            P::options().merge(&options),
        )
    }

    async fn fire_and_forget(
        engine: &RpcClientEngine,
        request: Self::Request,
        options: Options,
    ) -> Result<(), RpcError> {
        engine
            .fire_and_forget(
                P::client_metadata(),
                request,
                P::encode_request,
                P::options().merge(&options),
            )
            .await
    }

    async fn metadata_push(engine: &RpcClientEngine, options: Options) -> Result<(), RpcError> {
        engine
            .metadata_push(P::client_metadata(), P::options().merge(&options))
            .await
    }
}
