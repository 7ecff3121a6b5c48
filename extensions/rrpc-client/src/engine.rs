use crate::RpcClientModule;
use futures::future;
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use rrpc::{
    ClientMetadata, DataVariant, DynMessage, InstanceContainer, Options, Payload, PayloadStream,
    ProtocolViolation, RpcError, RpcMetadata, ServerMetadata, decode_data_frames,
};
use std::io;
use std::sync::Arc;

/// Runs the five call shapes against a module's transport, wrapping each in
/// the module's interceptor chains.
///
/// Every shape follows the same template: run the request chain over a fresh
/// request context, encode and hand the result to the transport verb, and (for
/// shapes with a reply) run the response chain once over a fresh response
/// context before extracting the caller's payload.
///
/// The engine holds no per-call state. Cloning it is cheap and clones share
/// the module.
#[derive(Clone)]
pub struct RpcClientEngine {
    module: Arc<RpcClientModule>,
}

impl RpcClientEngine {
    pub fn new(module: RpcClientModule) -> Self {
        Self::from_shared(Arc::new(module))
    }

    pub fn from_shared(module: Arc<RpcClientModule>) -> Self {
        Self { module }
    }

    pub fn module(&self) -> &RpcClientModule {
        &self.module
    }

    /// Returns an engine whose calls see `local` layered over the module's
    /// instances (entries in `local` win). The receiver is unaffected.
    pub fn with_instances(&self, local: &InstanceContainer) -> Self {
        let module = RpcClientModule::new(
            Arc::clone(self.module.transport()),
            self.module.interceptors().clone(),
            self.module.instances().merge(local),
        );

        Self::new(module)
    }

    /// Sends one request and waits for one response.
    pub async fn request_response<T, R, D, E>(
        &self,
        metadata: ClientMetadata,
        request: T,
        decode: D,
        encode: E,
        options: Options,
    ) -> Result<R, RpcError>
    where
        T: Send + 'static,
        R: Send + 'static,
        D: Fn(&[u8]) -> Result<R, io::Error> + Send + Sync,
        E: Fn(&T) -> Result<Vec<u8>, io::Error> + Send + Sync,
    {
        tracing::debug!(
            service = metadata.service_name(),
            procedure = metadata.procedure_name(),
            "request-response"
        );

        let module = &self.module;
        let context = module
            .interceptors()
            .run_request_interceptors(
                DataVariant::single(request),
                metadata,
                options,
                module.instances().clone(),
            )
            .await?;

        let (data, metadata, options, instances) = context.into_parts();
        let request: T = data.into_single()?;
        let payload = Payload::new(
            metadata.encode(),
            encode(&request).map_err(RpcError::Codec)?,
        );

        let response = module
            .transport()
            .request_response(payload)
            .await
            .map_err(RpcError::Transport)?;

        let server_metadata = match response.metadata {
            Some(bytes) => ServerMetadata::decode(&bytes)?,
            None => ServerMetadata::default(),
        };
        let bytes = response
            .data
            .ok_or_else(|| protocol_violation(ProtocolViolation::MissingPayload))?;
        let value = decode(&bytes).map_err(RpcError::Codec)?;

        module
            .interceptors()
            .run_response_interceptors(
                DataVariant::single(value),
                server_metadata,
                options,
                instances,
            )
            .await?
            .into_data()
            .into_single()
    }

    /// Sends one request and receives a lazy stream of responses.
    ///
    /// Nothing happens until the returned stream is first polled. Dropping it
    /// drops the transport stream.
    pub fn request_stream<T, R, D, E>(
        &self,
        metadata: ClientMetadata,
        request: T,
        decode: D,
        encode: E,
        options: Options,
    ) -> BoxStream<'static, Result<R, RpcError>>
    where
        T: Send + 'static,
        R: Send + 'static,
        D: Fn(&[u8]) -> Result<R, io::Error> + Send + Sync + 'static,
        E: Fn(&T) -> Result<Vec<u8>, io::Error> + Send + Sync + 'static,
    {
        let engine = self.clone();

        stream::once(async move {
            tracing::debug!(
                service = metadata.service_name(),
                procedure = metadata.procedure_name(),
                "request-stream"
            );

            let module = &engine.module;
            let context = module
                .interceptors()
                .run_request_interceptors(
                    DataVariant::single(request),
                    metadata,
                    options,
                    module.instances().clone(),
                )
                .await?;

            let (data, metadata, options, instances) = context.into_parts();
            let request: T = data.into_single()?;
            let payload = Payload::new(
                metadata.encode(),
                encode(&request).map_err(RpcError::Codec)?,
            );

            let frames = module.transport().request_stream(payload);
            engine
                .open_response_stream(frames, decode, options, instances)
                .await
        })
        .try_flatten()
        .boxed()
    }

    /// Sends a stream of requests and receives a lazy stream of responses.
    ///
    /// The transport first receives a metadata-only control frame, then one
    /// data frame per outgoing item. An `Err` item in `requests` is forwarded
    /// to the transport's sending side as is.
    pub fn request_channel<T, R, S, D, E>(
        &self,
        metadata: ClientMetadata,
        requests: S,
        decode: D,
        encode: E,
        options: Options,
    ) -> BoxStream<'static, Result<R, RpcError>>
    where
        T: Send + 'static,
        R: Send + 'static,
        S: Stream<Item = Result<T, RpcError>> + Send + 'static,
        D: Fn(&[u8]) -> Result<R, io::Error> + Send + Sync + 'static,
        E: Fn(&T) -> Result<Vec<u8>, io::Error> + Send + Sync + 'static,
    {
        let engine = self.clone();

        stream::once(async move {
            tracing::debug!(
                service = metadata.service_name(),
                procedure = metadata.procedure_name(),
                "request-channel"
            );

            let module = &engine.module;
            let context = module
                .interceptors()
                .run_request_interceptors(
                    DataVariant::stream(requests),
                    metadata,
                    options,
                    module.instances().clone(),
                )
                .await?;

            let (data, metadata, options, instances) = context.into_parts();
            if let DataVariant::Error(error) = data {
                return Err(error);
            }

            let control_frame = Payload::metadata_only(metadata.encode());
            let data_frames = data.into_stream::<T>().map(move |item| {
                let value = item.map_err(io::Error::from)?;
                encode(&value).map(Payload::data_only)
            });
            let outgoing: PayloadStream = stream::once(future::ready(Ok(control_frame)))
                .chain(data_frames)
                .boxed();

            let frames = module.transport().request_channel(outgoing);
            engine
                .open_response_stream(frames, decode, options, instances)
                .await
        })
        .try_flatten()
        .boxed()
    }

    /// Sends one request without expecting a reply.
    ///
    /// Resolves once the transport has accepted the frame. No response
    /// interceptor runs for this shape.
    pub async fn fire_and_forget<T, E>(
        &self,
        metadata: ClientMetadata,
        request: T,
        encode: E,
        options: Options,
    ) -> Result<(), RpcError>
    where
        T: Send + 'static,
        E: Fn(&T) -> Result<Vec<u8>, io::Error> + Send + Sync,
    {
        tracing::debug!(
            service = metadata.service_name(),
            procedure = metadata.procedure_name(),
            "fire-and-forget"
        );

        let module = &self.module;
        let context = module
            .interceptors()
            .run_request_interceptors(
                DataVariant::single(request),
                metadata,
                options,
                module.instances().clone(),
            )
            .await?;

        let (data, metadata, _, _) = context.into_parts();
        let request: T = data.into_single()?;
        let payload = Payload::new(
            metadata.encode(),
            encode(&request).map_err(RpcError::Codec)?,
        );

        module
            .transport()
            .fire_and_forget(payload)
            .await
            .map_err(RpcError::Transport)
    }

    /// Sends metadata alone. The request chain sees `DataVariant::Empty`.
    pub async fn metadata_push(
        &self,
        metadata: ClientMetadata,
        options: Options,
    ) -> Result<(), RpcError> {
        tracing::debug!(
            service = metadata.service_name(),
            procedure = metadata.procedure_name(),
            "metadata-push"
        );

        let module = &self.module;
        let context = module
            .interceptors()
            .run_request_interceptors(
                DataVariant::Empty,
                metadata,
                options,
                module.instances().clone(),
            )
            .await?;

        let (data, metadata, _, _) = context.into_parts();
        if let DataVariant::Error(error) = data {
            return Err(error);
        }

        module
            .transport()
            .metadata_push(metadata.encode())
            .await
            .map_err(RpcError::Transport)
    }

    /// Consumes the metadata frame of a response stream, runs the response
    /// chain once over the remaining frames, and returns the typed result.
    async fn open_response_stream<R, D>(
        &self,
        mut frames: PayloadStream,
        decode: D,
        options: Options,
        instances: InstanceContainer,
    ) -> Result<BoxStream<'static, Result<R, RpcError>>, RpcError>
    where
        R: Send + 'static,
        D: Fn(&[u8]) -> Result<R, io::Error> + Send + Sync + 'static,
    {
        let first = match frames.next().await {
            Some(frame) => frame.map_err(RpcError::Transport)?,
            None => return Err(protocol_violation(ProtocolViolation::EmptyStream)),
        };

        // Any payload on the metadata frame is not part of the response data.
        let metadata_bytes = first
            .metadata
            .ok_or_else(|| protocol_violation(ProtocolViolation::MissingMetadata))?;
        let server_metadata = ServerMetadata::decode(&metadata_bytes)?;

        let tail = decode_data_frames(frames, move |bytes| {
            decode(bytes)
                .map(|value| Box::new(value) as DynMessage)
                .map_err(RpcError::Codec)
        });

        let context = self
            .module
            .interceptors()
            .run_response_interceptors(
                DataVariant::Stream(tail),
                server_metadata,
                options,
                instances,
            )
            .await?;

        Ok(context.into_data().into_stream())
    }
}

fn protocol_violation(violation: ProtocolViolation) -> RpcError {
    tracing::warn!("Protocol violation from remote peer: {}", violation);
    violation.into()
}
