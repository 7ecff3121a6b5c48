use crate::{RequestContext, RpcDefinition, RpcServerError, RpcServerModule};
use futures::FutureExt;
use futures::future;
use futures::stream::{self, StreamExt, TryStreamExt};
use rrpc::{
    CallContext, ClientMetadata, DataVariant, InstanceContainer, Options, Payload, PayloadStream,
    ProtocolViolation, RpcError, RpcKind, RpcMetadata, RpcTransport, ServerMetadata,
    decode_data_frames,
};
use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::runtime;

/// Answers calls against an `RpcServerModule`.
///
/// Implements `RpcTransport` directly, so a client engine can be pointed at a
/// responder as an in-process loopback. A network listener would feed frames
/// to the same verbs.
///
/// Every verb decodes the client metadata, resolves the procedure by name and
/// shape, runs the server's request chain, invokes the handler and (for shapes
/// with a reply) runs the response chain before framing the result. Streams
/// open with a metadata-only frame.
///
/// `fire_and_forget` and `metadata_push` acknowledge as soon as the frame is
/// well formed. Their handlers are spawned onto the current Tokio runtime;
/// outside a runtime they run to completion before the acknowledgement.
#[derive(Clone)]
pub struct RpcServerResponder {
    module: Arc<RpcServerModule>,
}

enum Incoming {
    Single(Vec<u8>),
    Stream(PayloadStream),
    Empty,
}

impl RpcServerResponder {
    pub fn new(module: RpcServerModule) -> Self {
        Self::from_shared(Arc::new(module))
    }

    pub fn from_shared(module: Arc<RpcServerModule>) -> Self {
        Self { module }
    }

    pub fn module(&self) -> &RpcServerModule {
        &self.module
    }
}

#[async_trait::async_trait]
impl RpcTransport for RpcServerResponder {
    async fn request_response(&self, payload: Payload) -> Result<Payload, io::Error> {
        let metadata = decode_client_metadata(payload.metadata)?;
        let bytes = payload.data.ok_or_else(|| violation(ProtocolViolation::MissingPayload))?;

        let (definition, output, options, instances) = handle(
            &self.module,
            metadata,
            RpcKind::RequestResponse,
            Incoming::Single(bytes),
        )
        .await?;

        let (data, metadata, _, _) = respond(&self.module, output, options, instances)
            .await?
            .into_parts();

        match data {
            DataVariant::Single(message) => {
                Ok(Payload::new(metadata.encode(), definition.encode(message)?))
            }
            DataVariant::Error(e) => Err(handler_failed(e)),
            other => Err(RpcError::UnexpectedData {
                expected: "single",
                found: other.kind_name(),
            }
            .into()),
        }
    }

    fn request_stream(&self, payload: Payload) -> PayloadStream {
        let module = Arc::clone(&self.module);

        stream::once(async move {
            let metadata = decode_client_metadata(payload.metadata)?;
            let bytes = payload.data.ok_or_else(|| violation(ProtocolViolation::MissingPayload))?;

            let (definition, output, options, instances) = handle(
                &module,
                metadata,
                RpcKind::RequestStream,
                Incoming::Single(bytes),
            )
            .await?;

            let context = respond(&module, output, options, instances).await?;
            Ok::<_, io::Error>(frame_stream(definition, context))
        })
        .try_flatten()
        .boxed()
    }

    fn request_channel(&self, mut payloads: PayloadStream) -> PayloadStream {
        let module = Arc::clone(&self.module);

        stream::once(async move {
            let first = payloads
                .next()
                .await
                .ok_or_else(|| violation(ProtocolViolation::EmptyStream))??;
            let metadata = decode_client_metadata(first.metadata)?;

            // Data on the opening frame is the channel's first request.
            let requests = stream::iter(first.data.map(|bytes| Ok(Payload::data_only(bytes))))
                .chain(payloads)
                .boxed();

            let (definition, output, options, instances) = handle(
                &module,
                metadata,
                RpcKind::RequestChannel,
                Incoming::Stream(requests),
            )
            .await?;

            let context = respond(&module, output, options, instances).await?;
            Ok::<_, io::Error>(frame_stream(definition, context))
        })
        .try_flatten()
        .boxed()
    }

    /// Rejects malformed frames. Lookup and handler failures have no way back
    /// to the caller, so they are only logged.
    async fn fire_and_forget(&self, payload: Payload) -> Result<(), io::Error> {
        let metadata = decode_client_metadata(payload.metadata)?;
        let bytes = payload.data.ok_or_else(|| violation(ProtocolViolation::MissingPayload))?;

        let module = Arc::clone(&self.module);
        detach(async move {
            let incoming = Incoming::Single(bytes);
            handle(&module, metadata, RpcKind::FireAndForget, incoming).await
        })
        .await;

        Ok(())
    }

    /// Same reporting as `fire_and_forget`.
    async fn metadata_push(&self, metadata: Vec<u8>) -> Result<(), io::Error> {
        let metadata = decode_client_metadata(Some(metadata))?;

        let module = Arc::clone(&self.module);
        detach(async move {
            handle(&module, metadata, RpcKind::MetadataPush, Incoming::Empty).await
        })
        .await;

        Ok(())
    }
}

type Handled = (RpcDefinition, DataVariant, Options, InstanceContainer);

async fn handle(
    module: &RpcServerModule,
    metadata: ClientMetadata,
    kind: RpcKind,
    incoming: Incoming,
) -> Result<Handled, RpcServerError> {
    tracing::debug!(
        service = metadata.service_name(),
        procedure = metadata.procedure_name(),
        %kind,
        "Handling call"
    );

    let definition = module
        .rpcs()
        .get_rpc(metadata.service_name(), metadata.procedure_name(), kind)
        .inspect_err(|e| tracing::warn!("Rejecting call: {}", e))?
        .clone();

    let data = match incoming {
        Incoming::Single(bytes) => DataVariant::Single(definition.decode(&bytes)?),
        Incoming::Stream(frames) => {
            let decoder = definition.clone();
            DataVariant::Stream(decode_data_frames(frames, move |bytes| decoder.decode(bytes)))
        }
        Incoming::Empty => DataVariant::Empty,
    };

    let context = module
        .interceptors()
        .run_request_interceptors(
            data,
            metadata,
            definition.options().clone(),
            module.instances().clone(),
        )
        .await?;

    let (data, metadata, options, instances) = context.into_parts();
    if let DataVariant::Error(e) = data {
        return Err(e.into());
    }

    let request = RequestContext::new(instances.clone(), options.clone(), metadata);
    let output = definition.invoke(request, data).await;

    Ok((definition, output, options, instances))
}

async fn respond(
    module: &RpcServerModule,
    output: DataVariant,
    options: Options,
    instances: InstanceContainer,
) -> Result<CallContext<ServerMetadata>, RpcError> {
    module
        .interceptors()
        .run_response_interceptors(output, ServerMetadata::default(), options, instances)
        .await
}

/// A metadata-only frame followed by one data frame per response item.
fn frame_stream(definition: RpcDefinition, context: CallContext<ServerMetadata>) -> PayloadStream {
    let (data, metadata, _, _) = context.into_parts();

    let items = match data {
        DataVariant::Stream(items) => items,
        DataVariant::Empty => stream::empty().boxed(),
        DataVariant::Error(e) => {
            return stream::once(future::ready(Err(handler_failed(e)))).boxed();
        }
        DataVariant::Single(_) => {
            let e = RpcError::UnexpectedData {
                expected: "stream",
                found: "single",
            };
            return stream::once(future::ready(Err(e.into()))).boxed();
        }
    };

    let head = stream::once(future::ready(Ok(Payload::metadata_only(metadata.encode()))));
    let body = items.map(move |item| {
        item.and_then(|message| definition.encode(message))
            .map(Payload::data_only)
            .map_err(handler_failed)
    });

    head.chain(body).boxed()
}

fn decode_client_metadata(bytes: Option<Vec<u8>>) -> Result<ClientMetadata, RpcError> {
    let bytes = bytes.ok_or_else(|| violation(ProtocolViolation::MissingMetadata))?;
    ClientMetadata::decode(&bytes)
}

fn violation(violation: ProtocolViolation) -> RpcError {
    tracing::warn!("Protocol violation from client: {}", violation);
    violation.into()
}

fn handler_failed(e: RpcError) -> io::Error {
    tracing::error!("Handler failed: {}", e);
    e.into()
}

/// Runs a call that has no reply, logging its outcome.
async fn detach<F>(call: F)
where
    F: Future<Output = Result<Handled, RpcServerError>> + Send + 'static,
{
    let task = call.map(log_unanswered);

    match runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(task);
        }
        Err(_) => task.await,
    }
}

fn log_unanswered(outcome: Result<Handled, RpcServerError>) {
    match outcome {
        Ok((_, DataVariant::Error(e), _, _)) => {
            tracing::error!("Handler failed: {}", e);
        }
        Ok(_) => {}
        Err(e) => tracing::error!("Call failed: {}", e),
    }
}
