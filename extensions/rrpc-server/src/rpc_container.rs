use crate::{LookupError, RequestContext, RpcDefinition, RpcInvoker, RpcServerError};
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use futures::stream::{BoxStream, Stream};
use rrpc::constants::RPC_CONTAINER_INSTANCE_NAME;
use rrpc::{DataVariant, InstanceKey, ProvidableInstance, RpcError, RpcKind, RpcProcedure};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::future::Future;
use std::sync::Arc;

/// The registry of procedures a server answers, keyed by service and
/// procedure name.
///
/// The container is immutable once built and is itself registered as an
/// instance on the server module, so interceptors can inspect what is served.
#[derive(Debug, Default)]
pub struct RpcContainer {
    services: HashMap<String, HashMap<String, RpcDefinition>>,
}

impl ProvidableInstance for RpcContainer {
    const KEY: InstanceKey<Self> = InstanceKey::new(RPC_CONTAINER_INSTANCE_NAME);
}

impl RpcContainer {
    pub fn builder() -> RpcContainerBuilder {
        RpcContainerBuilder::default()
    }

    /// Resolves an incoming call.
    ///
    /// Fails with `NotFound` if no procedure has that name in that service,
    /// and with `KindMismatch` if it exists under a different shape.
    pub fn get_rpc(
        &self,
        service: &str,
        procedure: &str,
        kind: RpcKind,
    ) -> Result<&RpcDefinition, LookupError> {
        let definition = self
            .services
            .get(service)
            .and_then(|procedures| procedures.get(procedure))
            .ok_or_else(|| LookupError::NotFound {
                service: service.to_string(),
                procedure: procedure.to_string(),
            })?;

        if definition.kind() != kind {
            return Err(LookupError::KindMismatch {
                service: service.to_string(),
                procedure: procedure.to_string(),
                expected: kind,
                actual: definition.kind(),
            });
        }

        Ok(definition)
    }

    pub fn len(&self) -> usize {
        self.services.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collects handlers for an `RpcContainer`.
///
/// Each `register_*` method fixes the procedure's shape; registering a
/// procedure whose declared `KIND` differs, or registering the same name
/// twice, is an error.
#[derive(Default)]
pub struct RpcContainerBuilder {
    services: HashMap<String, HashMap<String, RpcDefinition>>,
}

impl RpcContainerBuilder {
    pub fn register_request_response<P, F, Fut>(
        &mut self,
        handler: F,
    ) -> Result<&mut Self, RpcServerError>
    where
        P: RpcProcedure + 'static,
        F: Fn(RequestContext, P::Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<P::Response, RpcError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let invoker: RpcInvoker = Arc::new(move |context: RequestContext, data: DataVariant| {
            let handler = Arc::clone(&handler);
            async move {
                let request = match data.into_single::<P::Request>() {
                    Ok(request) => request,
                    Err(e) => return DataVariant::Error(e),
                };

                match handler(context, request).await {
                    Ok(response) => DataVariant::single(response),
                    Err(e) => DataVariant::Error(e),
                }
            }
            .boxed()
        });

        self.insert::<P>(RpcKind::RequestResponse, invoker)
    }

    pub fn register_request_stream<P, F, S>(
        &mut self,
        handler: F,
    ) -> Result<&mut Self, RpcServerError>
    where
        P: RpcProcedure + 'static,
        F: Fn(RequestContext, P::Request) -> S + Send + Sync + 'static,
        S: Stream<Item = Result<P::Response, RpcError>> + Send + 'static,
    {
        let invoker: RpcInvoker = Arc::new(move |context: RequestContext, data: DataVariant| {
            let responses = match data.into_single::<P::Request>() {
                Ok(request) => DataVariant::stream(handler(context, request)),
                Err(e) => DataVariant::Error(e),
            };

            ready(responses)
        });

        self.insert::<P>(RpcKind::RequestStream, invoker)
    }

    pub fn register_request_channel<P, F, S>(
        &mut self,
        handler: F,
    ) -> Result<&mut Self, RpcServerError>
    where
        P: RpcProcedure + 'static,
        F: Fn(RequestContext, BoxStream<'static, Result<P::Request, RpcError>>) -> S
            + Send
            + Sync
            + 'static,
        S: Stream<Item = Result<P::Response, RpcError>> + Send + 'static,
    {
        let invoker: RpcInvoker = Arc::new(move |context: RequestContext, data: DataVariant| {
            let responses = match data {
                DataVariant::Error(e) => DataVariant::Error(e),
                requests => DataVariant::stream(handler(context, requests.into_stream())),
            };

            ready(responses)
        });

        self.insert::<P>(RpcKind::RequestChannel, invoker)
    }

    pub fn register_fire_and_forget<P, F, Fut>(
        &mut self,
        handler: F,
    ) -> Result<&mut Self, RpcServerError>
    where
        P: RpcProcedure + 'static,
        F: Fn(RequestContext, P::Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), RpcError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let invoker: RpcInvoker = Arc::new(move |context: RequestContext, data: DataVariant| {
            let handler = Arc::clone(&handler);
            async move {
                let request = match data.into_single::<P::Request>() {
                    Ok(request) => request,
                    Err(e) => return DataVariant::Error(e),
                };

                match handler(context, request).await {
                    Ok(()) => DataVariant::Empty,
                    Err(e) => DataVariant::Error(e),
                }
            }
            .boxed()
        });

        self.insert::<P>(RpcKind::FireAndForget, invoker)
    }

    pub fn register_metadata_push<P, F, Fut>(
        &mut self,
        handler: F,
    ) -> Result<&mut Self, RpcServerError>
    where
        P: RpcProcedure + 'static,
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), RpcError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let invoker: RpcInvoker = Arc::new(move |context: RequestContext, data: DataVariant| {
            let handler = Arc::clone(&handler);
            async move {
                if let DataVariant::Error(e) = data {
                    return DataVariant::Error(e);
                }

                match handler(context).await {
                    Ok(()) => DataVariant::Empty,
                    Err(e) => DataVariant::Error(e),
                }
            }
            .boxed()
        });

        self.insert::<P>(RpcKind::MetadataPush, invoker)
    }

    pub fn build(self) -> RpcContainer {
        RpcContainer {
            services: self.services,
        }
    }

    fn insert<P: RpcProcedure + 'static>(
        &mut self,
        kind: RpcKind,
        invoker: RpcInvoker,
    ) -> Result<&mut Self, RpcServerError> {
        if P::KIND != kind {
            return Err(RpcServerError::Lookup(LookupError::KindMismatch {
                service: P::SERVICE_NAME.to_string(),
                procedure: P::PROCEDURE_NAME.to_string(),
                expected: kind,
                actual: P::KIND,
            }));
        }

        let procedures = self
            .services
            .entry(P::SERVICE_NAME.to_string())
            .or_default();

        match procedures.entry(P::PROCEDURE_NAME.to_string()) {
            Entry::Occupied(_) => Err(RpcServerError::DuplicateProcedure {
                service: P::SERVICE_NAME.to_string(),
                procedure: P::PROCEDURE_NAME.to_string(),
            }),
            Entry::Vacant(entry) => {
                tracing::debug!(
                    service = P::SERVICE_NAME,
                    procedure = P::PROCEDURE_NAME,
                    %kind,
                    "Registered procedure"
                );
                entry.insert(RpcDefinition::for_procedure::<P>(kind, invoker));
                Ok(self)
            }
        }
    }
}

fn ready(data: DataVariant) -> BoxFuture<'static, DataVariant> {
    future::ready(data).boxed()
}
