use rrpc::{
    ClientMetadata, InstanceContainer, Interceptor, Interceptors, ProvidableInstance,
    ProvidedInstance, RpcTransport, ServerMetadata,
};
use std::sync::Arc;

/// Everything an engine needs, fixed at construction time.
///
/// Calls only ever read the module; per-call additions are layered on top of
/// its instance container, never written into it.
pub struct RpcClientModule {
    transport: Arc<dyn RpcTransport>,
    interceptors: Interceptors,
    instances: InstanceContainer,
}

impl RpcClientModule {
    pub fn new(
        transport: Arc<dyn RpcTransport>,
        interceptors: Interceptors,
        instances: InstanceContainer,
    ) -> Self {
        Self {
            transport,
            interceptors,
            instances,
        }
    }

    pub fn builder(transport: Arc<dyn RpcTransport>) -> RpcClientModuleBuilder {
        RpcClientModuleBuilder {
            transport,
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
            instances: Vec::new(),
        }
    }

    pub fn transport(&self) -> &Arc<dyn RpcTransport> {
        &self.transport
    }

    pub fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    pub fn instances(&self) -> &InstanceContainer {
        &self.instances
    }
}

pub struct RpcClientModuleBuilder {
    transport: Arc<dyn RpcTransport>,
    request_interceptors: Vec<Arc<dyn Interceptor<ClientMetadata>>>,
    response_interceptors: Vec<Arc<dyn Interceptor<ServerMetadata>>>,
    instances: Vec<ProvidedInstance>,
}

impl RpcClientModuleBuilder {
    /// Appends to the request-bound list. Interceptors run in the order added.
    pub fn request_interceptor(
        mut self,
        interceptor: impl Interceptor<ClientMetadata> + 'static,
    ) -> Self {
        self.request_interceptors.push(Arc::new(interceptor));
        self
    }

    /// Appends to the response-bound list. Interceptors run in the order added.
    pub fn response_interceptor(
        mut self,
        interceptor: impl Interceptor<ServerMetadata> + 'static,
    ) -> Self {
        self.response_interceptors.push(Arc::new(interceptor));
        self
    }

    /// Registers a client-global instance visible to every call.
    pub fn instance<T: ProvidableInstance>(mut self, instance: T) -> Self {
        self.instances.push(ProvidedInstance::new(instance));
        self
    }

    pub fn build(self) -> RpcClientModule {
        RpcClientModule::new(
            self.transport,
            Interceptors::new(self.request_interceptors, self.response_interceptors),
            InstanceContainer::create(self.instances),
        )
    }
}
