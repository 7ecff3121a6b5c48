use crate::RpcContainer;
use rrpc::{
    ClientMetadata, InstanceContainer, Interceptor, Interceptors, ProvidableInstance,
    ProvidedInstance, ServerMetadata,
};
use std::sync::Arc;

/// A server's fixed wiring: interceptor chains, server-global instances and
/// the procedure registry.
///
/// The registry is also present in `instances()` under `RpcContainer::KEY`.
pub struct RpcServerModule {
    interceptors: Interceptors,
    instances: InstanceContainer,
    rpcs: Arc<RpcContainer>,
}

impl RpcServerModule {
    pub fn new(
        interceptors: Interceptors,
        instances: InstanceContainer,
        rpcs: RpcContainer,
    ) -> Self {
        let rpcs = Arc::new(rpcs);
        let instances = instances.add_all([ProvidedInstance::from_arc(Arc::clone(&rpcs))]);

        Self {
            interceptors,
            instances,
            rpcs,
        }
    }

    pub fn builder(rpcs: RpcContainer) -> RpcServerModuleBuilder {
        RpcServerModuleBuilder {
            rpcs,
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
            instances: Vec::new(),
        }
    }

    pub fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    pub fn instances(&self) -> &InstanceContainer {
        &self.instances
    }

    pub fn rpcs(&self) -> &RpcContainer {
        &self.rpcs
    }
}

pub struct RpcServerModuleBuilder {
    rpcs: RpcContainer,
    request_interceptors: Vec<Arc<dyn Interceptor<ClientMetadata>>>,
    response_interceptors: Vec<Arc<dyn Interceptor<ServerMetadata>>>,
    instances: Vec<ProvidedInstance>,
}

impl RpcServerModuleBuilder {
    /// Runs over every incoming request before its handler.
    pub fn request_interceptor(
        mut self,
        interceptor: impl Interceptor<ClientMetadata> + 'static,
    ) -> Self {
        self.request_interceptors.push(Arc::new(interceptor));
        self
    }

    /// Runs over every handler result before it is framed.
    pub fn response_interceptor(
        mut self,
        interceptor: impl Interceptor<ServerMetadata> + 'static,
    ) -> Self {
        self.response_interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn instance<T: ProvidableInstance>(mut self, instance: T) -> Self {
        self.instances.push(ProvidedInstance::new(instance));
        self
    }

    pub fn build(self) -> RpcServerModule {
        RpcServerModule::new(
            Interceptors::new(self.request_interceptors, self.response_interceptors),
            InstanceContainer::create(self.instances),
            self.rpcs,
        )
    }
}
