use rrpc::{ClientMetadata, InstanceContainer, Options, ProvidableInstance};
use std::sync::Arc;

/// What a handler sees of the call besides its payload: the instances and
/// options left by the server's request interceptors, and the client's
/// metadata as those interceptors returned it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    instances: InstanceContainer,
    options: Options,
    metadata: ClientMetadata,
}

impl RequestContext {
    pub fn new(instances: InstanceContainer, options: Options, metadata: ClientMetadata) -> Self {
        Self {
            instances,
            options,
            metadata,
        }
    }

    pub fn instances(&self) -> &InstanceContainer {
        &self.instances
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn metadata(&self) -> &ClientMetadata {
        &self.metadata
    }

    pub fn instance<T: ProvidableInstance>(&self) -> Option<Arc<T>> {
        self.instances.get::<T>()
    }
}
