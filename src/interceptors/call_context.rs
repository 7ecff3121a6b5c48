use crate::data_variant::DataVariant;
use crate::instances::{InstanceContainer, ProvidableInstance, ProvidedInstance};
use crate::metadata::RpcMetadata;
use crate::options::Options;

/// The immutable bundle threaded through one direction of interceptors.
///
/// Interceptors never mutate a context; they consume it and return a new one,
/// usually via `builder()` or `modify()`.
#[derive(Debug)]
pub struct CallContext<M> {
    data: DataVariant,
    metadata: M,
    options: Options,
    instances: InstanceContainer,
}

impl<M: RpcMetadata> CallContext<M> {
    pub fn new(
        data: DataVariant,
        metadata: M,
        options: Options,
        instances: InstanceContainer,
    ) -> Self {
        Self {
            data,
            metadata,
            options,
            instances,
        }
    }

    pub fn data(&self) -> &DataVariant {
        &self.data
    }

    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn instances(&self) -> &InstanceContainer {
        &self.instances
    }

    pub fn into_data(self) -> DataVariant {
        self.data
    }

    pub fn into_parts(self) -> (DataVariant, M, Options, InstanceContainer) {
        (self.data, self.metadata, self.options, self.instances)
    }

    /// Starts a modified copy. The context is moved into the builder because
    /// stream data cannot be duplicated.
    pub fn builder(self) -> CallContextBuilder<M> {
        CallContextBuilder {
            data: self.data,
            metadata: self.metadata,
            options: self.options,
            instances: self.instances,
        }
    }

    /// Applies `configure` to a builder seeded from this context and returns
    /// the built result.
    pub fn modify(
        self,
        configure: impl FnOnce(CallContextBuilder<M>) -> CallContextBuilder<M>,
    ) -> Self {
        configure(self.builder()).build()
    }
}

/// Accumulates changes for a new `CallContext`.
///
/// `build` consumes the builder, so a builder can produce exactly one context.
#[derive(Debug)]
pub struct CallContextBuilder<M> {
    data: DataVariant,
    metadata: M,
    options: Options,
    instances: InstanceContainer,
}

impl<M: RpcMetadata> CallContextBuilder<M> {
    pub fn set_data(mut self, data: DataVariant) -> Self {
        self.data = data;
        self
    }

    pub fn set_metadata(mut self, metadata: M) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn set_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Adds to the existing container; it is never replaced wholesale.
    pub fn add_local_instances(
        mut self,
        instances: impl IntoIterator<Item = ProvidedInstance>,
    ) -> Self {
        self.instances = self.instances.add_all(instances);
        self
    }

    pub fn add_local_instance<T: ProvidableInstance>(mut self, instance: T) -> Self {
        self.instances = self.instances.add(instance);
        self
    }

    pub fn data(&self) -> &DataVariant {
        &self.data
    }

    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    pub fn build(self) -> CallContext<M> {
        CallContext {
            data: self.data,
            metadata: self.metadata,
            options: self.options,
            instances: self.instances,
        }
    }
}
