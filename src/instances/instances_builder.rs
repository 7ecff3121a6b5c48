use super::{InstanceContainer, ProvidableInstance, ProvidedInstance};
use std::sync::Arc;

/// Collects instances for a container or a context builder.
///
/// Registering a second instance under a key that is already present
/// replaces the earlier one and moves the key to the end of the list.
#[derive(Debug, Default)]
pub struct InstancesBuilder {
    instances: Vec<ProvidedInstance>,
}

impl InstancesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: ProvidableInstance>(self, instance: T) -> Self {
        self.register_provided(ProvidedInstance::new(instance))
    }

    pub fn register_arc<T: ProvidableInstance>(self, instance: Arc<T>) -> Self {
        self.register_provided(ProvidedInstance::from_arc(instance))
    }

    pub fn register_provided(mut self, provided: ProvidedInstance) -> Self {
        self.instances.retain(|existing| existing.id() != provided.id());
        self.instances.push(provided);
        self
    }

    pub fn build(self) -> Vec<ProvidedInstance> {
        self.instances
    }

    pub fn build_container(self) -> InstanceContainer {
        InstanceContainer::create(self.instances)
    }
}
