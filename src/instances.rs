mod instance_container;
mod instance_key;
mod instances_builder;
mod providable_instance;

pub use instance_container::InstanceContainer;
pub use instance_key::{InstanceId, InstanceKey};
pub use instances_builder::InstancesBuilder;
pub use providable_instance::{ProvidableInstance, ProvidedInstance};
