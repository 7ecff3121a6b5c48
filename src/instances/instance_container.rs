use super::{InstanceId, InstanceKey, InstancesBuilder, ProvidableInstance, ProvidedInstance};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type InstanceMap = HashMap<InstanceId, Arc<dyn Any + Send + Sync>>;

/// An immutable, request-scoped registry of capabilities.
///
/// Every operation that changes the contents returns a new container and
/// leaves the receiver untouched, so older versions can be held and read by
/// concurrent calls without locking. Cloning is cheap (the map is shared).
#[derive(Clone, Default)]
pub struct InstanceContainer {
    instances: Arc<InstanceMap>,
}

impl InstanceContainer {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a container from a list. Later entries win on key collision.
    pub fn create(instances: impl IntoIterator<Item = ProvidedInstance>) -> Self {
        Self::empty().add_all(instances)
    }

    pub fn builder() -> InstancesBuilder {
        InstancesBuilder::new()
    }

    /// Returns the instance bound to `key`, or `None` when the key is absent.
    ///
    /// `None` is also returned if the bound instance is not a `T`, which can
    /// only happen when two types declare keys with the same name.
    pub fn get_instance<T: ProvidableInstance>(&self, key: &InstanceKey<T>) -> Option<Arc<T>> {
        self.instances
            .get(&key.id())
            .and_then(|instance| Arc::clone(instance).downcast::<T>().ok())
    }

    /// Looks up a `T` by its declared key.
    pub fn get<T: ProvidableInstance>(&self) -> Option<Arc<T>> {
        self.get_instance(&T::KEY)
    }

    pub fn contains<T>(&self, key: &InstanceKey<T>) -> bool {
        self.instances.contains_key(&key.id())
    }

    pub fn add<T: ProvidableInstance>(&self, instance: T) -> Self {
        self.add_all([ProvidedInstance::new(instance)])
    }

    /// Last write wins on key collision.
    pub fn add_all(&self, instances: impl IntoIterator<Item = ProvidedInstance>) -> Self {
        let mut map = InstanceMap::clone(&self.instances);
        for provided in instances {
            let (id, instance) = provided.into_parts();
            map.insert(id, instance);
        }

        Self {
            instances: Arc::new(map),
        }
    }

    /// Layers `other` on top of `self`; `other` wins on key collision.
    pub fn merge(&self, other: &InstanceContainer) -> Self {
        let mut map = InstanceMap::clone(&self.instances);
        for (id, instance) in other.instances.iter() {
            map.insert(*id, Arc::clone(instance));
        }

        Self {
            instances: Arc::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.instances.keys().copied()
    }
}

impl fmt::Debug for InstanceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.instances.keys()).finish()
    }
}
