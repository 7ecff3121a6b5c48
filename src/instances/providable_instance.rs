use super::{InstanceId, InstanceKey};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A capability that can be placed in an `InstanceContainer`.
///
/// Every implementor declares its own key; there is no lookup by Rust type.
pub trait ProvidableInstance: Sized + Send + Sync + 'static {
    const KEY: InstanceKey<Self>;
}

/// A type-erased instance paired with the key it was declared under.
///
/// This is the unit that `InstanceContainer::add_all` and the context
/// builder accept, so instances of different types can travel in one list.
#[derive(Clone)]
pub struct ProvidedInstance {
    id: InstanceId,
    instance: Arc<dyn Any + Send + Sync>,
}

impl ProvidedInstance {
    pub fn new<T: ProvidableInstance>(instance: T) -> Self {
        Self::from_arc(Arc::new(instance))
    }

    /// Wraps an instance that is already shared elsewhere.
    pub fn from_arc<T: ProvidableInstance>(instance: Arc<T>) -> Self {
        Self {
            id: T::KEY.id(),
            instance,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub(crate) fn into_parts(self) -> (InstanceId, Arc<dyn Any + Send + Sync>) {
        (self.id, self.instance)
    }
}

impl fmt::Debug for ProvidedInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvidedInstance")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
