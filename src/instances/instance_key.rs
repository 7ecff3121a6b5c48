use crate::macros::instance_key_hash;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// The untyped identity of an instance key.
///
/// Equality and hashing use only the 64-bit hash of the key's name; the name
/// itself is kept for diagnostics.
#[derive(Clone, Copy)]
pub struct InstanceId {
    id: u64,
    name: &'static str,
}

impl InstanceId {
    pub const fn new(name: &'static str) -> Self {
        Self {
            id: instance_key_hash(name),
            name,
        }
    }

    pub const fn id(&self) -> u64 {
        self.id
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for InstanceId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for InstanceId {}

impl Hash for InstanceId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{:016x}", self.name, self.id)
    }
}

/// A typed key identifying one capability type inside an `InstanceContainer`.
///
/// The type parameter only ties the key to the instance type it retrieves;
/// identity comes from the key's name (see `InstanceId`).
pub struct InstanceKey<T> {
    id: InstanceId,
    _instance: PhantomData<fn() -> T>,
}

impl<T> InstanceKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            id: InstanceId::new(name),
            _instance: PhantomData,
        }
    }

    pub const fn id(&self) -> InstanceId {
        self.id
    }

    pub const fn name(&self) -> &'static str {
        self.id.name
    }
}

impl<T> Clone for InstanceKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for InstanceKey<T> {}

impl<T> PartialEq for InstanceKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for InstanceKey<T> {}

impl<T> Hash for InstanceKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for InstanceKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InstanceKey").field(&self.id).finish()
    }
}
