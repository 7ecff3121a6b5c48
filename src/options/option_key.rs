use std::fmt;
use std::marker::PhantomData;

/// Where an option was declared in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionScope {
    File,
    Service,
    Rpc,
}

/// A typed descriptor for one option tag.
///
/// `tag` is the only field used for lookup. `name` exists for debugging and
/// has no bearing on how options are resolved.
pub struct OptionKey<T> {
    name: &'static str,
    tag: u32,
    scope: OptionScope,
    _value: PhantomData<fn() -> T>,
}

impl<T> OptionKey<T> {
    pub const fn new(name: &'static str, tag: u32, scope: OptionScope) -> Self {
        Self {
            name,
            tag,
            scope,
            _value: PhantomData,
        }
    }

    pub const fn file(name: &'static str, tag: u32) -> Self {
        Self::new(name, tag, OptionScope::File)
    }

    pub const fn service(name: &'static str, tag: u32) -> Self {
        Self::new(name, tag, OptionScope::Service)
    }

    pub const fn rpc(name: &'static str, tag: u32) -> Self {
        Self::new(name, tag, OptionScope::Rpc)
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn tag(&self) -> u32 {
        self.tag
    }

    pub const fn scope(&self) -> OptionScope {
        self.scope
    }
}

impl<T> Clone for OptionKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for OptionKey<T> {}

impl<T> fmt::Debug for OptionKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionKey")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("scope", &self.scope)
            .finish()
    }
}
