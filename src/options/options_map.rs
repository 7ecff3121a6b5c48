use super::OptionKey;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type OptionValues = HashMap<u32, Arc<dyn Any + Send + Sync>>;

/// Read-only per-call options keyed by tag.
#[derive(Clone, Default)]
pub struct Options {
    values: Arc<OptionValues>,
}

impl Options {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// Returns `None` if the tag is unset or holds a value of another type.
    pub fn get_value<T: Any + Send + Sync>(&self, key: &OptionKey<T>) -> Option<&T> {
        self.values
            .get(&key.tag())
            .and_then(|value| (**value).downcast_ref::<T>())
    }

    pub fn contains_tag(&self, tag: u32) -> bool {
        self.values.contains_key(&tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = u32> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns a new set where `overrides` wins on tag collision.
    pub fn merge(&self, overrides: &Options) -> Self {
        if overrides.is_empty() {
            return self.clone();
        }

        let mut values = OptionValues::clone(&self.values);
        for (tag, value) in overrides.values.iter() {
            values.insert(*tag, Arc::clone(value));
        }

        Self {
            values: Arc::new(values),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

#[derive(Default)]
pub struct OptionsBuilder {
    values: OptionValues,
}

impl OptionsBuilder {
    pub fn set<T: Any + Send + Sync>(mut self, key: &OptionKey<T>, value: T) -> Self {
        self.values.insert(key.tag(), Arc::new(value));
        self
    }

    pub fn build(self) -> Options {
        Options {
            values: Arc::new(self.values),
        }
    }
}
