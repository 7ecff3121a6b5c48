use xxhash_rust::const_xxh3::xxh3_64 as const_xxh3_64;

pub const fn instance_key_hash(name: &str) -> u64 {
    const_xxh3_64(name.as_bytes())
}

/// Compile-time instance key generator using xxHash3.
///
/// Expands to an `InstanceKey<T>` whose identity is the xxh3-64 hash of the
/// given string literal. `InstanceKey::new` is a `const fn`, so when the key
/// is stored in a `const` (typically `ProvidableInstance::KEY`) the hash is
/// computed at **compile time**.
///
/// Names should be namespaced by their owner (e.g. `"auth.token_source"`)
/// since two keys with the same name are the same key.
///
/// ## Example
///
/// ```rust
/// use rrpc::{InstanceKey, ProvidableInstance, instance_key};
///
/// struct TokenSource(String);
///
/// impl ProvidableInstance for TokenSource {
///     const KEY: InstanceKey<Self> = instance_key!("auth.token_source");
/// }
///
/// assert_eq!(TokenSource::KEY.name(), "auth.token_source");
/// ```
#[macro_export]
macro_rules! instance_key {
    ($name:literal) => {
        $crate::InstanceKey::new($name)
    };
}
