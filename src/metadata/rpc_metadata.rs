use crate::error::RpcError;
use std::collections::BTreeMap;
use std::fmt;

/// Free-form key/value context carried by both envelopes.
///
/// Ordered so that encoding is deterministic.
pub type MetadataExtra = BTreeMap<String, Vec<u8>>;

/// Common surface of the two metadata envelopes.
///
/// Interceptor chains are generic over this trait: request-bound chains run
/// over `ClientMetadata`, response-bound chains over `ServerMetadata`.
pub trait RpcMetadata: Clone + fmt::Debug + Send + Sync + 'static {
    /// Which interceptor direction carries this envelope (used in logs).
    const DIRECTION: &'static str;

    fn schema_version(&self) -> i32;

    fn extra(&self) -> &MetadataExtra;

    /// Returns a copy with `extra` replaced and every other field unchanged.
    fn with_extra(&self, extra: MetadataExtra) -> Self;

    /// Returns a copy with a single `extra` entry inserted or replaced.
    fn with_extra_entry(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        let mut extra = self.extra().clone();
        extra.insert(key.into(), value.into());
        self.with_extra(extra)
    }

    /// Same logical value always yields the same bytes.
    fn encode(&self) -> Vec<u8>;

    fn decode(bytes: &[u8]) -> Result<Self, RpcError>;
}
