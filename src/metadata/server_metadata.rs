use super::{MetadataExtra, RpcMetadata};
use crate::constants::CURRENT_SCHEMA_VERSION;
use crate::error::RpcError;
use bitcode::{Decode, Encode};

/// Server-to-client metadata returned alongside a response.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ServerMetadata {
    schema_version: i32,
    extra: MetadataExtra,
}

impl ServerMetadata {
    pub const EMPTY: ServerMetadata = ServerMetadata {
        schema_version: CURRENT_SCHEMA_VERSION,
        extra: MetadataExtra::new(),
    };

    pub fn new(schema_version: i32, extra: MetadataExtra) -> Self {
        Self {
            schema_version,
            extra,
        }
    }
}

impl Default for ServerMetadata {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl RpcMetadata for ServerMetadata {
    const DIRECTION: &'static str = "response";

    fn schema_version(&self) -> i32 {
        self.schema_version
    }

    fn extra(&self) -> &MetadataExtra {
        &self.extra
    }

    fn with_extra(&self, extra: MetadataExtra) -> Self {
        Self {
            schema_version: self.schema_version,
            extra,
        }
    }

    fn encode(&self) -> Vec<u8> {
        bitcode::encode(self)
    }

    fn decode(bytes: &[u8]) -> Result<Self, RpcError> {
        Ok(bitcode::decode(bytes)?)
    }
}
