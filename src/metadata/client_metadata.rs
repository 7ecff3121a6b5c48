use super::{MetadataExtra, RpcMetadata};
use crate::constants::CURRENT_SCHEMA_VERSION;
use crate::error::RpcError;
use bitcode::{Decode, Encode};

/// Client-to-server metadata identifying the target procedure.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ClientMetadata {
    schema_version: i32,
    service_name: String,
    procedure_name: String,
    extra: MetadataExtra,
}

impl ClientMetadata {
    pub const EMPTY: ClientMetadata = ClientMetadata {
        schema_version: CURRENT_SCHEMA_VERSION,
        service_name: String::new(),
        procedure_name: String::new(),
        extra: MetadataExtra::new(),
    };

    pub fn new(service_name: impl Into<String>, procedure_name: impl Into<String>) -> Self {
        Self::from_parts(
            CURRENT_SCHEMA_VERSION,
            service_name,
            procedure_name,
            MetadataExtra::new(),
        )
    }

    pub fn from_parts(
        schema_version: i32,
        service_name: impl Into<String>,
        procedure_name: impl Into<String>,
        extra: MetadataExtra,
    ) -> Self {
        Self {
            schema_version,
            service_name: service_name.into(),
            procedure_name: procedure_name.into(),
            extra,
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn procedure_name(&self) -> &str {
        &self.procedure_name
    }
}

impl Default for ClientMetadata {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl RpcMetadata for ClientMetadata {
    const DIRECTION: &'static str = "request";

    fn schema_version(&self) -> i32 {
        self.schema_version
    }

    fn extra(&self) -> &MetadataExtra {
        &self.extra
    }

    fn with_extra(&self, extra: MetadataExtra) -> Self {
        Self {
            schema_version: self.schema_version,
            service_name: self.service_name.clone(),
            procedure_name: self.procedure_name.clone(),
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
