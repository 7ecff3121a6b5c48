mod client_metadata;
mod rpc_metadata;
mod server_metadata;

pub use client_metadata::ClientMetadata;
pub use rpc_metadata::{MetadataExtra, RpcMetadata};
pub use server_metadata::ServerMetadata;
