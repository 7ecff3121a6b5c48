/// Schema version stamped on freshly constructed metadata envelopes.
///
/// Both `ClientMetadata` and `ServerMetadata` default to this value. Peers may
/// inspect it to reject envelopes produced by an incompatible revision.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

// Names under which the framework registers its own instances.
pub const RPC_CONTAINER_INSTANCE_NAME: &str = "rrpc.server.rpc_container";
