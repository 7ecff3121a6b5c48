mod rpc_kind;
mod rpc_procedure;

pub use rpc_kind::RpcKind;
pub use rpc_procedure::RpcProcedure;
