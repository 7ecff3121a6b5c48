mod error;
pub use error::*;

mod request_context;
pub use request_context::*;

mod responder;
pub use responder::*;

mod rpc_container;
pub use rpc_container::*;

mod rpc_definition;
pub use rpc_definition::*;

mod server_module;
pub use server_module::*;
