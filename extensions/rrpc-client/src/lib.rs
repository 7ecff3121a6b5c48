mod client;
pub use client::*;

mod client_module;
pub use client_module::*;

mod engine;
pub use engine::*;

mod procedure_call;
pub use procedure_call::*;
