pub mod constants;

mod data_variant;
pub use data_variant::*;

pub mod error;
pub use error::{ProtocolViolation, RpcError};

mod instances;
pub use instances::*;

mod interceptors;
pub use interceptors::*;

mod macros;
pub use macros::*;

mod metadata;
pub use metadata::*;

mod options;
pub use options::*;

mod procedure;
pub use procedure::*;

mod transport;
pub use transport::*;
