use crate::RpcClientEngine;

/// Implemented by hand-written service clients.
///
/// A service client wraps an engine and exposes one typed method per
/// procedure, usually by delegating to `RpcProcedureCall`.
///
/// ```rust,ignore
/// struct EchoClient {
///     engine: RpcClientEngine,
/// }
///
/// impl RpcClient for EchoClient {
///     fn from_engine(engine: RpcClientEngine) -> Self {
///         Self { engine }
///     }
///
///     fn engine(&self) -> &RpcClientEngine {
///         &self.engine
///     }
/// }
///
/// impl EchoClient {
///     async fn say(&self, text: String) -> Result<String, RpcError> {
///         Say::call(self.engine(), text).await
///     }
/// }
/// ```
pub trait RpcClient: Sized {
    fn from_engine(engine: RpcClientEngine) -> Self;

    fn engine(&self) -> &RpcClientEngine;
}
