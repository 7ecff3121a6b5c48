use std::fmt;

/// The five interaction shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcKind {
    RequestResponse,
    RequestStream,
    RequestChannel,
    FireAndForget,
    MetadataPush,
}

impl RpcKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RpcKind::RequestResponse => "request-response",
            RpcKind::RequestStream => "request-stream",
            RpcKind::RequestChannel => "request-channel",
            RpcKind::FireAndForget => "fire-and-forget",
            RpcKind::MetadataPush => "metadata-push",
        }
    }
}

impl fmt::Display for RpcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
