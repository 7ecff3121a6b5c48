mod chat;
mod log;
mod ping;
mod repeat;
mod say;

pub use chat::Chat;
pub use log::Log;
pub use ping::Ping;
pub use repeat::{Repeat, RepeatRequest};
pub use say::Say;

use rrpc::OptionKey;
use std::io;

pub const SERVICE_NAME: &str = "Echo";

/// Marks procedures that are safe to retry.
pub const IDEMPOTENT: OptionKey<bool> = OptionKey::rpc("idempotent", 34_000);

fn invalid_data(e: bitcode::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}
