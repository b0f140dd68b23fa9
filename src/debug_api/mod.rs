mod config;
mod server;
mod types;

pub use config::DebugApiConfig;
pub use server::{start_debug_api, DebugApiHandle};
pub use types::{CommandAppliedEvent, CommandKind, CommandRequest, TelemetrySnapshot};
