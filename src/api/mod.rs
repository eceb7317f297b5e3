//! HTTP surface: Slack webhook verification, dispatch and routing

pub mod debug;
pub mod dedup;
pub mod handler;
pub mod helpers;
pub mod parsing;
pub mod retry;
pub mod server;
pub mod signature;

// Re-export the main entry points for convenience
pub use handler::{WebhookDispatcher, WebhookOutcome, events_handler};
pub use server::{AppState, build_router};
