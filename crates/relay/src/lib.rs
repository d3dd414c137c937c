// roomwatch-relay: per-room presence tracking served over HTTP.

pub mod api;
pub mod config;
pub mod cors;
pub mod error;
pub mod presence;
pub mod request_id;
