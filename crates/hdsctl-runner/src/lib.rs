//! HDS instrument runner
//!
//! The pieces behind the `hdsctl` binary:
//!
//! - [`Instrument`]: command, script and field access over a catalog and an executor
//! - [`DiffStreamer`]: per-subscriber polling that yields only changed fields
//! - [`PushServer`]: newline-delimited JSON stream server for live viewers
//! - [`ApiServer`]: `GET /api/<fieldId>` over HTTP
//! - [`HdsctlConfig`]: YAML configuration

pub mod api_server;
mod config;
mod error;
mod instrument;
pub mod push_server;
pub mod streamer;

pub use api_server::{api_router, ApiServer};
pub use config::*;
pub use error::*;
pub use instrument::*;
pub use push_server::{handle_session, PushServer};
pub use streamer::{compute_delta, handle_inbound, poll_snapshot, DiffStreamer, FieldValue, Snapshot};
