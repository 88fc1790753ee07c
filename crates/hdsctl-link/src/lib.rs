//! HDS instrument link and cached executor
//!
//! This crate owns everything between a parsed [`Request`](hdsctl_scpi::Request)
//! and the bytes on the wire:
//!
//! - [`DeviceLink`]: the byte-oriented bulk-transfer link (write N bytes, read a
//!   variable-length response)
//! - [`CachedExecutor`]: serializes access to the link, spaces physical transfers
//!   by a minimum interval, caches query results for a short window and checks
//!   the instrument identity at startup
//! - [`decode_status_block`]: turns the structured status block returned by the
//!   screen-head query into cache entries, so one round trip warms many fields
//! - [`SimulatedScope`]: an in-memory instrument implementing [`DeviceLink`]
//!
//! # Example
//!
//! ```rust
//! use hdsctl_link::{CachedExecutor, Executor, ExecutorConfig, SimulatedScope};
//! use hdsctl_scpi::{hds_catalog, Request};
//!
//! let catalog = hds_catalog().unwrap();
//! let executor = CachedExecutor::connect(SimulatedScope::new(), ExecutorConfig::default()).unwrap();
//!
//! let query = catalog.parse(":CH1:DISP?").unwrap();
//! let value = executor.execute(&query).unwrap();
//! assert_eq!(value.as_deref(), Some(&b"ON"[..]));
//! ```

mod cache;
mod config;
mod error;
mod executor;
mod link;
mod sim;
mod status;
mod throttle;

pub use cache::*;
pub use config::*;
pub use error::*;
pub use executor::*;
pub use link::*;
pub use sim::*;
pub use status::*;
pub use throttle::*;
