//! HDS SCPI command catalog
//!
//! This crate describes every parameter an HDS2000-series handheld instrument
//! (oscilloscope, function generator and multimeter in one box) exposes over its
//! textual SCPI interface, and turns free-text command lines into structured
//! [`Request`]s validated against that description.
//!
//! # Protocol Overview
//!
//! Each parameter is addressed by a colon-delimited mnemonic path such as
//! `:CH1:DISPlay`. The uppercase letters of the path form the abbreviated command
//! (`:CH1:DISP`) the instrument also accepts.
//!
//! - **Queries**: the path followed by the query marker, e.g. `:CH1:DISP?`
//! - **Sets**: the path, a single space and the value, e.g. `:CH1:DISP ON`
//! - **Scripts**: several commands separated by `;` or newlines
//!
//! # Example
//!
//! ```rust
//! use hdsctl_scpi::{hds_catalog, AccessMode};
//!
//! let catalog = hds_catalog().unwrap();
//! let request = catalog.parse(":CH1:DISP ON").unwrap();
//! assert_eq!(request.definition.path, ":CH1:DISPlay");
//! assert_eq!(request.definition.id, "ch1Disp");
//! assert_eq!(request.definition.mode, AccessMode::ReadWrite);
//! assert_eq!(request.arguments, vec!["ON".to_string()]);
//! ```

mod catalog;
mod error;
mod field;
mod hds;
mod ids;
mod request;

pub use catalog::*;
pub use error::*;
pub use field::*;
pub use hds::*;
pub use ids::*;
pub use request::*;
