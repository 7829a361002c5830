//! VARM - digital offer signing against a tabular record store.
//!
//! The core retry/coordination logic lives in `varm-core`; this crate
//! provides the HTTP record-store client, configuration, field mapping,
//! and the CLI surface.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod fields;
pub mod store;

pub use config::StoreConfig;
pub use store::AirtableStore;
