//! ytincome library
//!
//! Estimates a YouTube channel's advertising revenue from public statistics.
//! Modules are exposed for the binary and for integration tests.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod estimator;
pub mod income;
pub mod resolver;
pub mod server;

pub use error::{Error, ErrorKind, Result};
