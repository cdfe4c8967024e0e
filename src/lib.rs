//! Grid Command Dispatch
//!
//! Resolves a clicked grid item to its bound command and sends it,
//! fire-and-forget, to a UDP control listener.

pub mod config;
pub mod dispatch;
pub mod driver;
pub mod request;
pub mod store;
pub mod transport;

pub use grid_dispatch_shared as shared;
