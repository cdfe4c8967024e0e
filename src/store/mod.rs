//! Grid item storage
//!
//! This module handles:
//! - The lookup contract the dispatcher resolves commands through
//! - An in-memory store used by the click driver and tests

mod memory;
mod traits;

pub use memory::InMemoryGridStore;
pub use traits::{GridItemStore, StoreError};
