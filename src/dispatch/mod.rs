//! Grid click dispatch
//!
//! This module handles:
//! - Resolving a clicked grid item to its bound command
//! - Sending the command to the configured control listener
//! - Folding not-found and transport failures into a click result
//! - Propagating storage failures and caller cancellation as errors

mod coordinator;

pub use coordinator::{DispatchCoordinator, DispatchError};
