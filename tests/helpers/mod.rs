//! Test helpers module
//!
//! In-memory collaborators, data builders, a unified test context and a
//! mock flight inventory API.

#![allow(dead_code)]

pub mod fakes;
pub mod inventory_mock;
pub mod test_context;
pub mod test_data;

pub use fakes::*;
pub use inventory_mock::*;
pub use test_context::*;
pub use test_data::*;
