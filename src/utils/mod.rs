//! Utility modules

pub mod dates;
pub mod memory_storage;
pub mod validation;

pub use dates::*;
pub use memory_storage::*;
pub use validation::*;
