// Driver Module
// Capability-based abstraction over database backends

pub mod error;
pub mod traits;
pub mod types;

pub use error::{DriverError, DriverResult};
pub use traits::{Connection, Driver, Rows, Statement, Transaction};
pub use types::*;
