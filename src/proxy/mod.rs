//! Capability proxies
//!
//! One wrapper per driver surface. Every proxied method delegates to the
//! wrapped object with unmodified arguments, measures the call, emits one
//! event, and returns the real result untouched. Optional capabilities are
//! snapshotted once at wrap time, so a proxy never claims a capability the
//! wrapped object lacks.

mod connection;
mod driver;
mod rows;
mod statement;
mod transaction;

pub use driver::LoggedDriver;

use crate::driver::error::DriverError;
use crate::level::Level;

/// Level for a finished call: the baseline on success, `Error` on failure.
pub(crate) fn outcome_level(baseline: Level, error: Option<&DriverError>) -> Level {
    if error.is_some() {
        Level::Error
    } else {
        baseline
    }
}
