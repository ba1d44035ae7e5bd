//! Driver registry
//!
//! Process-wide registry for database drivers, so applications can register
//! a wrapped driver once at startup and open handles by name afterwards.
//! Registering the same name twice is refused with an error.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use thiserror::Error;
use tracing::info;

use crate::db::Database;
use crate::driver::traits::Driver;
use crate::event::LogSink;
use crate::options::{build_options, OptionStep};
use crate::proxy::LoggedDriver;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Driver already registered: {name}")]
    DuplicateDriver { name: String },

    #[error("Driver not found: {name}")]
    UnknownDriver { name: String },
}

/// Registry that holds named database drivers.
pub struct DriverRegistry {
    drivers: HashMap<String, Arc<dyn Driver>>,
}

impl DriverRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self {
            drivers: HashMap::new(),
        }
    }

    /// Registers a driver under `name`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        driver: Arc<dyn Driver>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.drivers.contains_key(&name) {
            return Err(RegistryError::DuplicateDriver { name });
        }
        self.drivers.insert(name, driver);
        Ok(())
    }

    /// Gets a driver by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Driver>> {
        self.drivers.get(name).cloned()
    }

    /// Lists all registered driver names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.drivers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static DRIVERS: OnceLock<RwLock<DriverRegistry>> = OnceLock::new();

fn global() -> &'static RwLock<DriverRegistry> {
    DRIVERS.get_or_init(|| RwLock::new(DriverRegistry::new()))
}

/// Registers a driver in the process-wide registry.
pub fn register(name: impl Into<String>, driver: Arc<dyn Driver>) -> Result<(), RegistryError> {
    let name = name.into();
    global().write().register(name.clone(), driver)?;
    info!(target: "sqltap", driver = %name, "registered database driver");
    Ok(())
}

/// Looks up a registered driver by name.
pub fn lookup(name: &str) -> Option<Arc<dyn Driver>> {
    global().read().get(name)
}

/// Lists the names of all registered drivers, sorted.
pub fn registered_drivers() -> Vec<String> {
    global().read().list()
}

/// Opens a [`Database`] over a registered driver, wrapping it with the
/// logging layer exactly like [`crate::open_driver`].
pub fn open_registered<S>(
    name: &str,
    dsn: impl Into<String>,
    sink: S,
    options: Vec<OptionStep>,
) -> Result<Database, RegistryError>
where
    S: LogSink + 'static,
{
    let driver = lookup(name).ok_or_else(|| RegistryError::UnknownDriver {
        name: name.to_string(),
    })?;
    let logged = LoggedDriver::new(driver, Arc::new(sink), build_options(options));
    Ok(Database::new(dsn, Arc::new(logged)))
}
