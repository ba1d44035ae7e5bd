//! Driver capability traits
//!
//! The core abstraction every database backend implements. A driver only has
//! to provide the mandatory surface (open, prepare, transactions, row
//! iteration); optional fast paths (ping, direct execute, direct query,
//! named arguments) are advertised through capability flags and refused by
//! default.

use async_trait::async_trait;

use crate::driver::error::{DriverError, DriverResult};
use crate::driver::types::{ConnectionCaps, ExecResult, NamedValue, Row, RowsCaps};

/// Entry point a database backend implements to hand out connections.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Opens a new connection to the database described by `dsn`.
    async fn open(&self, dsn: &str) -> DriverResult<Box<dyn Connection>>;
}

/// A single database connection.
///
/// `prepare`, `begin` and `close` are mandatory. The direct paths are
/// optional: a connection that supports one reports it in `capabilities()`
/// and overrides the method; the defaults refuse with
/// [`DriverError::NotSupported`].
#[async_trait]
pub trait Connection: Send {
    /// Reports which optional paths this connection supports.
    ///
    /// Consulted once when the connection is handed out; the answer must not
    /// change over the connection's lifetime.
    fn capabilities(&self) -> ConnectionCaps {
        ConnectionCaps::default()
    }

    /// Prepares a statement for later execution.
    async fn prepare(&mut self, query: &str) -> DriverResult<Box<dyn Statement>>;

    /// Starts a transaction.
    async fn begin(&mut self) -> DriverResult<Box<dyn Transaction>>;

    /// Closes the connection and releases its resources.
    async fn close(&mut self) -> DriverResult<()>;

    /// Verifies the connection is still alive.
    async fn ping(&mut self) -> DriverResult<()> {
        Err(DriverError::not_supported("ping"))
    }

    /// Executes a statement without a separate prepare round-trip.
    async fn execute(&mut self, query: &str, args: &[NamedValue]) -> DriverResult<ExecResult> {
        let _ = (query, args);
        Err(DriverError::not_supported("execute"))
    }

    /// Runs a query without a separate prepare round-trip.
    async fn query(&mut self, query: &str, args: &[NamedValue]) -> DriverResult<Box<dyn Rows>> {
        let _ = (query, args);
        Err(DriverError::not_supported("query"))
    }
}

/// A prepared statement.
#[async_trait]
pub trait Statement: Send {
    /// Number of parameter placeholders, if the driver knows it.
    fn num_params(&self) -> Option<usize> {
        None
    }

    /// Executes the statement.
    async fn execute(&mut self, args: &[NamedValue]) -> DriverResult<ExecResult>;

    /// Runs the statement as a query.
    async fn query(&mut self, args: &[NamedValue]) -> DriverResult<Box<dyn Rows>>;

    /// Closes the statement.
    async fn close(&mut self) -> DriverResult<()>;
}

/// An open transaction. Committing or rolling back consumes it.
#[async_trait]
pub trait Transaction: Send {
    async fn commit(self: Box<Self>) -> DriverResult<()>;

    async fn rollback(self: Box<Self>) -> DriverResult<()>;
}

/// A streaming result set.
#[async_trait]
pub trait Rows: Send {
    /// Reports which optional row-metadata paths are supported.
    fn capabilities(&self) -> RowsCaps {
        RowsCaps::default()
    }

    /// Column names, in result order.
    fn columns(&self) -> Vec<String>;

    /// Database-specific type name for a column, when the driver exposes it.
    fn column_type_name(&self, index: usize) -> Option<String> {
        let _ = index;
        None
    }

    /// Fetches the next row; `Ok(None)` means the set is exhausted.
    async fn next(&mut self) -> DriverResult<Option<Row>>;

    /// Releases the result set.
    async fn close(&mut self) -> DriverResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BaselineConnection;

    #[async_trait]
    impl Connection for BaselineConnection {
        async fn prepare(&mut self, _query: &str) -> DriverResult<Box<dyn Statement>> {
            Err(DriverError::execution("not under test"))
        }

        async fn begin(&mut self) -> DriverResult<Box<dyn Transaction>> {
            Err(DriverError::execution("not under test"))
        }

        async fn close(&mut self) -> DriverResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn optional_paths_refuse_by_default() {
        let mut conn = BaselineConnection;
        assert!(!conn.capabilities().execute);

        let err = conn.ping().await.expect_err("ping should be refused");
        assert!(err.is_not_supported());

        let err = conn
            .execute("SELECT 1", &[])
            .await
            .expect_err("execute should be refused");
        assert!(err.is_not_supported());

        let Err(err) = conn.query("SELECT 1", &[]).await else {
            panic!("query should be refused");
        };
        assert!(err.is_not_supported());
    }
}
