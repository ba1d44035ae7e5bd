// SPDX-License-Identifier: Apache-2.0

//! Database handle and operation dispatch
//!
//! [`Database`] owns one lazily opened connection and routes every operation
//! either through the connection's direct fast path or, when the capability
//! is missing, through the universal prepare/execute/close fallback. The
//! handle never inspects capabilities mid-flight: it reads the snapshot the
//! connection reported when it was handed out.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::driver::error::{DriverError, DriverResult};
use crate::driver::traits::{Connection, Driver, Rows, Statement, Transaction};
use crate::driver::types::{ConnectionCaps, ExecResult, NamedValue, Row, RowsCaps, Value};
use crate::event::LogSink;
use crate::options::{build_options, OptionStep};
use crate::proxy::LoggedDriver;

/// Wraps a driver in the logging layer and returns a ready [`Database`].
///
/// Construction never fails. The first connection is opened on first use;
/// if that open fails, the failure is reported as a `Connect` event and
/// returned from the operation that triggered it.
pub fn open_driver<D, S>(
    dsn: impl Into<String>,
    driver: D,
    sink: S,
    options: Vec<OptionStep>,
) -> Database
where
    D: Driver + 'static,
    S: LogSink + 'static,
{
    let options = build_options(options);
    let logged = LoggedDriver::new(Arc::new(driver), Arc::new(sink), options);
    Database::new(dsn, Arc::new(logged))
}

/// A handle over one driver connection.
///
/// The connection is opened on first use and cached; operations serialize on
/// it. An operation that fails with [`DriverError::BadConnection`] discards
/// the cached connection, so the next operation reconnects.
pub struct Database {
    driver: Arc<dyn Driver>,
    dsn: String,
    conn: Mutex<Option<Box<dyn Connection>>>,
}

impl Database {
    pub fn new(dsn: impl Into<String>, driver: Arc<dyn Driver>) -> Self {
        Self {
            driver,
            dsn: dsn.into(),
            conn: Mutex::new(None),
        }
    }

    /// Verifies the database is reachable.
    ///
    /// Drivers without a native ping succeed here: holding a usable
    /// connection is the health signal.
    pub async fn ping(&self) -> DriverResult<()> {
        let mut slot = self.conn.lock().await;
        let mut conn = self.checkout(&mut slot).await?;
        let result = if conn.capabilities().ping {
            conn.ping().await
        } else {
            Ok(())
        };
        restore(&mut slot, conn, result.as_ref().err());
        result
    }

    /// Executes a statement that returns no rows, with positional arguments.
    pub async fn execute(&self, query: &str, args: &[Value]) -> DriverResult<ExecResult> {
        self.execute_named(query, &positional_args(args)).await
    }

    /// Executes a statement that returns no rows.
    ///
    /// Named arguments are rejected up front when the connection does not
    /// support them; the driver is never asked.
    pub async fn execute_named(
        &self,
        query: &str,
        args: &[NamedValue],
    ) -> DriverResult<ExecResult> {
        let mut slot = self.conn.lock().await;
        let mut conn = self.checkout(&mut slot).await?;
        let result = dispatch_execute(conn.as_mut(), query, args).await;
        restore(&mut slot, conn, result.as_ref().err());
        result
    }

    /// Runs a query with positional arguments.
    pub async fn query(&self, query: &str, args: &[Value]) -> DriverResult<Box<dyn Rows>> {
        self.query_named(query, &positional_args(args)).await
    }

    /// Runs a query.
    pub async fn query_named(
        &self,
        query: &str,
        args: &[NamedValue],
    ) -> DriverResult<Box<dyn Rows>> {
        let mut slot = self.conn.lock().await;
        let mut conn = self.checkout(&mut slot).await?;
        let result = dispatch_query(conn.as_mut(), query, args).await;
        restore(&mut slot, conn, result.as_ref().err());
        result
    }

    /// Prepares a statement for repeated execution.
    pub async fn prepare(&self, query: &str) -> DriverResult<Box<dyn Statement>> {
        let mut slot = self.conn.lock().await;
        let mut conn = self.checkout(&mut slot).await?;
        let result = conn.prepare(query).await;
        restore(&mut slot, conn, result.as_ref().err());
        result
    }

    /// Starts a transaction.
    pub async fn begin(&self) -> DriverResult<Box<dyn Transaction>> {
        let mut slot = self.conn.lock().await;
        let mut conn = self.checkout(&mut slot).await?;
        let result = conn.begin().await;
        restore(&mut slot, conn, result.as_ref().err());
        result
    }

    /// Closes the cached connection, if any. Closing twice is a no-op.
    pub async fn close(&self) -> DriverResult<()> {
        let mut slot = self.conn.lock().await;
        match slot.take() {
            Some(mut conn) => conn.close().await,
            None => Ok(()),
        }
    }

    async fn checkout(
        &self,
        slot: &mut Option<Box<dyn Connection>>,
    ) -> DriverResult<Box<dyn Connection>> {
        match slot.take() {
            Some(conn) => Ok(conn),
            None => self.driver.open(&self.dsn).await,
        }
    }
}

/// Returns the connection to the slot, unless the operation reported the
/// connection itself as broken.
fn restore(
    slot: &mut Option<Box<dyn Connection>>,
    conn: Box<dyn Connection>,
    error: Option<&DriverError>,
) {
    if matches!(error, Some(err) if err.is_bad_connection()) {
        debug!(target: "sqltap", "discarding connection after a bad connection error");
        drop(conn);
    } else {
        *slot = Some(conn);
    }
}

fn positional_args(args: &[Value]) -> Vec<NamedValue> {
    args.iter()
        .enumerate()
        .map(|(i, value)| NamedValue::positional(i + 1, value.clone()))
        .collect()
}

fn check_named_args(caps: ConnectionCaps, args: &[NamedValue]) -> DriverResult<()> {
    if !caps.named_args && args.iter().any(|arg| arg.name.is_some()) {
        return Err(DriverError::not_supported("named arguments"));
    }
    Ok(())
}

async fn dispatch_execute(
    conn: &mut dyn Connection,
    query: &str,
    args: &[NamedValue],
) -> DriverResult<ExecResult> {
    let caps = conn.capabilities();
    check_named_args(caps, args)?;
    if caps.execute {
        conn.execute(query, args).await
    } else {
        execute_via_statement(conn, query, args).await
    }
}

async fn dispatch_query(
    conn: &mut dyn Connection,
    query: &str,
    args: &[NamedValue],
) -> DriverResult<Box<dyn Rows>> {
    let caps = conn.capabilities();
    check_named_args(caps, args)?;
    if caps.query {
        conn.query(query, args).await
    } else {
        query_via_statement(conn, query, args).await
    }
}

async fn execute_via_statement(
    conn: &mut dyn Connection,
    query: &str,
    args: &[NamedValue],
) -> DriverResult<ExecResult> {
    let mut stmt = conn.prepare(query).await?;
    let result = stmt.execute(args).await;
    if let Err(close_err) = stmt.close().await {
        debug!(target: "sqltap", error = %close_err, "statement close failed after dispatch");
    }
    result
}

async fn query_via_statement(
    conn: &mut dyn Connection,
    query: &str,
    args: &[NamedValue],
) -> DriverResult<Box<dyn Rows>> {
    let mut stmt = conn.prepare(query).await?;
    match stmt.query(args).await {
        Ok(rows) => Ok(Box::new(StatementRows { rows, stmt: Some(stmt) })),
        Err(err) => {
            if let Err(close_err) = stmt.close().await {
                debug!(target: "sqltap", error = %close_err, "statement close failed after dispatch");
            }
            Err(err)
        }
    }
}

/// Keeps the backing statement alive until the cursor is closed.
struct StatementRows {
    rows: Box<dyn Rows>,
    stmt: Option<Box<dyn Statement>>,
}

#[async_trait::async_trait]
impl Rows for StatementRows {
    fn capabilities(&self) -> RowsCaps {
        self.rows.capabilities()
    }

    fn columns(&self) -> Vec<String> {
        self.rows.columns()
    }

    fn column_type_name(&self, index: usize) -> Option<String> {
        self.rows.column_type_name(index)
    }

    async fn next(&mut self) -> DriverResult<Option<Row>> {
        self.rows.next().await
    }

    async fn close(&mut self) -> DriverResult<()> {
        let result = self.rows.close().await;
        if let Some(mut stmt) = self.stmt.take() {
            if let Err(close_err) = stmt.close().await {
                debug!(target: "sqltap", error = %close_err, "statement close failed after cursor close");
            }
        }
        result
    }
}
