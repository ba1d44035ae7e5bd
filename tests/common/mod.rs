//! Shared test doubles: an in-memory sink and a scriptable mock driver.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use sqltap::{
    Connection, ConnectionCaps, Driver, DriverError, DriverResult, Event, ExecResult, LogSink,
    NamedValue, Row, Rows, RowsCaps, Statement, Transaction,
};

/// Sink that keeps every event in memory for assertions.
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { events: Mutex::new(Vec::new()) })
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.message.clone()).collect()
    }

    pub fn find(&self, message: &str) -> Option<Event> {
        self.events.lock().iter().find(|e| e.message == message).cloned()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn log(&self, event: &Event) {
        self.events.lock().push(event.clone());
    }
}

/// Scriptable driver. Clones share the call journal and open counter, so a
/// test can keep one clone for assertions and hand the other to the wrapper.
#[derive(Clone)]
pub struct MockDriver {
    caps: ConnectionCaps,
    rows_caps: RowsCaps,
    fail_open: bool,
    fail_execute: bool,
    columns: Vec<String>,
    rows: Vec<Row>,
    opens: Arc<AtomicUsize>,
    journal: Arc<Mutex<Vec<String>>>,
}

impl MockDriver {
    /// A driver whose connections support every optional path.
    pub fn new() -> Self {
        Self::with_caps(ConnectionCaps {
            ping: true,
            execute: true,
            query: true,
            named_args: true,
        })
    }

    /// A driver whose connections only offer the mandatory surface.
    pub fn baseline() -> Self {
        Self::with_caps(ConnectionCaps::default())
    }

    fn with_caps(caps: ConnectionCaps) -> Self {
        Self {
            caps,
            rows_caps: RowsCaps::default(),
            fail_open: false,
            fail_execute: false,
            columns: Vec::new(),
            rows: Vec::new(),
            opens: Arc::new(AtomicUsize::new(0)),
            journal: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn fail_execute(mut self) -> Self {
        self.fail_execute = true;
        self
    }

    pub fn with_rows(mut self, columns: Vec<String>, rows: Vec<Row>) -> Self {
        self.columns = columns;
        self.rows = rows;
        self
    }

    pub fn with_rows_caps(mut self, caps: RowsCaps) -> Self {
        self.rows_caps = caps;
        self
    }

    /// Every call the driver actually received, in order.
    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().clone()
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn open(&self, _dsn: &str) -> DriverResult<Box<dyn Connection>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.journal.lock().push("open".to_string());
        if self.fail_open {
            return Err(DriverError::BadConnection);
        }
        Ok(Box::new(MockConnection {
            caps: self.caps,
            rows_caps: self.rows_caps,
            fail_execute: self.fail_execute,
            columns: self.columns.clone(),
            rows: self.rows.clone(),
            journal: self.journal.clone(),
        }))
    }
}

struct MockConnection {
    caps: ConnectionCaps,
    rows_caps: RowsCaps,
    fail_execute: bool,
    columns: Vec<String>,
    rows: Vec<Row>,
    journal: Arc<Mutex<Vec<String>>>,
}

impl MockConnection {
    fn rows(&self) -> MockRows {
        MockRows {
            caps: self.rows_caps,
            columns: self.columns.clone(),
            remaining: self.rows.clone(),
            journal: self.journal.clone(),
        }
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn capabilities(&self) -> ConnectionCaps {
        self.caps
    }

    async fn prepare(&mut self, query: &str) -> DriverResult<Box<dyn Statement>> {
        self.journal.lock().push(format!("prepare {query}"));
        Ok(Box::new(MockStatement {
            fail_execute: self.fail_execute,
            rows: self.rows(),
            journal: self.journal.clone(),
        }))
    }

    async fn begin(&mut self) -> DriverResult<Box<dyn Transaction>> {
        self.journal.lock().push("begin".to_string());
        Ok(Box::new(MockTransaction { journal: self.journal.clone() }))
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.journal.lock().push("conn_close".to_string());
        Ok(())
    }

    async fn ping(&mut self) -> DriverResult<()> {
        self.journal.lock().push("ping".to_string());
        Ok(())
    }

    async fn execute(&mut self, query: &str, _args: &[NamedValue]) -> DriverResult<ExecResult> {
        self.journal.lock().push(format!("execute {query}"));
        if self.fail_execute {
            return Err(DriverError::execution("table is locked"));
        }
        Ok(ExecResult { rows_affected: 1, last_insert_id: Some(1) })
    }

    async fn query(&mut self, query: &str, _args: &[NamedValue]) -> DriverResult<Box<dyn Rows>> {
        self.journal.lock().push(format!("query {query}"));
        Ok(Box::new(self.rows()))
    }
}

struct MockStatement {
    fail_execute: bool,
    rows: MockRows,
    journal: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Statement for MockStatement {
    async fn execute(&mut self, _args: &[NamedValue]) -> DriverResult<ExecResult> {
        self.journal.lock().push("stmt_execute".to_string());
        if self.fail_execute {
            return Err(DriverError::execution("table is locked"));
        }
        Ok(ExecResult { rows_affected: 1, last_insert_id: Some(1) })
    }

    async fn query(&mut self, _args: &[NamedValue]) -> DriverResult<Box<dyn Rows>> {
        self.journal.lock().push("stmt_query".to_string());
        Ok(Box::new(self.rows.clone()))
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.journal.lock().push("stmt_close".to_string());
        Ok(())
    }
}

struct MockTransaction {
    journal: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Transaction for MockTransaction {
    async fn commit(self: Box<Self>) -> DriverResult<()> {
        self.journal.lock().push("commit".to_string());
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DriverResult<()> {
        self.journal.lock().push("rollback".to_string());
        Ok(())
    }
}

#[derive(Clone)]
struct MockRows {
    caps: RowsCaps,
    columns: Vec<String>,
    remaining: Vec<Row>,
    journal: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Rows for MockRows {
    fn capabilities(&self) -> RowsCaps {
        self.caps
    }

    fn columns(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn column_type_name(&self, _index: usize) -> Option<String> {
        Some("TEXT".to_string())
    }

    async fn next(&mut self) -> DriverResult<Option<Row>> {
        self.journal.lock().push("rows_next".to_string());
        if self.remaining.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.remaining.remove(0)))
        }
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.journal.lock().push("rows_close".to_string());
        Ok(())
    }
}
