//! Connection proxy

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::driver::error::{DriverError, DriverResult};
use crate::driver::traits::{Connection, Rows, Statement, Transaction};
use crate::driver::types::{ConnectionCaps, ExecResult, NamedValue};
use crate::event::{Emitter, Field};
use crate::level::Level;

use super::outcome_level;
use super::rows::LoggedRows;
use super::statement::LoggedStatement;
use super::transaction::LoggedTransaction;

/// Wraps a [`Connection`], reporting every call against it.
///
/// The wrapped connection's capabilities are snapshotted when the proxy is
/// built; unsupported optional paths are refused here without touching the
/// wrapped object.
pub(crate) struct LoggedConnection {
    inner: Box<dyn Connection>,
    caps: ConnectionCaps,
    conn_id: Arc<str>,
    emitter: Emitter,
}

impl LoggedConnection {
    pub(crate) fn new(
        inner: Box<dyn Connection>,
        caps: ConnectionCaps,
        conn_id: Arc<str>,
        emitter: Emitter,
    ) -> Self {
        Self { inner, caps, conn_id, emitter }
    }
}

#[async_trait]
impl Connection for LoggedConnection {
    fn capabilities(&self) -> ConnectionCaps {
        self.caps
    }

    async fn prepare(&mut self, query: &str) -> DriverResult<Box<dyn Statement>> {
        let start = Instant::now();
        let stmt_id = self.emitter.options().next_uid();
        let result = self.inner.prepare(query).await;
        self.emitter.emit(
            outcome_level(self.emitter.options().preparer_level, result.as_ref().err()),
            "Prepare",
            start,
            result.as_ref().err(),
            &[
                Field::Query(query),
                Field::ConnId(&self.conn_id),
                Field::StmtId(&stmt_id),
            ],
        );

        let inner = result?;
        Ok(Box::new(LoggedStatement::new(
            inner,
            query.to_string(),
            self.conn_id.clone(),
            Arc::from(stmt_id),
            self.emitter.clone(),
        )))
    }

    async fn begin(&mut self) -> DriverResult<Box<dyn Transaction>> {
        let start = Instant::now();
        let tx_id = self.emitter.options().next_uid();
        let result = self.inner.begin().await;
        self.emitter.emit(
            outcome_level(Level::Debug, result.as_ref().err()),
            "Begin",
            start,
            result.as_ref().err(),
            &[Field::ConnId(&self.conn_id), Field::TxId(&tx_id)],
        );

        let inner = result?;
        Ok(Box::new(LoggedTransaction::new(
            inner,
            self.conn_id.clone(),
            Arc::from(tx_id),
            self.emitter.clone(),
        )))
    }

    async fn close(&mut self) -> DriverResult<()> {
        let start = Instant::now();
        let result = self.inner.close().await;
        self.emitter.emit(
            outcome_level(Level::Debug, result.as_ref().err()),
            "ConnClose",
            start,
            result.as_ref().err(),
            &[Field::ConnId(&self.conn_id)],
        );
        result
    }

    async fn ping(&mut self) -> DriverResult<()> {
        let start = Instant::now();
        let result = if self.caps.ping {
            self.inner.ping().await
        } else {
            Err(DriverError::not_supported("ping"))
        };
        self.emitter.emit(
            outcome_level(Level::Debug, result.as_ref().err()),
            "Ping",
            start,
            result.as_ref().err(),
            &[Field::ConnId(&self.conn_id)],
        );
        result
    }

    async fn execute(&mut self, query: &str, args: &[NamedValue]) -> DriverResult<ExecResult> {
        let start = Instant::now();
        let result = if self.caps.execute {
            self.inner.execute(query, args).await
        } else {
            Err(DriverError::not_supported("execute"))
        };
        self.emitter.emit(
            outcome_level(self.emitter.options().execer_level, result.as_ref().err()),
            "Exec",
            start,
            result.as_ref().err(),
            &[
                Field::Query(query),
                Field::Args(args),
                Field::ConnId(&self.conn_id),
            ],
        );
        result
    }

    async fn query(&mut self, query: &str, args: &[NamedValue]) -> DriverResult<Box<dyn Rows>> {
        let start = Instant::now();
        let result = if self.caps.query {
            self.inner.query(query, args).await
        } else {
            Err(DriverError::not_supported("query"))
        };
        self.emitter.emit(
            outcome_level(self.emitter.options().queryer_level, result.as_ref().err()),
            "Query",
            start,
            result.as_ref().err(),
            &[
                Field::Query(query),
                Field::Args(args),
                Field::ConnId(&self.conn_id),
            ],
        );

        let inner = result?;
        let caps = inner.capabilities();
        Ok(Box::new(LoggedRows::new(
            inner,
            caps,
            self.conn_id.clone(),
            None,
            self.emitter.clone(),
        )))
    }
}
