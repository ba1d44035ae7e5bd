// SPDX-License-Identifier: Apache-2.0

//! Statement proxy

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::driver::error::DriverResult;
use crate::driver::traits::{Rows, Statement};
use crate::driver::types::{ExecResult, NamedValue};
use crate::event::{Emitter, Field};
use crate::level::Level;

use super::outcome_level;
use super::rows::LoggedRows;

/// Wraps a [`Statement`]. Keeps the query text so statement-level events
/// carry it alongside the ids.
pub(crate) struct LoggedStatement {
    inner: Box<dyn Statement>,
    query: String,
    conn_id: Arc<str>,
    stmt_id: Arc<str>,
    emitter: Emitter,
}

impl LoggedStatement {
    pub(crate) fn new(
        inner: Box<dyn Statement>,
        query: String,
        conn_id: Arc<str>,
        stmt_id: Arc<str>,
        emitter: Emitter,
    ) -> Self {
        Self { inner, query, conn_id, stmt_id, emitter }
    }
}

#[async_trait]
impl Statement for LoggedStatement {
    fn num_params(&self) -> Option<usize> {
        self.inner.num_params()
    }

    async fn execute(&mut self, args: &[NamedValue]) -> DriverResult<ExecResult> {
        let start = Instant::now();
        let result = self.inner.execute(args).await;
        self.emitter.emit(
            outcome_level(self.emitter.options().execer_level, result.as_ref().err()),
            "StmtExec",
            start,
            result.as_ref().err(),
            &[
                Field::Query(&self.query),
                Field::Args(args),
                Field::ConnId(&self.conn_id),
                Field::StmtId(&self.stmt_id),
            ],
        );
        result
    }

    async fn query(&mut self, args: &[NamedValue]) -> DriverResult<Box<dyn Rows>> {
        let start = Instant::now();
        let result = self.inner.query(args).await;
        self.emitter.emit(
            outcome_level(self.emitter.options().queryer_level, result.as_ref().err()),
            "StmtQuery",
            start,
            result.as_ref().err(),
            &[
                Field::Query(&self.query),
                Field::Args(args),
                Field::ConnId(&self.conn_id),
                Field::StmtId(&self.stmt_id),
            ],
        );

        let inner = result?;
        let caps = inner.capabilities();
        Ok(Box::new(LoggedRows::new(
            inner,
            caps,
            self.conn_id.clone(),
            Some(self.stmt_id.clone()),
            self.emitter.clone(),
        )))
    }

    async fn close(&mut self) -> DriverResult<()> {
        let start = Instant::now();
        let result = self.inner.close().await;
        self.emitter.emit(
            outcome_level(Level::Debug, result.as_ref().err()),
            "StmtClose",
            start,
            result.as_ref().err(),
            &[Field::ConnId(&self.conn_id), Field::StmtId(&self.stmt_id)],
        );
        result
    }
}
