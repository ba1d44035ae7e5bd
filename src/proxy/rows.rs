// SPDX-License-Identifier: Apache-2.0

//! Result-set proxy

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::driver::error::DriverResult;
use crate::driver::traits::Rows;
use crate::driver::types::{Row, RowsCaps};
use crate::event::{Emitter, Field};
use crate::level::Level;

use super::outcome_level;

/// Wraps a [`Rows`] cursor. The statement id is present only for cursors
/// produced through a prepared statement.
pub(crate) struct LoggedRows {
    inner: Box<dyn Rows>,
    caps: RowsCaps,
    conn_id: Arc<str>,
    stmt_id: Option<Arc<str>>,
    emitter: Emitter,
}

impl LoggedRows {
    pub(crate) fn new(
        inner: Box<dyn Rows>,
        caps: RowsCaps,
        conn_id: Arc<str>,
        stmt_id: Option<Arc<str>>,
        emitter: Emitter,
    ) -> Self {
        Self { inner, caps, conn_id, stmt_id, emitter }
    }

    fn id_fields(&self) -> Vec<Field<'_>> {
        let mut fields = vec![Field::ConnId(&self.conn_id)];
        if let Some(stmt_id) = &self.stmt_id {
            fields.push(Field::StmtId(stmt_id));
        }
        fields
    }
}

#[async_trait]
impl Rows for LoggedRows {
    fn capabilities(&self) -> RowsCaps {
        self.caps
    }

    fn columns(&self) -> Vec<String> {
        self.inner.columns()
    }

    fn column_type_name(&self, index: usize) -> Option<String> {
        if self.caps.column_types {
            self.inner.column_type_name(index)
        } else {
            None
        }
    }

    async fn next(&mut self) -> DriverResult<Option<Row>> {
        let start = Instant::now();
        // End of iteration comes back as Ok(None) and is a success, not an
        // error to report.
        let result = self.inner.next().await;
        self.emitter.emit(
            outcome_level(Level::Debug, result.as_ref().err()),
            "RowsNext",
            start,
            result.as_ref().err(),
            &self.id_fields(),
        );
        result
    }

    async fn close(&mut self) -> DriverResult<()> {
        let start = Instant::now();
        let result = self.inner.close().await;
        self.emitter.emit(
            outcome_level(Level::Debug, result.as_ref().err()),
            "RowsClose",
            start,
            result.as_ref().err(),
            &self.id_fields(),
        );
        result
    }
}
