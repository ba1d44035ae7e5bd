//! Transaction proxy

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::driver::error::DriverResult;
use crate::driver::traits::Transaction;
use crate::event::{Emitter, Field};
use crate::level::Level;

use super::outcome_level;

pub(crate) struct LoggedTransaction {
    inner: Box<dyn Transaction>,
    conn_id: Arc<str>,
    tx_id: Arc<str>,
    emitter: Emitter,
}

impl LoggedTransaction {
    pub(crate) fn new(
        inner: Box<dyn Transaction>,
        conn_id: Arc<str>,
        tx_id: Arc<str>,
        emitter: Emitter,
    ) -> Self {
        Self { inner, conn_id, tx_id, emitter }
    }
}

#[async_trait]
impl Transaction for LoggedTransaction {
    async fn commit(self: Box<Self>) -> DriverResult<()> {
        let this = *self;
        let start = Instant::now();
        let result = this.inner.commit().await;
        this.emitter.emit(
            outcome_level(Level::Debug, result.as_ref().err()),
            "Commit",
            start,
            result.as_ref().err(),
            &[Field::ConnId(&this.conn_id), Field::TxId(&this.tx_id)],
        );
        result
    }

    async fn rollback(self: Box<Self>) -> DriverResult<()> {
        let this = *self;
        let start = Instant::now();
        let result = this.inner.rollback().await;
        this.emitter.emit(
            outcome_level(Level::Debug, result.as_ref().err()),
            "Rollback",
            start,
            result.as_ref().err(),
            &[Field::ConnId(&this.conn_id), Field::TxId(&this.tx_id)],
        );
        result
    }
}
