//! Driver proxy

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::driver::error::DriverResult;
use crate::driver::traits::{Connection, Driver};
use crate::event::{Emitter, Field, LogSink};
use crate::level::Level;
use crate::options::Options;

use super::connection::LoggedConnection;
use super::outcome_level;

/// Wraps a [`Driver`] so every connection it opens, and everything those
/// connections do, is reported to the sink.
pub struct LoggedDriver {
    inner: Arc<dyn Driver>,
    emitter: Emitter,
}

impl LoggedDriver {
    pub fn new(driver: Arc<dyn Driver>, sink: Arc<dyn LogSink>, options: Options) -> Self {
        Self {
            inner: driver,
            emitter: Emitter::new(options, sink),
        }
    }
}

#[async_trait]
impl Driver for LoggedDriver {
    async fn open(&self, dsn: &str) -> DriverResult<Box<dyn Connection>> {
        let start = Instant::now();
        let conn_id = self.emitter.options().next_uid();
        let result = self.inner.open(dsn).await;
        self.emitter.emit(
            outcome_level(Level::Debug, result.as_ref().err()),
            "Connect",
            start,
            result.as_ref().err(),
            &[Field::Dsn(dsn), Field::ConnId(&conn_id)],
        );

        let inner = result?;
        let caps = inner.capabilities();
        Ok(Box::new(LoggedConnection::new(
            inner,
            caps,
            Arc::from(conn_id),
            self.emitter.clone(),
        )))
    }
}
