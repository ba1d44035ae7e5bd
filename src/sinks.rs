//! Provided sink adapters
//!
//! The log stream is best-effort by contract: every adapter here swallows
//! its own failures so the database call that produced an event never sees
//! them.

use std::io::Write;

use parking_lot::Mutex;
use tracing::debug;

use crate::event::{Event, LogSink};
use crate::level::Level;

/// Writes one JSON line per event to any [`Write`] destination.
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: Mutex::new(writer) }
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn log(&self, event: &Event) {
        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                debug!("Failed to serialize log event: {}", e);
                return;
            }
        };

        let mut writer = self.writer.lock();
        if let Err(e) = writeln!(writer, "{}", json) {
            debug!("Failed to write log event: {}", e);
        }
    }
}

/// Forwards events into the `tracing` ecosystem at the matching level.
///
/// The field map is rendered as one JSON value because `tracing` fields are
/// compile-time names.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, event: &Event) {
        let data = serde_json::to_string(&event.data).unwrap_or_else(|_| "{}".to_string());
        match event.level {
            Level::Debug => tracing::debug!(target: "sqltap", data = %data, "{}", event.message),
            Level::Info => tracing::info!(target: "sqltap", data = %data, "{}", event.message),
            Level::Warn => tracing::warn!(target: "sqltap", data = %data, "{}", event.message),
            Level::Error => tracing::error!(target: "sqltap", data = %data, "{}", event.message),
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _event: &Event) {}
}
