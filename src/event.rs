// SPDX-License-Identifier: Apache-2.0

//! Event assembly and emission
//!
//! One event is built per intercepted driver call and handed to the sink in
//! a single write. Events below the configured minimum level are dropped
//! before any field is rendered, so a filtered call costs one comparison and
//! nothing else.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::driver::error::DriverError;
use crate::driver::types::{NamedValue, Value};
use crate::level::Level;
use crate::options::{DurationUnit, Options};
use crate::redact::{redact_str, should_redact, REDACTED};

/// Ordered field map of an event.
pub type EventData = BTreeMap<String, serde_json::Value>;

/// One logged record describing a single intercepted driver operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Event {
    /// Operation name (`"Connect"`, `"Exec"`, ...), or the query text when
    /// configured.
    pub message: String,
    pub level: Level,
    pub data: EventData,
}

/// Destination for emitted events.
///
/// One call per event. Implementations must swallow their own failures:
/// nothing a sink does may surface to the database caller.
pub trait LogSink: Send + Sync {
    fn log(&self, event: &Event);
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn log(&self, event: &Event) {
        (**self).log(event)
    }
}

/// Operation-specific payload a proxy attaches to an event.
pub(crate) enum Field<'a> {
    /// Query text, logged under the query field name.
    Query(&'a str),
    /// Statement arguments, logged under the args field name.
    Args(&'a [NamedValue]),
    /// Connection string, logged under the args field name.
    Dsn(&'a str),
    ConnId(&'a str),
    StmtId(&'a str),
    TxId(&'a str),
}

/// Shared options + sink bundle carried by every proxy.
#[derive(Clone)]
pub(crate) struct Emitter {
    options: Arc<Options>,
    sink: Arc<dyn LogSink>,
}

impl Emitter {
    pub(crate) fn new(options: Options, sink: Arc<dyn LogSink>) -> Self {
        Self { options: Arc::new(options), sink }
    }

    pub(crate) fn options(&self) -> &Options {
        &self.options
    }

    /// Builds and writes one event.
    ///
    /// Below-threshold levels return before anything is rendered.
    /// `NotSupported` errors are capability-probe artifacts and stay out of
    /// the stream unless configured otherwise. Never fails: sink behaviour
    /// cannot reach the database call that produced the event.
    pub(crate) fn emit(
        &self,
        level: Level,
        message: &str,
        start: Instant,
        error: Option<&DriverError>,
        fields: &[Field<'_>],
    ) {
        let opts = &*self.options;
        if level < opts.minimum_level {
            return;
        }
        if let Some(err) = error {
            if err.is_not_supported() && !opts.log_not_supported {
                return;
            }
        }

        let elapsed = start.elapsed();
        let now = Utc::now();

        let mut data = EventData::new();
        data.insert(opts.time_fieldname.clone(), json!(now.timestamp()));
        data.insert(
            opts.duration_fieldname.clone(),
            json!(duration_in(opts.duration_unit, elapsed)),
        );
        if opts.include_start_time {
            let started = now
                - chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero());
            data.insert(opts.start_time_fieldname.clone(), json!(started.timestamp()));
        }
        if let Some(err) = error {
            data.insert(opts.error_fieldname.clone(), json!(err.to_string()));
        }

        let mut query_message: Option<String> = None;
        for field in fields {
            match field {
                Field::Query(query) => {
                    let query = redact_str(query, &opts.redaction_triggers);
                    if opts.sql_query_as_message {
                        query_message = Some(query.to_string());
                    }
                    data.insert(opts.sql_query_fieldname.clone(), json!(query));
                }
                Field::Args(args) => {
                    // Zero-argument calls carry no args field at all.
                    if opts.log_arguments && !args.is_empty() {
                        data.insert(
                            opts.sql_args_fieldname.clone(),
                            render_args(args, &opts.redaction_triggers),
                        );
                    }
                }
                Field::Dsn(dsn) => {
                    data.insert(
                        opts.sql_args_fieldname.clone(),
                        json!(redact_str(dsn, &opts.redaction_triggers)),
                    );
                }
                Field::ConnId(id) => {
                    data.insert(opts.conn_id_fieldname.clone(), json!(id));
                }
                Field::StmtId(id) => {
                    data.insert(opts.stmt_id_fieldname.clone(), json!(id));
                }
                Field::TxId(id) => {
                    data.insert(opts.tx_id_fieldname.clone(), json!(id));
                }
            }
        }

        let event = Event {
            message: query_message.unwrap_or_else(|| message.to_string()),
            level,
            data,
        };
        self.sink.log(&event);
    }
}

fn duration_in(unit: DurationUnit, elapsed: Duration) -> f64 {
    match unit {
        DurationUnit::Nanoseconds => elapsed.as_nanos() as f64,
        DurationUnit::Microseconds => elapsed.as_micros() as f64,
        DurationUnit::Milliseconds => elapsed.as_secs_f64() * 1000.0,
    }
}

/// Renders argument values for the log stream, masking any whose textual
/// form matches a redaction trigger.
fn render_args(args: &[NamedValue], triggers: &[String]) -> serde_json::Value {
    let rendered = args
        .iter()
        .map(|arg| {
            let value = render_value(&arg.value, triggers);
            match &arg.name {
                Some(name) => {
                    let mut entry = serde_json::Map::new();
                    entry.insert(name.clone(), value);
                    serde_json::Value::Object(entry)
                }
                None => value,
            }
        })
        .collect();
    serde_json::Value::Array(rendered)
}

fn render_value(value: &Value, triggers: &[String]) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Array(items) => serde_json::Value::Array(
            items.iter().map(|item| render_value(item, triggers)).collect(),
        ),
        other => {
            let rendered = serde_json::to_value(other).unwrap_or(serde_json::Value::Null);
            let scan = match &rendered {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if should_redact(&scan, triggers) {
                json!(REDACTED)
            } else {
                rendered
            }
        }
    }
}
