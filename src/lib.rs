// SPDX-License-Identifier: Apache-2.0

//! Transparent logging instrumentation for SQL database drivers.
//!
//! Wrap any [`Driver`] with [`open_driver`] and every driver-level operation
//! (connect, prepare, execute, query, transaction control, row iteration)
//! produces one structured log event, while results and errors pass through
//! unchanged.

pub mod db;
pub mod driver;
pub mod event;
pub mod level;
pub mod options;
pub mod proxy;
pub mod redact;
pub mod registry;
pub mod sinks;

pub use db::{open_driver, Database};
pub use driver::{
    Connection, ConnectionCaps, Driver, DriverError, DriverResult, ExecResult, NamedValue, Row,
    Rows, RowsCaps, Statement, Transaction, Value,
};
pub use event::{Event, EventData, LogSink};
pub use level::Level;
pub use options::{
    with_argument_logging, with_connection_id_fieldname, with_duration_fieldname,
    with_duration_unit, with_error_fieldname, with_execer_level, with_minimum_level,
    with_not_supported_logging, with_preparer_level, with_queryer_level, with_redaction_triggers,
    with_sql_args_fieldname, with_sql_query_as_message, with_sql_query_fieldname,
    with_start_time_fieldname, with_start_time_logging, with_statement_id_fieldname,
    with_time_fieldname, with_transaction_id_fieldname, with_uid_generator, DurationUnit,
    OptionStep, Options, UidGenerator, UuidGenerator,
};
pub use proxy::LoggedDriver;
pub use redact::{should_redact, REDACTED};
pub use registry::{lookup, open_registered, register, registered_drivers, RegistryError};
pub use sinks::{NullSink, TracingSink, WriterSink};
