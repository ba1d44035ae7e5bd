//! Logging behaviour configuration
//!
//! An [`Options`] value is resolved once per wrapped driver by folding
//! option steps over the defaults, then shared read-only by every proxy
//! derived from that driver. Field-name strings are taken as-is, including
//! empty ones; odd values surface in the emitted records, never as
//! construction errors.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::level::Level;

/// Source of the correlation ids attached to connections, statements and
/// transactions.
pub trait UidGenerator: Send + Sync {
    /// Returns a fresh unique id.
    fn uid(&self) -> String;
}

/// Default [`UidGenerator`]: random UUID v4 strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl UidGenerator for UuidGenerator {
    fn uid(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Unit used for the duration field of emitted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
}

/// Resolved logging configuration.
///
/// Immutable after construction: proxies share one instance and only ever
/// read it. Treat the public fields as read-only once the value has been
/// handed to a wrapped driver.
pub struct Options {
    /// Events below this level never reach the sink.
    pub minimum_level: Level,
    pub error_fieldname: String,
    pub duration_fieldname: String,
    pub time_fieldname: String,
    pub start_time_fieldname: String,
    pub sql_query_fieldname: String,
    pub sql_args_fieldname: String,
    pub conn_id_fieldname: String,
    pub stmt_id_fieldname: String,
    pub tx_id_fieldname: String,
    /// Substrings that force wholesale masking of matching field values.
    pub redaction_triggers: Vec<String>,
    /// When false, argument fields are omitted from events entirely.
    pub log_arguments: bool,
    /// When false, `NotSupported` driver errors produce no event.
    pub log_not_supported: bool,
    /// When true, events carrying query text use it as the event message.
    pub sql_query_as_message: bool,
    pub include_start_time: bool,
    pub duration_unit: DurationUnit,
    /// Baseline level for successful Prepare events.
    pub preparer_level: Level,
    /// Baseline level for successful Query/StmtQuery events.
    pub queryer_level: Level,
    /// Baseline level for successful Exec/StmtExec events.
    pub execer_level: Level,
    pub uid_generator: Arc<dyn UidGenerator>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            minimum_level: Level::Info,
            error_fieldname: "error".to_string(),
            duration_fieldname: "duration".to_string(),
            time_fieldname: "time".to_string(),
            start_time_fieldname: "start".to_string(),
            sql_query_fieldname: "query".to_string(),
            sql_args_fieldname: "args".to_string(),
            conn_id_fieldname: "conn_id".to_string(),
            stmt_id_fieldname: "stmt_id".to_string(),
            tx_id_fieldname: "tx_id".to_string(),
            redaction_triggers: Vec::new(),
            log_arguments: true,
            log_not_supported: false,
            sql_query_as_message: false,
            include_start_time: false,
            duration_unit: DurationUnit::Milliseconds,
            preparer_level: Level::Info,
            queryer_level: Level::Info,
            execer_level: Level::Info,
            uid_generator: Arc::new(UuidGenerator),
        }
    }
}

impl Options {
    pub(crate) fn next_uid(&self) -> String {
        self.uid_generator.uid()
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("minimum_level", &self.minimum_level)
            .field("error_fieldname", &self.error_fieldname)
            .field("sql_query_fieldname", &self.sql_query_fieldname)
            .field("sql_args_fieldname", &self.sql_args_fieldname)
            .field("redaction_triggers", &self.redaction_triggers)
            .field("duration_unit", &self.duration_unit)
            .finish_non_exhaustive()
    }
}

/// A single deferred configuration mutation.
///
/// Steps are applied in order over [`Options::default`]; when two steps
/// touch the same field, the later one wins.
pub struct OptionStep(Box<dyn FnOnce(&mut Options) + Send>);

impl OptionStep {
    fn new(f: impl FnOnce(&mut Options) + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    pub(crate) fn apply(self, options: &mut Options) {
        (self.0)(options)
    }
}

pub(crate) fn build_options(steps: Vec<OptionStep>) -> Options {
    let mut options = Options::default();
    for step in steps {
        step.apply(&mut options);
    }
    options
}

/// Sets the minimum level an event must have to reach the sink.
pub fn with_minimum_level(level: Level) -> OptionStep {
    OptionStep::new(move |o| o.minimum_level = level)
}

/// Renames the field holding a failed operation's error message.
pub fn with_error_fieldname(name: impl Into<String>) -> OptionStep {
    let name = name.into();
    OptionStep::new(move |o| o.error_fieldname = name)
}

/// Renames the field holding the operation duration.
pub fn with_duration_fieldname(name: impl Into<String>) -> OptionStep {
    let name = name.into();
    OptionStep::new(move |o| o.duration_fieldname = name)
}

/// Renames the field holding the event completion time (unix seconds).
pub fn with_time_fieldname(name: impl Into<String>) -> OptionStep {
    let name = name.into();
    OptionStep::new(move |o| o.time_fieldname = name)
}

/// Renames the field holding the operation start time (unix seconds).
pub fn with_start_time_fieldname(name: impl Into<String>) -> OptionStep {
    let name = name.into();
    OptionStep::new(move |o| o.start_time_fieldname = name)
}

/// Renames the field holding query text.
pub fn with_sql_query_fieldname(name: impl Into<String>) -> OptionStep {
    let name = name.into();
    OptionStep::new(move |o| o.sql_query_fieldname = name)
}

/// Renames the field holding argument values (and the connection string on
/// Connect events).
pub fn with_sql_args_fieldname(name: impl Into<String>) -> OptionStep {
    let name = name.into();
    OptionStep::new(move |o| o.sql_args_fieldname = name)
}

/// Renames the field holding the connection correlation id.
pub fn with_connection_id_fieldname(name: impl Into<String>) -> OptionStep {
    let name = name.into();
    OptionStep::new(move |o| o.conn_id_fieldname = name)
}

/// Renames the field holding the statement correlation id.
pub fn with_statement_id_fieldname(name: impl Into<String>) -> OptionStep {
    let name = name.into();
    OptionStep::new(move |o| o.stmt_id_fieldname = name)
}

/// Renames the field holding the transaction correlation id.
pub fn with_transaction_id_fieldname(name: impl Into<String>) -> OptionStep {
    let name = name.into();
    OptionStep::new(move |o| o.tx_id_fieldname = name)
}

/// Replaces the redaction trigger set.
pub fn with_redaction_triggers<I, S>(triggers: I) -> OptionStep
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let triggers: Vec<String> = triggers.into_iter().map(Into::into).collect();
    OptionStep::new(move |o| o.redaction_triggers = triggers)
}

/// Controls whether argument values appear in events at all.
pub fn with_argument_logging(enabled: bool) -> OptionStep {
    OptionStep::new(move |o| o.log_arguments = enabled)
}

/// Controls whether `NotSupported` driver errors produce events.
pub fn with_not_supported_logging(enabled: bool) -> OptionStep {
    OptionStep::new(move |o| o.log_not_supported = enabled)
}

/// Uses the (redacted) query text as the event message where one exists.
pub fn with_sql_query_as_message(enabled: bool) -> OptionStep {
    OptionStep::new(move |o| o.sql_query_as_message = enabled)
}

/// Adds the operation start time to every event.
pub fn with_start_time_logging(enabled: bool) -> OptionStep {
    OptionStep::new(move |o| o.include_start_time = enabled)
}

/// Changes the unit of the duration field.
pub fn with_duration_unit(unit: DurationUnit) -> OptionStep {
    OptionStep::new(move |o| o.duration_unit = unit)
}

/// Baseline level for successful Prepare events.
pub fn with_preparer_level(level: Level) -> OptionStep {
    OptionStep::new(move |o| o.preparer_level = level)
}

/// Baseline level for successful Query and StmtQuery events.
pub fn with_queryer_level(level: Level) -> OptionStep {
    OptionStep::new(move |o| o.queryer_level = level)
}

/// Baseline level for successful Exec and StmtExec events.
pub fn with_execer_level(level: Level) -> OptionStep {
    OptionStep::new(move |o| o.execer_level = level)
}

/// Replaces the correlation-id generator.
pub fn with_uid_generator<G: UidGenerator + 'static>(generator: G) -> OptionStep {
    let generator = Arc::new(generator);
    OptionStep::new(move |o| o.uid_generator = generator)
}
