//! Universal data types exchanged with drivers
//!
//! These types give every driver a normalized representation of argument
//! values, result rows, and the optional capabilities it reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Universal value representation for arguments and row cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(#[serde(with = "base64_bytes")] Vec<u8>),
    Timestamp(DateTime<Utc>),
    Json(serde_json::Value),
    Array(Vec<Value>),
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

/// A statement argument, positional or named.
///
/// `ordinal` is 1-based. Positional arguments carry `name: None`; named
/// arguments are only accepted by connections that report the
/// `named_args` capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: Option<String>,
    pub ordinal: usize,
    pub value: Value,
}

impl NamedValue {
    pub fn positional(ordinal: usize, value: Value) -> Self {
        Self { name: None, ordinal, value }
    }

    pub fn named(name: impl Into<String>, ordinal: usize, value: Value) -> Self {
        Self { name: Some(name.into()), ordinal, value }
    }
}

/// A single row of data (indexed by column order).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    pub values: Vec<Value>,
}

/// Outcome of a statement that does not return rows.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ExecResult {
    pub rows_affected: u64,
    pub last_insert_id: Option<i64>,
}

/// Optional fast paths a connection reports.
///
/// Everything defaults to false: a connection only has to provide the
/// mandatory prepare/begin/close surface. Callers consult this snapshot and
/// fall back to the prepared-statement path for anything unsupported.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConnectionCaps {
    pub ping: bool,
    pub execute: bool,
    pub query: bool,
    pub named_args: bool,
}

/// Optional row-metadata paths a result set reports.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RowsCaps {
    pub column_types: bool,
}
