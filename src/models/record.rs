//! Untyped record values and payload normalization.
//!
//! Rows travel as ordered column→JSON maps. Before a write, every value is
//! coerced to the scalar kind its field declares; coercion is where the
//! empty-string→NULL rule and the foreign-key guarantee live (a numeric
//! foreign key can only ever be submitted as its key value — display text
//! fails to parse and is rejected before anything reaches the database).

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    schema::{ScalarKind, TableSchema},
};

/// A materialized row: column name → JSON value, in schema declaration order.
pub type Record = IndexMap<String, Value>;

/// A value ready to bind as a query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Scalar {
    /// Human-readable rendering, used for display maps and page search.
    pub fn display(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(n) => n.to_string(),
            Scalar::Text(s) => s.clone(),
            Scalar::Timestamp(t) => t.to_rfc3339(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Int(n) => Value::from(*n),
            Scalar::Text(s) => Value::String(s.clone()),
            Scalar::Timestamp(t) => Value::String(t.to_rfc3339()),
        }
    }
}

/// Coerce a JSON value to the given scalar kind.
///
/// Empty strings become `Null` for every kind — the blank-input convention of
/// the form flow. Numeric kinds accept JSON numbers or numeric strings; dates
/// accept RFC 3339 or plain `YYYY-MM-DD`.
pub fn coerce(value: &Value, kind: ScalarKind, column: &str) -> AppResult<Scalar> {
    let bad = |v: &Value| {
        AppError::Validation(format!(
            "invalid value {} for column {}",
            v, column
        ))
    };

    match value {
        Value::Null => Ok(Scalar::Null),
        Value::String(s) if s.is_empty() => Ok(Scalar::Null),
        _ => match kind {
            ScalarKind::Text => match value {
                Value::String(s) => Ok(Scalar::Text(s.clone())),
                Value::Number(n) => Ok(Scalar::Text(n.to_string())),
                other => Err(bad(other)),
            },
            ScalarKind::Int => match value {
                Value::Number(n) => n.as_i64().map(Scalar::Int).ok_or_else(|| bad(value)),
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Scalar::Int)
                    .map_err(|_| bad(value)),
                other => Err(bad(other)),
            },
            ScalarKind::Bool => match value {
                Value::Bool(b) => Ok(Scalar::Bool(*b)),
                Value::String(s) => match s.as_str() {
                    "true" => Ok(Scalar::Bool(true)),
                    "false" => Ok(Scalar::Bool(false)),
                    _ => Err(bad(value)),
                },
                other => Err(bad(other)),
            },
            ScalarKind::Timestamp => match value {
                Value::String(s) => parse_timestamp(s).ok_or_else(|| bad(value)),
                other => Err(bad(other)),
            },
        },
    }
}

fn parse_timestamp(s: &str) -> Option<Scalar> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(Scalar::Timestamp(dt.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Scalar::Timestamp(dt.and_utc()))
}

/// One normalized column ready to write.
#[derive(Debug, Clone)]
pub struct BoundColumn {
    pub name: &'static str,
    pub value: Scalar,
    pub kind: ScalarKind,
}

/// Turn a save payload into bound columns for the given table.
///
/// The primary key is always stripped — dropped on create, immutable on
/// update. Columns the schema does not know are rejected rather than silently
/// forwarded.
pub fn normalize_payload(schema: &TableSchema, payload: &Record) -> AppResult<Vec<BoundColumn>> {
    let key = schema.resolve_key();

    for name in payload.keys() {
        if !schema.fields.contains_key(name.as_str()) {
            return Err(AppError::Validation(format!(
                "unknown column {} for table {}",
                name, schema.name
            )));
        }
    }

    let mut columns = Vec::new();
    for (name, spec) in &schema.fields {
        if Some(*name) == key {
            continue;
        }
        let Some(raw) = payload.get(*name) else {
            continue;
        };
        let kind = spec.kind.scalar_kind();
        columns.push(BoundColumn {
            name: *name,
            value: coerce(raw, kind, name)?,
            kind,
        });
    }
    Ok(columns)
}

/// Render a JSON cell for substring search and display-map keys.
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
