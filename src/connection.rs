//! Data-source connections.
//!
//! Queries never hold a connection across calls: each one asks its
//! [`ConnectionProvider`] for a fresh [`SqlConnection`], runs, and lets the
//! connection drop, which releases it on the success and the error path
//! alike. Tests substitute providers that hand back canned rows.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use duckdb::{types::ValueRef, AccessMode, Config as DuckDbConfig, Connection as DuckDbConnection};
use tracing::{debug, warn};

use crate::config::SourceSettings;
use crate::error::Result;

/// One result row, column name to JSON value.
pub type Row = HashMap<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// An open connection able to run parameterized SQL.
pub trait SqlConnection {
    /// Execute SQL with `?` positional placeholders bound to `params`.
    fn execute(&self, sql: &str, params: &[String]) -> Result<Vec<Row>>;
}

/// Hands out connections to one external data source.
pub trait ConnectionProvider: Send + Sync {
    /// Short name used in logs (`warehouse`, `sales`).
    fn label(&self) -> &str;

    /// Open a fresh connection.
    fn open(&self) -> Result<Box<dyn SqlConnection>>;

    /// Open, run one query, release.
    fn query(&self, sql: &str, params: &[String]) -> Result<Vec<Row>> {
        let started = Instant::now();
        let conn = self.open()?;
        let result = conn.execute(sql, params);
        drop(conn);
        match &result {
            Ok(rows) => debug!(
                source = self.label(),
                rows = rows.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "query finished"
            ),
            Err(e) => warn!(source = self.label(), error = %e, "query failed"),
        }
        result
    }
}

// ---------------------------------------------------------------------------
// DuckDbProvider
// ---------------------------------------------------------------------------

/// Opens DuckDB connections, running the configured set-up statements on
/// each one.
///
/// File databases are opened read-only so any number of requests can hold
/// them at once; in-memory databases are rebuilt from `init_sql` per open.
#[derive(Debug, Clone)]
pub struct DuckDbProvider {
    label: String,
    path: Option<PathBuf>,
    init_sql: Vec<String>,
}

impl DuckDbProvider {
    pub fn new(label: impl Into<String>, settings: &SourceSettings) -> Self {
        Self {
            label: label.into(),
            path: settings.path.clone(),
            init_sql: settings.init_sql.clone(),
        }
    }

    /// An in-memory provider with no set-up statements.
    pub fn in_memory(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: None,
            init_sql: Vec::new(),
        }
    }

    /// Append a set-up statement run on every open.
    pub fn with_init_sql(mut self, sql: impl Into<String>) -> Self {
        self.init_sql.push(sql.into());
        self
    }

    /// Materialize a newline-delimited JSON file as `table_name` on every open.
    pub fn with_ndjson_table(self, table_name: &str, ndjson_path: &Path) -> Self {
        let path_fwd = ndjson_path.to_string_lossy().replace('\\', "/").replace('\'', "''");
        self.with_init_sql(format!(
            "CREATE OR REPLACE TABLE {} AS SELECT * FROM read_json_auto('{}', format='newline_delimited')",
            table_name, path_fwd
        ))
    }
}

impl ConnectionProvider for DuckDbProvider {
    fn label(&self) -> &str {
        &self.label
    }

    fn open(&self) -> Result<Box<dyn SqlConnection>> {
        let conn = match &self.path {
            Some(path) => {
                let config = DuckDbConfig::default().access_mode(AccessMode::ReadOnly)?;
                DuckDbConnection::open_with_flags(path, config)?
            }
            None => DuckDbConnection::open_in_memory()?,
        };
        for statement in &self.init_sql {
            conn.execute_batch(statement)?;
        }
        debug!(source = %self.label, "connection opened");
        Ok(Box::new(DuckDbSession {
            conn,
            label: self.label.clone(),
        }))
    }
}

/// A live DuckDB connection; closed when dropped.
pub struct DuckDbSession {
    conn: DuckDbConnection,
    label: String,
}

impl SqlConnection for DuckDbSession {
    fn execute(&self, sql: &str, params: &[String]) -> Result<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the statement has executed
        let column_names: Vec<String> = match rows.as_ref() {
            Some(stmt) => stmt.column_names().into_iter().map(|s| s.to_string()).collect(),
            None => Vec::new(),
        };

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut map = HashMap::with_capacity(column_names.len());
            for (i, name) in column_names.iter().enumerate() {
                map.insert(name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }
        Ok(out)
    }
}

impl Drop for DuckDbSession {
    fn drop(&mut self) {
        debug!(source = %self.label, "connection released");
    }
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    use serde_json::Value;

    fn float(f: f64) -> Value {
        serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }

    match val {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(n) => Value::Number(n.into()),
        ValueRef::SmallInt(n) => Value::Number(n.into()),
        ValueRef::Int(n) => Value::Number(n.into()),
        ValueRef::BigInt(n) => Value::Number(n.into()),
        ValueRef::UTinyInt(n) => Value::Number(n.into()),
        ValueRef::USmallInt(n) => Value::Number(n.into()),
        ValueRef::UInt(n) => Value::Number(n.into()),
        ValueRef::UBigInt(n) => Value::Number(n.into()),
        // SUM over integer columns comes back as HUGEINT
        ValueRef::HugeInt(n) => match i64::try_from(n) {
            Ok(i) => Value::Number(i.into()),
            Err(_) => float(n as f64),
        },
        ValueRef::Float(f) => float(f as f64),
        ValueRef::Double(f) => float(f),
        ValueRef::Decimal(d) => d
            .to_string()
            .parse::<f64>()
            .map(float)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).to_string()),
        ValueRef::Date32(days) => NaiveDate::from_num_days_from_ce_opt(days + 719_163)
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),
        // Queries cast timestamps and other exotic types to text or numbers
        _ => Value::Null,
    }
}
