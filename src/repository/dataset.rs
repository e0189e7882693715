//! Generic table repository.
//!
//! All SQL here is assembled from registry metadata: table and column
//! identifiers only ever come from the static schema registry, and every
//! runtime value is a bound parameter.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{postgres::PgRow, Pool, Postgres, QueryBuilder, Row};

use crate::{
    error::AppResult,
    models::record::{BoundColumn, Record, Scalar},
    schema::{ScalarKind, TableSchema},
};

#[derive(Clone)]
pub struct DatasetRepository {
    pool: Pool<Postgres>,
}

impl DatasetRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Fetch one page of rows plus the exact total row count.
    ///
    /// Rows are ordered by primary key ascending — the deterministic stand-in
    /// for the source's backend-default ordering.
    pub async fn fetch_page(
        &self,
        schema: &TableSchema,
        key: &str,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<Record>, i64)> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {} ASC LIMIT $1 OFFSET $2",
            column_list(schema),
            schema.name,
            key
        );
        let rows = sqlx::query(&sql)
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM {}", schema.name);
        let total: i64 = sqlx::query_scalar(&count_sql).fetch_one(&self.pool).await?;

        let records = rows
            .iter()
            .map(|row| record_from_row(schema, row))
            .collect::<AppResult<Vec<_>>>()?;
        Ok((records, total))
    }

    /// Fetch every (key, display) pair of a referenced table.
    ///
    /// Deliberately unbounded: the list and form flows load each referenced
    /// table in full per request to build their display maps. Table sizes are
    /// small; changing this shortcut is an observable behavior change.
    pub async fn fetch_reference_rows(
        &self,
        target: &TableSchema,
        key_col: &str,
        display_col: &str,
    ) -> AppResult<Vec<(Value, String)>> {
        let key_kind = field_kind(target, key_col);
        let display_kind = field_kind(target, display_col);

        let cols = if key_col == display_col {
            key_col.to_string()
        } else {
            format!("{}, {}", key_col, display_col)
        };
        let sql = format!("SELECT {} FROM {} ORDER BY {} ASC", cols, target.name, key_col);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut pairs = Vec::with_capacity(rows.len());
        for row in &rows {
            let key = decode_cell(row, key_col, key_kind)?;
            let display = decode_cell(row, display_col, display_kind)?;
            let label = crate::models::record::render_cell(&display);
            pairs.push((key, label));
        }
        Ok(pairs)
    }

    /// Fetch a single record by primary key.
    pub async fn get_by_key(
        &self,
        schema: &TableSchema,
        key_col: &str,
        key: &Scalar,
    ) -> AppResult<Option<Record>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            column_list(schema),
            schema.name,
            key_col
        );
        let row = bind_scalar_arg(sqlx::query(&sql), key)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| record_from_row(schema, &r)).transpose()
    }

    /// Insert a new row.
    pub async fn insert(&self, schema: &TableSchema, columns: &[BoundColumn]) -> AppResult<()> {
        if columns.is_empty() {
            let sql = format!("INSERT INTO {} DEFAULT VALUES", schema.name);
            sqlx::query(&sql).execute(&self.pool).await?;
            return Ok(());
        }

        let mut qb = QueryBuilder::<Postgres>::new(format!("INSERT INTO {} (", schema.name));
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(col.name);
        }
        qb.push(") VALUES (");
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            push_scalar(&mut qb, &col.value, col.kind);
        }
        qb.push(")");
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    /// Update a row by primary key. Updating a vanished key affects zero rows
    /// and is not an error, matching the pass-through semantics of the source.
    pub async fn update_by_key(
        &self,
        schema: &TableSchema,
        key_col: &str,
        key: &Scalar,
        columns: &[BoundColumn],
    ) -> AppResult<()> {
        if columns.is_empty() {
            return Ok(());
        }

        let key_kind = field_kind(schema, key_col);
        let mut qb = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", schema.name));
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(col.name);
            qb.push(" = ");
            push_scalar(&mut qb, &col.value, col.kind);
        }
        qb.push(format!(" WHERE {} = ", key_col));
        push_scalar(&mut qb, key, key_kind);
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    /// Delete a row by primary key. Returns the affected row count; deleting
    /// an already-deleted key is a no-op success.
    pub async fn delete_by_key(
        &self,
        schema: &TableSchema,
        key_col: &str,
        key: &Scalar,
    ) -> AppResult<u64> {
        let sql = format!("DELETE FROM {} WHERE {} = $1", schema.name, key_col);
        let result = bind_scalar_arg(sqlx::query(&sql), key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn column_list(schema: &TableSchema) -> String {
    schema
        .fields
        .keys()
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

fn field_kind(schema: &TableSchema, column: &str) -> ScalarKind {
    schema
        .fields
        .get(column)
        .map_or(ScalarKind::Text, |f| f.kind.scalar_kind())
}

fn record_from_row(schema: &TableSchema, row: &PgRow) -> AppResult<Record> {
    let mut record = Record::new();
    for (name, spec) in &schema.fields {
        record.insert(
            (*name).to_string(),
            decode_cell(row, name, spec.kind.scalar_kind())?,
        );
    }
    Ok(record)
}

fn decode_cell(row: &PgRow, name: &str, kind: ScalarKind) -> AppResult<Value> {
    let value = match kind {
        ScalarKind::Text => row
            .try_get::<Option<String>, _>(name)?
            .map_or(Value::Null, Value::String),
        ScalarKind::Int => row
            .try_get::<Option<i64>, _>(name)?
            .map_or(Value::Null, Value::from),
        ScalarKind::Bool => row
            .try_get::<Option<bool>, _>(name)?
            .map_or(Value::Null, Value::Bool),
        ScalarKind::Timestamp => row
            .try_get::<Option<DateTime<Utc>>, _>(name)?
            .map_or(Value::Null, |t| Value::String(t.to_rfc3339())),
    };
    Ok(value)
}

fn push_scalar(qb: &mut QueryBuilder<'_, Postgres>, value: &Scalar, kind: ScalarKind) {
    match value {
        Scalar::Null => match kind {
            ScalarKind::Text => {
                qb.push_bind(None::<String>);
            }
            ScalarKind::Int => {
                qb.push_bind(None::<i64>);
            }
            ScalarKind::Bool => {
                qb.push_bind(None::<bool>);
            }
            ScalarKind::Timestamp => {
                qb.push_bind(None::<DateTime<Utc>>);
            }
        },
        Scalar::Bool(b) => {
            qb.push_bind(*b);
        }
        Scalar::Int(n) => {
            qb.push_bind(*n);
        }
        Scalar::Text(s) => {
            qb.push_bind(s.clone());
        }
        Scalar::Timestamp(t) => {
            qb.push_bind(*t);
        }
    }
}

fn bind_scalar_arg<'q>(
    query: sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>,
    value: &Scalar,
) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
    match value {
        Scalar::Null => query.bind(None::<String>),
        Scalar::Bool(b) => query.bind(*b),
        Scalar::Int(n) => query.bind(*n),
        Scalar::Text(s) => query.bind(s.clone()),
        Scalar::Timestamp(t) => query.bind(*t),
    }
}
