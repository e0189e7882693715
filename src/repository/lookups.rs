//! Foreign-key lookup search.
//!
//! The server side of the search popups: one static spec per searchable
//! target table, a shared query engine underneath. A query that parses as an
//! integer matches the numeric code exactly; anything else is a
//! case-insensitive substring match over the designated text columns.

use serde_json::Value;
use sqlx::{Pool, Postgres, QueryBuilder, Row};

use crate::{
    error::AppResult,
    models::dataset::LookupRow,
    schema::{registry, ScalarKind},
};

/// Search behavior for one popup target.
#[derive(Debug)]
pub struct LookupSpec {
    pub table: &'static str,
    /// FROM clause, including any join the display needs
    from_clause: &'static str,
    /// Qualified key expression a selection stores
    key_expr: &'static str,
    /// Composed display expression
    display_expr: &'static str,
    /// Columns the text search runs over (OR-combined ILIKE)
    search_columns: &'static [&'static str],
    /// Column matched exactly when the query parses as an integer
    numeric_column: Option<&'static str>,
    /// Row filters always applied (e.g. only available copies)
    fixed_filters: &'static [&'static str],
    order_expr: &'static str,
}

static LOOKUPS: &[LookupSpec] = &[
    LookupSpec {
        table: "autor",
        from_clause: "autor",
        key_expr: "au_cod",
        display_expr: "au_nome",
        search_columns: &["au_nome"],
        numeric_column: None,
        fixed_filters: &[],
        order_expr: "au_nome",
    },
    LookupSpec {
        table: "livro",
        from_clause: "livro",
        key_expr: "li_cod",
        display_expr: "li_titulo || ' (ID: ' || li_cod::text || ')'",
        search_columns: &["li_titulo"],
        numeric_column: Some("li_cod"),
        fixed_filters: &[],
        order_expr: "li_titulo",
    },
    LookupSpec {
        table: "livro_exemplar",
        from_clause: "livro_exemplar e JOIN livro l ON l.li_cod = e.lex_li_cod",
        key_expr: "e.lex_cod",
        display_expr: "l.li_titulo || ' (Exemplar: ' || e.lex_cod::text || ')'",
        search_columns: &["l.li_titulo"],
        numeric_column: Some("e.lex_cod"),
        fixed_filters: &["e.lex_disponivel = TRUE"],
        order_expr: "l.li_titulo",
    },
    LookupSpec {
        table: "utente",
        from_clause: "utente",
        key_expr: "ut_cod",
        display_expr: "ut_nome || ' (ID: ' || ut_cod::text || ')'",
        search_columns: &["ut_nome"],
        numeric_column: Some("ut_cod"),
        fixed_filters: &[],
        order_expr: "ut_nome",
    },
];

/// Look up the search spec registered for a target table.
pub fn lookup_spec(table: &str) -> Option<&'static LookupSpec> {
    LOOKUPS.iter().find(|spec| spec.table == table)
}

#[derive(Clone)]
pub struct LookupsRepository {
    pool: Pool<Postgres>,
}

impl LookupsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Run a paged lookup search, returning rows and the exact total.
    pub async fn search(
        &self,
        spec: &LookupSpec,
        query: Option<&str>,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<LookupRow>, i64)> {
        let key_kind = registry()
            .get(spec.table)
            .and_then(|t| t.key_scalar_kind())
            .unwrap_or(ScalarKind::Int);

        let mut count = QueryBuilder::<Postgres>::new(format!(
            "SELECT COUNT(*) FROM {}",
            spec.from_clause
        ));
        push_filters(&mut count, spec, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} AS lookup_key, {} AS lookup_display FROM {}",
            spec.key_expr, spec.display_expr, spec.from_clause
        ));
        push_filters(&mut qb, spec, query);
        qb.push(format!(" ORDER BY {} ASC", spec.order_expr));
        qb.push(" LIMIT ");
        qb.push_bind(per_page);
        qb.push(" OFFSET ");
        qb.push_bind((page - 1) * per_page);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let mut result = Vec::with_capacity(rows.len());
        for row in &rows {
            let key = match key_kind {
                ScalarKind::Int => row
                    .try_get::<Option<i64>, _>("lookup_key")?
                    .map_or(Value::Null, Value::from),
                _ => row
                    .try_get::<Option<String>, _>("lookup_key")?
                    .map_or(Value::Null, Value::String),
            };
            let display = row
                .try_get::<Option<String>, _>("lookup_display")?
                .unwrap_or_default();
            result.push(LookupRow { key, display });
        }
        Ok((result, total))
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, spec: &LookupSpec, query: Option<&str>) {
    let mut prefix = " WHERE ";
    for filter in spec.fixed_filters {
        qb.push(prefix);
        qb.push(*filter);
        prefix = " AND ";
    }

    let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return;
    };

    qb.push(prefix);
    match (q.parse::<i64>(), spec.numeric_column) {
        (Ok(code), Some(column)) => {
            qb.push(column);
            qb.push(" = ");
            qb.push_bind(code);
        }
        _ => {
            qb.push("(");
            for (i, column) in spec.search_columns.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(*column);
                qb.push(" ILIKE ");
                qb.push_bind(format!("%{}%", q));
            }
            qb.push(")");
        }
    }
}
