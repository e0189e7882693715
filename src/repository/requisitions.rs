//! Requisitions repository: dashboard queues, pickup/return actions, stats.

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::requisition::{DashboardEntry, RecentRequisition, RequisitionState},
};

#[derive(Clone)]
pub struct RequisitionsRepository {
    pool: Pool<Postgres>,
}

impl RequisitionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// One active queue: `borrowed = false` is "to pick up", `true` is
    /// "to return". A numeric query matches the copy code exactly; text
    /// queries match the book title by substring. Sorted by title.
    pub async fn queue(&self, borrowed: bool, query: Option<&str>) -> AppResult<Vec<DashboardEntry>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT r.re_cod, e.lex_cod, l.li_titulo, u.ut_nome
            FROM requisicao r
            JOIN livro_exemplar e ON e.lex_cod = r.re_lex_cod
            JOIN livro l ON l.li_cod = e.lex_li_cod
            LEFT JOIN utente u ON u.ut_cod = r.re_ut_cod
            WHERE r.re_emprestado = "#,
        );
        qb.push_bind(borrowed);
        qb.push(" AND r.re_data_devolucao IS NULL");

        if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
            if let Ok(code) = q.parse::<i64>() {
                qb.push(" AND e.lex_cod = ");
                qb.push_bind(code);
            } else {
                qb.push(" AND l.li_titulo ILIKE ");
                qb.push_bind(format!("%{}%", q));
            }
        }

        qb.push(" ORDER BY l.li_titulo ASC");

        let entries = qb
            .build_query_as::<DashboardEntry>()
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    /// Mark a requisition as picked up and stamp the pickup date.
    pub async fn mark_picked_up(&self, re_cod: i64) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE requisicao SET re_emprestado = TRUE, re_data_requisicao = NOW() WHERE re_cod = $1",
        )
        .bind(re_cod)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Requisition with id {} not found",
                re_cod
            )));
        }
        Ok(())
    }

    /// Record the return of a requisition.
    pub async fn mark_returned(&self, re_cod: i64) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE requisicao SET re_data_devolucao = NOW() WHERE re_cod = $1")
                .bind(re_cod)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Requisition with id {} not found",
                re_cod
            )));
        }
        Ok(())
    }

    /// Current borrow/return state of a requisition.
    pub async fn get_state(&self, re_cod: i64) -> AppResult<RequisitionState> {
        sqlx::query_as::<_, RequisitionState>(
            "SELECT re_cod, re_emprestado, re_data_devolucao FROM requisicao WHERE re_cod = $1",
        )
        .bind(re_cod)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Requisition with id {} not found", re_cod)))
    }

    /// Count requisitions without a recorded return.
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM requisicao WHERE re_data_devolucao IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count picked-up requisitions open longer than the loan period.
    pub async fn count_overdue(&self, period_days: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM requisicao
            WHERE re_data_devolucao IS NULL
              AND re_emprestado = TRUE
              AND re_data_requisicao < NOW() - make_interval(days => $1::int)
            "#,
        )
        .bind(period_days)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Most recent requisitions, newest first.
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<RecentRequisition>> {
        let rows = sqlx::query_as::<_, RecentRequisition>(
            r#"
            SELECT r.re_cod, r.re_data_requisicao, r.re_data_devolucao, l.li_titulo, u.ut_nome
            FROM requisicao r
            JOIN livro_exemplar e ON e.lex_cod = r.re_lex_cod
            JOIN livro l ON l.li_cod = e.lex_li_cod
            LEFT JOIN utente u ON u.ut_cod = r.re_ut_cod
            ORDER BY r.re_data_requisicao DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
