//! Requisition dashboard service

use crate::{
    error::AppResult,
    models::requisition::{Dashboard, RecentRequisition, RequisitionState},
    repository::Repository,
};

/// Requisition counters for the overview page.
#[derive(Debug)]
pub struct RequisitionStats {
    pub active: i64,
    pub overdue: i64,
    pub recent: Vec<RecentRequisition>,
}

#[derive(Clone)]
pub struct RequisitionsService {
    repository: Repository,
}

impl RequisitionsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Both active queues, optionally filtered by copy code or title.
    pub async fn dashboard(&self, query: Option<&str>) -> AppResult<Dashboard> {
        let para_levantar = self.repository.requisitions.queue(false, query).await?;
        let para_devolver = self.repository.requisitions.queue(true, query).await?;
        Ok(Dashboard {
            para_levantar,
            para_devolver,
        })
    }

    /// Mark a requisition as picked up and report its new state.
    pub async fn pickup(&self, re_cod: i64) -> AppResult<RequisitionState> {
        self.repository.requisitions.mark_picked_up(re_cod).await?;
        self.repository.requisitions.get_state(re_cod).await
    }

    /// Record a return and report the new state.
    pub async fn give_back(&self, re_cod: i64) -> AppResult<RequisitionState> {
        self.repository.requisitions.mark_returned(re_cod).await?;
        self.repository.requisitions.get_state(re_cod).await
    }

    /// Overview counters and the ten most recent requisitions.
    pub async fn stats(&self, period_days: i64) -> AppResult<RequisitionStats> {
        let active = self.repository.requisitions.count_active().await?;
        let overdue = self.repository.requisitions.count_overdue(period_days).await?;
        let recent = self.repository.requisitions.recent(10).await?;
        Ok(RequisitionStats {
            active,
            overdue,
            recent,
        })
    }
}
