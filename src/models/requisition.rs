//! Requisition (loan) models and queue classification.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Which active dashboard queue a requisition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Queue {
    /// Reserved, waiting for the patron to pick the copy up
    Pickup,
    /// Picked up, waiting to be returned
    Return,
}

/// Borrow/return state of a requisition row.
#[derive(Debug, Clone, FromRow)]
pub struct RequisitionState {
    pub re_cod: i64,
    pub re_emprestado: bool,
    pub re_data_devolucao: Option<DateTime<Utc>>,
}

impl RequisitionState {
    /// Active-queue membership. A returned requisition is in neither queue.
    pub fn queue(&self) -> Option<Queue> {
        if self.re_data_devolucao.is_some() {
            return None;
        }
        if self.re_emprestado {
            Some(Queue::Return)
        } else {
            Some(Queue::Pickup)
        }
    }
}

/// One dashboard card: requisition, copy, book title, patron.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct DashboardEntry {
    pub re_cod: i64,
    pub lex_cod: i64,
    pub li_titulo: String,
    pub ut_nome: Option<String>,
}

/// Both active queues.
#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    pub para_levantar: Vec<DashboardEntry>,
    pub para_devolver: Vec<DashboardEntry>,
}

/// A recent requisition for the overview page.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct RecentRequisition {
    pub re_cod: i64,
    pub re_data_requisicao: Option<DateTime<Utc>>,
    pub re_data_devolucao: Option<DateTime<Utc>>,
    pub li_titulo: String,
    pub ut_nome: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(emprestado: bool, devolvido: bool) -> RequisitionState {
        RequisitionState {
            re_cod: 1,
            re_emprestado: emprestado,
            re_data_devolucao: devolvido.then(Utc::now),
        }
    }

    #[test]
    fn reserved_requisition_is_only_in_pickup_queue() {
        assert_eq!(state(false, false).queue(), Some(Queue::Pickup));
    }

    #[test]
    fn picked_up_requisition_moves_to_return_queue() {
        assert_eq!(state(true, false).queue(), Some(Queue::Return));
    }

    #[test]
    fn returned_requisition_leaves_both_queues() {
        assert_eq!(state(true, true).queue(), None);
        assert_eq!(state(false, true).queue(), None);
    }
}
