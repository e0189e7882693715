//! Data models for Biblioteca

pub mod book;
pub mod dataset;
pub mod record;
pub mod requisition;

// Re-export commonly used types
pub use book::{BookAuthor, BookDetails, RegisterBook};
pub use dataset::{FkOption, FormData, ListPage, LookupPage, LookupRow};
pub use record::{Record, Scalar};
pub use requisition::{Dashboard, DashboardEntry, Queue, RecentRequisition, RequisitionState};
