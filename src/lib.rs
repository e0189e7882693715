//! Biblioteca Library Administration Server
//!
//! A Rust REST server for the Biblioteca admin panel: schema-driven generic
//! list/form operations over the library tables, plus the book registration
//! and requisition dashboard flows.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod schema;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
