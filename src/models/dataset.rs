//! Response shapes for the generic list/form flow.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use utoipa::ToSchema;

use super::record::Record;

/// One page of a table listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListPage {
    /// Rows of the current page (post search filter, if any)
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<Record>,
    /// Per foreign-key field: stored key → display text
    pub display: HashMap<String, HashMap<String, String>>,
    /// Exact row count of the whole table, unaffected by the page search
    pub total: i64,
    /// Current page number (1-based)
    pub page: i64,
    /// Rows per page
    pub per_page: i64,
}

/// Option entry for a select-style foreign key.
#[derive(Debug, Serialize, ToSchema)]
pub struct FkOption {
    /// The key value to store
    #[schema(value_type = Object)]
    pub value: Value,
    /// The display text to render
    pub label: String,
}

/// Hydration data for the create/edit form.
#[derive(Debug, Serialize, ToSchema)]
pub struct FormData {
    /// Field values — empty strings on create, the stored row on edit
    #[schema(value_type = Object)]
    pub values: Record,
    /// Resolved display text per foreign-key field
    pub display: HashMap<String, String>,
    /// Option lists for foreign keys without a registered lookup
    pub options: HashMap<String, Vec<FkOption>>,
}

/// One row of a foreign-key lookup search.
#[derive(Debug, Serialize, ToSchema)]
pub struct LookupRow {
    /// The key value a selection stores
    #[schema(value_type = Object)]
    pub key: Value,
    /// Composed display string
    pub display: String,
}

/// One page of lookup results.
#[derive(Debug, Serialize, ToSchema)]
pub struct LookupPage {
    pub rows: Vec<LookupRow>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}
