//! Generic table endpoints: listing, forms, saves, deletes and lookups.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{
        dataset::{FormData, ListPage, LookupPage},
        record::Record,
    },
    schema::{registry, FieldKind, TableSchema},
};

use super::AuthenticatedUser;

/// List query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Page number (1-based, default 1)
    pub page: Option<i64>,
    /// Free-text search over the loaded page
    pub search: Option<String>,
}

/// Lookup query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct LookupQuery {
    /// Search text; an integer matches the code exactly
    pub q: Option<String>,
    /// Page number (1-based, default 1)
    pub page: Option<i64>,
}

/// Summary of a configured table
#[derive(Serialize, ToSchema)]
pub struct TableSummary {
    pub name: String,
    pub label: String,
    /// Resolved single-column primary key, when the generic flow applies
    pub primary_key: Option<String>,
}

/// Foreign-key description of a field
#[derive(Serialize, ToSchema)]
pub struct ForeignKeyView {
    pub table: String,
    pub key_column: Option<String>,
    pub display_column: String,
    /// Whether the target has a registered lookup popup
    pub has_lookup: bool,
}

/// One field of a table schema
#[derive(Serialize, ToSchema)]
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub kind: String,
    pub required: bool,
    pub show_in_form: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKeyView>,
}

/// Full schema of a table
#[derive(Serialize, ToSchema)]
pub struct TableSchemaView {
    pub name: String,
    pub label: String,
    pub primary_key: Option<String>,
    pub fields: Vec<FieldView>,
}

/// Outcome of a save operation
#[derive(Serialize, ToSchema)]
pub struct SaveResponse {
    pub status: String,
}

impl From<&TableSchema> for TableSchemaView {
    fn from(schema: &TableSchema) -> Self {
        let fields = schema
            .fields
            .iter()
            .map(|(name, spec)| {
                let (kind, foreign_key) = match &spec.kind {
                    FieldKind::Text => ("text", None),
                    FieldKind::Number => ("number", None),
                    FieldKind::Boolean => ("boolean", None),
                    FieldKind::Date => ("date", None),
                    FieldKind::Password => ("password", None),
                    FieldKind::ForeignKey(fk) => (
                        "foreign_key",
                        Some(ForeignKeyView {
                            table: fk.table.to_string(),
                            key_column: fk.key_column.map(str::to_string),
                            display_column: fk.display_column.to_string(),
                            has_lookup: crate::repository::lookups::lookup_spec(fk.table)
                                .is_some(),
                        }),
                    ),
                };
                FieldView {
                    name: (*name).to_string(),
                    label: spec.label.to_string(),
                    kind: kind.to_string(),
                    required: spec.required,
                    show_in_form: spec.show_in_form,
                    foreign_key,
                }
            })
            .collect();

        Self {
            name: schema.name.to_string(),
            label: schema.label.to_string(),
            primary_key: schema.resolve_key().map(str::to_string),
            fields,
        }
    }
}

/// List the configured tables
#[utoipa::path(
    get,
    path = "/tables",
    tag = "tables",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Configured tables", body = Vec<TableSummary>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_tables(
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> Json<Vec<TableSummary>> {
    let tables = registry()
        .tables()
        .map(|schema| TableSummary {
            name: schema.name.to_string(),
            label: schema.label.to_string(),
            primary_key: schema.resolve_key().map(str::to_string),
        })
        .collect();
    Json(tables)
}

/// Get the schema of a table
#[utoipa::path(
    get,
    path = "/tables/{table}/schema",
    tag = "tables",
    security(("bearer_auth" = [])),
    params(
        ("table" = String, Path, description = "Table name")
    ),
    responses(
        (status = 200, description = "Table schema", body = TableSchemaView),
        (status = 404, description = "Table not configured")
    )
)]
pub async fn get_table_schema(
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(table): Path<String>,
) -> AppResult<Json<TableSchemaView>> {
    let schema = registry().get(&table).ok_or_else(|| {
        crate::error::AppError::TableNotConfigured(format!("Table {} is not configured", table))
    })?;
    Ok(Json(TableSchemaView::from(schema)))
}

/// List one page of rows with search and foreign-key display maps
#[utoipa::path(
    get,
    path = "/tables/{table}/rows",
    tag = "tables",
    security(("bearer_auth" = [])),
    params(
        ("table" = String, Path, description = "Table name"),
        ListQuery
    ),
    responses(
        (status = 200, description = "One page of rows", body = ListPage),
        (status = 404, description = "Table not configured")
    )
)]
pub async fn list_rows(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(table): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ListPage>> {
    let page = state
        .services
        .dataset
        .list(&table, query.page.unwrap_or(1), query.search.as_deref())
        .await?;
    Ok(Json(page))
}

/// Get a single row by primary key
#[utoipa::path(
    get,
    path = "/tables/{table}/rows/{key}",
    tag = "tables",
    security(("bearer_auth" = [])),
    params(
        ("table" = String, Path, description = "Table name"),
        ("key" = String, Path, description = "Primary key value")
    ),
    responses(
        (status = 200, description = "The row", body = Object),
        (status = 404, description = "Table not configured or row missing")
    )
)]
pub async fn get_row(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path((table, key)): Path<(String, String)>,
) -> AppResult<Json<Record>> {
    let record = state.services.dataset.get_record(&table, &key).await?;
    Ok(Json(record))
}

/// Create a row from a form payload
#[utoipa::path(
    post,
    path = "/tables/{table}/rows",
    tag = "tables",
    security(("bearer_auth" = [])),
    params(
        ("table" = String, Path, description = "Table name")
    ),
    request_body = Object,
    responses(
        (status = 201, description = "Row created", body = SaveResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Table not configured")
    )
)]
pub async fn create_row(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(table): Path<String>,
    Json(payload): Json<Record>,
) -> AppResult<(StatusCode, Json<SaveResponse>)> {
    state.services.dataset.create(&table, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(SaveResponse {
            status: "created".to_string(),
        }),
    ))
}

/// Update a row by primary key
#[utoipa::path(
    put,
    path = "/tables/{table}/rows/{key}",
    tag = "tables",
    security(("bearer_auth" = [])),
    params(
        ("table" = String, Path, description = "Table name"),
        ("key" = String, Path, description = "Primary key value")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Row updated", body = SaveResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Table not configured")
    )
)]
pub async fn update_row(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path((table, key)): Path<(String, String)>,
    Json(payload): Json<Record>,
) -> AppResult<Json<SaveResponse>> {
    state.services.dataset.update(&table, &key, payload).await?;
    Ok(Json(SaveResponse {
        status: "updated".to_string(),
    }))
}

/// Delete a row by primary key (no-op when already gone)
#[utoipa::path(
    delete,
    path = "/tables/{table}/rows/{key}",
    tag = "tables",
    security(("bearer_auth" = [])),
    params(
        ("table" = String, Path, description = "Table name"),
        ("key" = String, Path, description = "Primary key value")
    ),
    responses(
        (status = 204, description = "Row deleted"),
        (status = 404, description = "Table not configured")
    )
)]
pub async fn delete_row(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path((table, key)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    state.services.dataset.delete(&table, &key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Hydration data for the create form
#[utoipa::path(
    get,
    path = "/tables/{table}/form",
    tag = "tables",
    security(("bearer_auth" = [])),
    params(
        ("table" = String, Path, description = "Table name")
    ),
    responses(
        (status = 200, description = "Empty form data", body = FormData),
        (status = 404, description = "Table not configured")
    )
)]
pub async fn form_new(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(table): Path<String>,
) -> AppResult<Json<FormData>> {
    let form = state.services.dataset.load_form(&table, None).await?;
    Ok(Json(form))
}

/// Hydration data for the edit form
#[utoipa::path(
    get,
    path = "/tables/{table}/form/{key}",
    tag = "tables",
    security(("bearer_auth" = [])),
    params(
        ("table" = String, Path, description = "Table name"),
        ("key" = String, Path, description = "Primary key value")
    ),
    responses(
        (status = 200, description = "Form data with stored values", body = FormData),
        (status = 404, description = "Table not configured or row missing")
    )
)]
pub async fn form_edit(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path((table, key)): Path<(String, String)>,
) -> AppResult<Json<FormData>> {
    let form = state.services.dataset.load_form(&table, Some(&key)).await?;
    Ok(Json(form))
}

/// Search a foreign-key lookup target
#[utoipa::path(
    get,
    path = "/tables/{table}/lookup",
    tag = "tables",
    security(("bearer_auth" = [])),
    params(
        ("table" = String, Path, description = "Target table name"),
        LookupQuery
    ),
    responses(
        (status = 200, description = "One page of lookup results", body = LookupPage),
        (status = 404, description = "No lookup configured for the table")
    )
)]
pub async fn lookup(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(table): Path<String>,
    Query(query): Query<LookupQuery>,
) -> AppResult<Json<LookupPage>> {
    let page = state
        .services
        .dataset
        .lookup(&table, query.q.as_deref(), query.page.unwrap_or(1))
        .await?;
    Ok(Json(page))
}
