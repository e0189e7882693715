//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, requisitions, stats, tables};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblioteca API",
        version = "0.3.0",
        description = "Library Administration REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Tables
        tables::list_tables,
        tables::get_table_schema,
        tables::list_rows,
        tables::get_row,
        tables::create_row,
        tables::update_row,
        tables::delete_row,
        tables::form_new,
        tables::form_edit,
        tables::lookup,
        // Books
        books::register_book,
        books::get_book,
        books::update_book,
        // Requisitions
        requisitions::dashboard,
        requisitions::pickup,
        requisitions::give_back,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Tables
            tables::TableSummary,
            tables::TableSchemaView,
            tables::FieldView,
            tables::ForeignKeyView,
            tables::SaveResponse,
            crate::models::dataset::ListPage,
            crate::models::dataset::FormData,
            crate::models::dataset::FkOption,
            crate::models::dataset::LookupPage,
            crate::models::dataset::LookupRow,
            // Books
            crate::models::book::RegisterBook,
            crate::models::book::BookDetails,
            crate::models::book::BookAuthor,
            books::RegisterBookResponse,
            // Requisitions
            crate::models::requisition::Dashboard,
            crate::models::requisition::DashboardEntry,
            crate::models::requisition::RecentRequisition,
            crate::models::requisition::Queue,
            requisitions::ActionResponse,
            // Stats
            stats::StatsResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "tables", description = "Generic table listing and forms"),
        (name = "books", description = "Book registration"),
        (name = "requisitions", description = "Requisition dashboard"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
