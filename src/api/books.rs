//! Book registration endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{BookDetails, RegisterBook},
};

use super::AuthenticatedUser;

/// Registration response
#[derive(Serialize, ToSchema)]
pub struct RegisterBookResponse {
    /// Code of the registered book
    pub li_cod: i64,
    /// Status message
    pub message: String,
}

/// Register a new book with authors and initial copies
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = RegisterBook,
    responses(
        (status = 201, description = "Book registered", body = RegisterBookResponse),
        (status = 400, description = "Validation failed; nothing was written")
    )
)]
pub async fn register_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(request): Json<RegisterBook>,
) -> AppResult<(StatusCode, Json<RegisterBookResponse>)> {
    let num_exemplares = request.num_exemplares;
    let li_cod = state.services.books.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterBookResponse {
            li_cod,
            message: format!(
                "Livro registado com sucesso ({} exemplar(es) criado(s))",
                num_exemplares
            ),
        }),
    ))
}

/// Get a book with its authors and copy count
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book code")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.books.get(id).await?;
    Ok(Json(book))
}

/// Update a book and replace its author links
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book code")
    ),
    request_body = RegisterBook,
    responses(
        (status = 200, description = "Book updated", body = BookDetails),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<RegisterBook>,
) -> AppResult<Json<BookDetails>> {
    state.services.books.update(id, request).await?;
    let book = state.services.books.get(id).await?;
    Ok(Json(book))
}
