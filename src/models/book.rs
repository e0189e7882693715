//! Book registration models.
//!
//! The specialized multi-step flow: one book row, its author links, and the
//! physical copies created alongside it.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request to register (or update) a book.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterBook {
    #[validate(length(min = 1, message = "ISBN é obrigatório"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "Título é obrigatório"))]
    pub titulo: String,
    pub genero: Option<String>,
    pub ano: Option<i64>,
    pub edicao: Option<String>,
    pub editora: Option<i64>,
    /// Author codes; at least one is required
    #[validate(length(min = 1, message = "Selecione pelo menos um autor"))]
    pub autores: Vec<i64>,
    /// Number of physical copies to create (registration only)
    #[serde(default)]
    pub num_exemplares: i64,
    /// Whether the created copies can be requisitioned
    #[serde(default = "default_requisitavel")]
    pub requisitavel: bool,
}

fn default_requisitavel() -> bool {
    true
}

/// An author attached to a book.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct BookAuthor {
    pub au_cod: i64,
    pub au_nome: String,
}

/// Book details for edit hydration.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookDetails {
    pub li_cod: i64,
    pub li_isbn: Option<String>,
    pub li_titulo: Option<String>,
    pub li_genero: Option<String>,
    pub li_ano: Option<i64>,
    pub li_edicao: Option<String>,
    pub li_editora: Option<i64>,
    pub autores: Vec<BookAuthor>,
    /// Existing copy count — copies are never created from the edit flow
    pub num_exemplares: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterBook {
        RegisterBook {
            isbn: "978-0-00-000000-0".to_string(),
            titulo: "Teste".to_string(),
            genero: None,
            ano: Some(2024),
            edicao: None,
            editora: None,
            autores: vec![3],
            num_exemplares: 2,
            requisitavel: true,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn zero_authors_is_rejected() {
        let mut req = request();
        req.autores.clear();
        let err = req.validate().unwrap_err();
        assert!(err.field_errors().contains_key("autores"));
    }

    #[test]
    fn blank_isbn_and_title_are_rejected() {
        let mut req = request();
        req.isbn.clear();
        req.titulo.clear();
        let err = req.validate().unwrap_err();
        assert!(err.field_errors().contains_key("isbn"));
        assert!(err.field_errors().contains_key("titulo"));
    }
}
