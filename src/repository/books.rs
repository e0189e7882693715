//! Books repository for the registration flow.
//!
//! The book, its author links and its physical copies are written in a single
//! transaction: a failure mid-sequence leaves no partial rows behind.

use sqlx::{FromRow, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{BookAuthor, BookDetails, RegisterBook},
};

#[derive(FromRow)]
struct BookRow {
    li_cod: i64,
    li_isbn: Option<String>,
    li_titulo: Option<String>,
    li_genero: Option<String>,
    li_ano: Option<i64>,
    li_edicao: Option<String>,
    li_editora: Option<i64>,
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Register a book with its author links and initial copies.
    pub async fn create(&self, book: &RegisterBook) -> AppResult<i64> {
        let mut tx = self.pool.begin().await?;

        let li_cod: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO livro (li_isbn, li_titulo, li_genero, li_ano, li_edicao, li_editora)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING li_cod
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.titulo)
        .bind(&book.genero)
        .bind(book.ano)
        .bind(&book.edicao)
        .bind(book.editora)
        .fetch_one(&mut *tx)
        .await?;

        for autor in &book.autores {
            sqlx::query("INSERT INTO livro_autor (li_au_livro, li_au_autor) VALUES ($1, $2)")
                .bind(li_cod)
                .bind(*autor)
                .execute(&mut *tx)
                .await?;
        }

        for _ in 0..book.num_exemplares {
            sqlx::query(
                r#"
                INSERT INTO livro_exemplar (lex_li_cod, lex_estado, lex_disponivel, lex_requisitavel)
                VALUES ($1, 'Disponível', TRUE, $2)
                "#,
            )
            .bind(li_cod)
            .bind(book.requisitavel)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(li_cod)
    }

    /// Update a book and replace its author links. Copies are untouched.
    pub async fn update(&self, li_cod: i64, book: &RegisterBook) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE livro
            SET li_isbn = $1, li_titulo = $2, li_genero = $3, li_ano = $4,
                li_edicao = $5, li_editora = $6
            WHERE li_cod = $7
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.titulo)
        .bind(&book.genero)
        .bind(book.ano)
        .bind(&book.edicao)
        .bind(book.editora)
        .bind(li_cod)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                li_cod
            )));
        }

        sqlx::query("DELETE FROM livro_autor WHERE li_au_livro = $1")
            .bind(li_cod)
            .execute(&mut *tx)
            .await?;

        for autor in &book.autores {
            sqlx::query("INSERT INTO livro_autor (li_au_livro, li_au_autor) VALUES ($1, $2)")
                .bind(li_cod)
                .bind(*autor)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Fetch a book with its authors and copy count.
    pub async fn get(&self, li_cod: i64) -> AppResult<BookDetails> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT li_cod, li_isbn, li_titulo, li_genero, li_ano, li_edicao, li_editora
            FROM livro
            WHERE li_cod = $1
            "#,
        )
        .bind(li_cod)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", li_cod)))?;

        let autores = sqlx::query_as::<_, BookAuthor>(
            r#"
            SELECT a.au_cod, a.au_nome
            FROM livro_autor la
            JOIN autor a ON a.au_cod = la.li_au_autor
            WHERE la.li_au_livro = $1
            ORDER BY a.au_nome
            "#,
        )
        .bind(li_cod)
        .fetch_all(&self.pool)
        .await?;

        let num_exemplares: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM livro_exemplar WHERE lex_li_cod = $1")
                .bind(li_cod)
                .fetch_one(&self.pool)
                .await?;

        Ok(BookDetails {
            li_cod: row.li_cod,
            li_isbn: row.li_isbn,
            li_titulo: row.li_titulo,
            li_genero: row.li_genero,
            li_ano: row.li_ano,
            li_edicao: row.li_edicao,
            li_editora: row.li_editora,
            autores,
            num_exemplares,
        })
    }
}
