//! Book repository (数据库访问层)

use crate::{error::AppError, models::book::*};
use sqlx::PgPool;
use uuid::Uuid;

pub struct BookRepository {
    db: PgPool,
}

impl BookRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 根据 ID 查找图书
    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<Book>, AppError> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(book)
    }

    /// 根据 ISBN 查找图书
    pub async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, AppError> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.db)
            .await?;

        Ok(book)
    }

    /// 列出所有图书
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Book>, AppError> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(books)
    }

    /// 创建图书
    pub async fn insert(&self, req: &CreateBookRequest) -> Result<Book, AppError> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, description, publication_date, language, genre, cover_image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&req.title)
        .bind(&req.author)
        .bind(&req.isbn)
        .bind(&req.description)
        .bind(req.publication_date)
        .bind(&req.language)
        .bind(&req.genre)
        .bind(&req.cover_image)
        .fetch_one(&self.db)
        .await
        .map_err(map_isbn_violation)?;

        Ok(book)
    }

    /// 按补丁更新图书
    pub async fn update(&self, id: Uuid, patch: &UpdateBookRequest) -> Result<Option<Book>, AppError> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                isbn = COALESCE($4, isbn),
                description = COALESCE($5, description),
                publication_date = COALESCE($6, publication_date),
                language = COALESCE($7, language),
                genre = COALESCE($8, genre),
                cover_image = COALESCE($9, cover_image),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.author)
        .bind(&patch.isbn)
        .bind(&patch.description)
        .bind(patch.publication_date)
        .bind(&patch.language)
        .bind(&patch.genre)
        .bind(&patch.cover_image)
        .fetch_optional(&self.db)
        .await
        .map_err(map_isbn_violation)?;

        Ok(book)
    }

    /// 删除图书
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// ISBN 唯一约束冲突映射为领域错误
fn map_isbn_violation(e: sqlx::Error) -> AppError {
    let is_isbn_conflict = match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            db_err.constraint() == Some("books_isbn_key")
        }
        _ => false,
    };

    if is_isbn_conflict {
        AppError::BadRequest("A book with this ISBN already exists".to_string())
    } else {
        AppError::Storage(e)
    }
}
