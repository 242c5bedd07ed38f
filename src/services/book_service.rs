//! 图书服务：目录 CRUD 与 ISBN 校验

use crate::{
    error::AppError,
    models::book::*,
    repository::BookRepository,
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct BookService {
    db: PgPool,
}

impl BookService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 创建图书
    pub async fn create_book(&self, req: &CreateBookRequest) -> Result<Book, AppError> {
        validate_isbn(&req.isbn)?;

        let repo = BookRepository::new(self.db.clone());
        let book = repo.insert(req).await?;

        tracing::info!(book_id = %book.id, isbn = %book.isbn, "Book created");

        Ok(book)
    }

    /// 根据 ID 获取图书
    pub async fn get_book(&self, id: Uuid) -> Result<Book, AppError> {
        let repo = BookRepository::new(self.db.clone());
        repo.find_by_id(&id).await?.ok_or(AppError::BookNotFound)
    }

    /// 列出图书
    pub async fn list_books(&self, limit: i64, offset: i64) -> Result<Vec<Book>, AppError> {
        let repo = BookRepository::new(self.db.clone());
        repo.list(limit, offset).await
    }

    /// 根据 ISBN 查找图书
    pub async fn find_by_isbn(&self, isbn: &str) -> Result<Book, AppError> {
        validate_isbn(isbn)?;

        let repo = BookRepository::new(self.db.clone());
        repo.find_by_isbn(isbn).await?.ok_or(AppError::BookNotFound)
    }

    /// 更新图书
    pub async fn update_book(&self, id: Uuid, patch: &UpdateBookRequest) -> Result<Book, AppError> {
        if let Some(isbn) = &patch.isbn {
            validate_isbn(isbn)?;
        }

        let repo = BookRepository::new(self.db.clone());
        let book = repo.update(id, patch).await?.ok_or(AppError::BookNotFound)?;

        tracing::info!(book_id = %book.id, "Book updated");

        Ok(book)
    }

    /// 删除图书
    pub async fn delete_book(&self, id: Uuid) -> Result<bool, AppError> {
        let repo = BookRepository::new(self.db.clone());

        let deleted = repo.delete(id).await?;
        if !deleted {
            return Err(AppError::BookNotFound);
        }

        tracing::info!(book_id = %id, "Book deleted");

        Ok(true)
    }
}

/// ISBN-13 校验：13 位纯数字
pub fn validate_isbn(isbn: &str) -> Result<(), AppError> {
    if isbn.len() == 13 && isbn.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(AppError::InvalidIsbn(isbn.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_isbn_accepts_13_digits() {
        assert!(validate_isbn("9780306406157").is_ok());
    }

    #[test]
    fn test_validate_isbn_rejects_bad_input() {
        assert!(validate_isbn("978030640615").is_err()); // 12 位
        assert!(validate_isbn("97803064061577").is_err()); // 14 位
        assert!(validate_isbn("978-030640615").is_err()); // 含连字符
        assert!(validate_isbn("").is_err());
        assert!(validate_isbn("97803064O6157").is_err()); // 字母 O
    }
}
