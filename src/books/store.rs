use anyhow::Result;
use libsql::Connection;

use super::{Book, BookFields};

pub struct BookStore<'a> {
    conn: &'a Connection,
}

impl<'a> BookStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub async fn list_books(&self) -> Result<Vec<Book>> {
        let query = r#"
            SELECT id, title, author
            FROM books
            ORDER BY id
        "#;

        let mut rows = self.conn.query(query, ()).await?;
        let mut books = Vec::new();

        while let Some(row) = rows.next().await? {
            books.push(self.row_to_book(&row)?);
        }

        Ok(books)
    }

    pub async fn get_book(&self, id: i64) -> Result<Option<Book>> {
        let query = r#"
            SELECT id, title, author
            FROM books WHERE id = ?
        "#;

        let mut rows = self.conn.query(query, libsql::params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(self.row_to_book(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn create_book(&self, input: &BookFields) -> Result<Book> {
        let query = r#"
            INSERT INTO books (title, author)
            VALUES (?, ?)
            RETURNING id, title, author
        "#;

        let mut rows = self
            .conn
            .query(query, libsql::params![input.title.as_str(), input.author.as_str()])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(self.row_to_book(&row)?)
        } else {
            anyhow::bail!("Failed to create book")
        }
    }

    /// Overwrites both fields. `None` when no book has this id.
    pub async fn update_book(&self, id: i64, input: &BookFields) -> Result<Option<Book>> {
        let query = r#"
            UPDATE books SET title = ?, author = ?
            WHERE id = ?
            RETURNING id, title, author
        "#;

        let mut rows = self
            .conn
            .query(
                query,
                libsql::params![input.title.as_str(), input.author.as_str(), id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(self.row_to_book(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn delete_book(&self, id: i64) -> Result<bool> {
        let result = self
            .conn
            .execute("DELETE FROM books WHERE id = ?", libsql::params![id])
            .await?;
        Ok(result > 0)
    }

    fn row_to_book(&self, row: &libsql::Row) -> Result<Book> {
        Ok(Book {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn fields(title: &str, author: &str) -> BookFields {
        BookFields {
            title: title.to_string(),
            author: author.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let db = Database::in_memory().await.unwrap();
        let store = BookStore::new(db.connection());

        let first = store.create_book(&fields("Dune", "Frank Herbert")).await.unwrap();
        let second = store.create_book(&fields("Emma", "Jane Austen")).await.unwrap();
        assert!(second.id > first.id);

        let all = store.list_books().await.unwrap();
        assert_eq!(all, vec![first, second]);
    }

    #[tokio::test]
    async fn test_get_missing_book() {
        let db = Database::in_memory().await.unwrap();
        let store = BookStore::new(db.connection());
        assert!(store.get_book(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = Database::in_memory().await.unwrap();
        let store = BookStore::new(db.connection());
        let book = store.create_book(&fields("Dune", "Frank Herbert")).await.unwrap();

        let updated = store
            .update_book(book.id, &fields("Dune", "F. Herbert"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, book.id);
        assert_eq!(updated.author, "F. Herbert");
        assert_eq!(store.get_book(book.id).await.unwrap(), Some(updated));

        assert!(store.update_book(999, &fields("x", "y")).await.unwrap().is_none());

        assert!(store.delete_book(book.id).await.unwrap());
        assert!(!store.delete_book(book.id).await.unwrap());
        assert!(store.list_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_ids_are_not_reused() {
        let db = Database::in_memory().await.unwrap();
        let store = BookStore::new(db.connection());

        let first = store.create_book(&fields("Dune", "Frank Herbert")).await.unwrap();
        store.delete_book(first.id).await.unwrap();
        let second = store.create_book(&fields("Emma", "Jane Austen")).await.unwrap();
        assert!(second.id > first.id);
    }
}
