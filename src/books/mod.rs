//! Books Module
//!
//! The single resource exposed by the service: a book with a title and an
//! author. Ids are assigned by storage on insert and never reused.
//!
//! # Endpoints
//!
//! - `GET /books` lists every book
//! - `POST /books` creates a book, `201` with the stored record
//! - `PUT /books/:id` replaces title and author (both required), `200` with the stored record
//! - `DELETE /books/:id` removes a book, `204`
//!
//! Invalid bodies answer `400` with a `{field: [reasons]}` map and never touch
//! storage. Unknown ids answer `404` with an empty body.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bookshelf::books;
//!
//! let app = Router::new()
//!     .merge(books::routes())
//!     .with_state(app_state);
//!
//! let store = books::BookStore::new(db.connection());
//! let all = store.list_books().await?;
//! ```

mod handler;
mod routes;
mod store;
mod validate;

pub use routes::routes;
pub use store::*;
pub use validate::*;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
}

/// Returns the migrations for the books module.
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[("books_001_schema.sql", include_str!("migrations/001_schema.sql"))]
}
