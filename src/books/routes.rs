use axum::{
    Router,
    routing::{get, put},
};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(handler::list_books).post(handler::create_book))
        .route("/books/:id", put(handler::update_book).delete(handler::delete_book))
}
