//! HTTP Handlers for the Books API

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};

use super::{BookPayload, BookStore};
use crate::error::{ApiError, ApiResult};
use crate::handler::AppState;

/// Only plain decimal ids reach the handlers; anything else is an unknown route.
fn parse_id(raw: &str) -> ApiResult<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::NotFound);
    }
    raw.parse().map_err(|_| ApiError::NotFound)
}

fn read_payload(headers: &HeaderMap, body: &Bytes) -> ApiResult<BookPayload> {
    if !body.is_empty() {
        if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
            let content_type = content_type.to_str().unwrap_or_default();
            let essence = content_type.split(';').next().unwrap_or_default().trim();
            if !essence.eq_ignore_ascii_case("application/json") {
                return Err(ApiError::UnsupportedMediaType(content_type.to_string()));
            }
        }
    }

    BookPayload::parse(body)
}

pub async fn list_books(State(state): State<AppState>) -> ApiResult<Response> {
    let books = BookStore::new(state.db.connection())
        .list_books()
        .await
        .map_err(ApiError::storage("list books"))?;

    tracing::info!(count = books.len(), "got books");
    Ok((StatusCode::OK, Json(books)).into_response())
}

pub async fn create_book(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let fields = read_payload(&headers, &body)?
        .validate()
        .inspect_err(|errors| tracing::debug!(%errors, "rejected new book"))?;

    let book = BookStore::new(state.db.connection())
        .create_book(&fields)
        .await
        .map_err(ApiError::storage("create book"))?;

    tracing::info!(book_id = book.id, "created book");
    Ok((StatusCode::CREATED, Json(book)).into_response())
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let id = parse_id(&id)?;
    let store = BookStore::new(state.db.connection());

    // the body is only looked at once the book is known to exist
    store
        .get_book(id)
        .await
        .map_err(ApiError::storage("get book"))?
        .ok_or(ApiError::NotFound)?;

    let fields = read_payload(&headers, &body)?
        .validate()
        .inspect_err(|errors| tracing::debug!(book_id = id, %errors, "rejected book update"))?;

    // deleted between the lookup and the write
    let book = store
        .update_book(id, &fields)
        .await
        .map_err(ApiError::storage("update book"))?
        .ok_or(ApiError::NotFound)?;

    tracing::info!(book_id = book.id, "updated book");
    Ok((StatusCode::OK, Json(book)).into_response())
}

pub async fn delete_book(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let id = parse_id(&id)?;

    let deleted = BookStore::new(state.db.connection())
        .delete_book(id)
        .await
        .map_err(ApiError::storage("delete book"))?;

    if !deleted {
        return Err(ApiError::NotFound);
    }

    tracing::info!(book_id = id, "deleted book");
    Ok(StatusCode::NO_CONTENT.into_response())
}
