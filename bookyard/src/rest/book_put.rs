// Bookyard
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! API to replace the contents of a book.

use crate::driver::Driver;
use crate::model::{BookFields, BookId};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use bookyard_core::rest::{JsonBody, PathParam, RestError};

pub(crate) async fn handler(
    State(driver): State<Driver>,
    PathParam(id): PathParam<BookId>,
    JsonBody(fields): JsonBody<BookFields>,
) -> Result<impl IntoResponse, RestError> {
    let book = driver.update_book(id, fields).await?;
    Ok(Json(book))
}

#[cfg(test)]
mod tests {
    use crate::model::*;
    use crate::rest::testutils::*;
    use axum::http;
    use bookyard_core::rest::testutils::*;
    use serde_json::json;

    fn route(id: BookId) -> (http::Method, String) {
        (http::Method::PUT, format!("/api/books/{}", id))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let book = context.put_book("Dune", "Herbert").await;

        let response = OneShotBuilder::new(context.app(), route(*book.id()))
            .send_json(json!({"title": "Dune Messiah", "author": "Frank Herbert"}))
            .await
            .expect_json::<Book>()
            .await;
        let exp_book = Book::new(
            *book.id(),
            BookFields::new(Title::from("Dune Messiah"), Author::from("Frank Herbert"), None),
        );
        assert_eq!(exp_book, response);

        assert_eq!(Some(exp_book), context.get_book(*book.id()).await);
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;

        let book = context.put_book("Dune", "Herbert").await;

        let id = BookId::new_random();
        OneShotBuilder::new(context.app(), route(id))
            .send_json(json!({"title": "Ghost", "author": "Nobody"}))
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error(&format!("Book {} not found", id))
            .await;

        assert_eq!(None, context.get_book(id).await);
        assert_eq!(Some(book.clone()), context.get_book(*book.id()).await);
    }

    #[tokio::test]
    async fn test_validation_error() {
        let context = TestContext::setup().await;

        let book = context.put_book("Dune", "Herbert").await;

        OneShotBuilder::new(context.app(), route(*book.id()))
            .send_json(json!({"title": "Dune", "author": "x".repeat(MAX_AUTHOR_LENGTH + 1)}))
            .await
            .expect_status(http::StatusCode::UNPROCESSABLE_ENTITY)
            .expect_error("Author is too long")
            .await;

        assert_eq!(Some(book.clone()), context.get_book(*book.id()).await);
    }

    test_payload_must_be_json!(
        TestContext::setup().await.into_app(),
        route(BookId::new_random())
    );
}
