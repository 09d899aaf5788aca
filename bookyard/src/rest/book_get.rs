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

//! API to get a single book.

use crate::driver::Driver;
use crate::model::BookId;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use bookyard_core::rest::{EmptyBody, PathParam, RestError};

pub(crate) async fn handler(
    State(driver): State<Driver>,
    PathParam(id): PathParam<BookId>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let book = driver.get_book(id).await?;
    Ok(Json(book))
}

#[cfg(test)]
mod tests {
    use crate::model::*;
    use crate::rest::testutils::*;
    use axum::http;
    use bookyard_core::rest::testutils::*;

    fn route<T: ToString>(id: T) -> (http::Method, String) {
        (http::Method::GET, format!("/api/books/{}", id.to_string()))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let book = context.put_book("Dune", "Herbert").await;
        context.put_book("Emma", "Austen").await;

        let response = OneShotBuilder::new(context.into_app(), route(book.id()))
            .send_empty()
            .await
            .expect_json::<Book>()
            .await;
        assert_eq!(book, response);
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;

        let id = BookId::new_random();
        OneShotBuilder::new(context.into_app(), route(id))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error(&format!("Book {} not found", id))
            .await;
    }

    #[tokio::test]
    async fn test_bad_id() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), route("not-a-uuid"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("Invalid URL")
            .await;
    }

    test_payload_must_be_empty!(
        TestContext::setup().await.into_app(),
        route(BookId::new_random())
    );
}
