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

//! Entry point to the REST server.

use crate::driver::Driver;
use axum::response::{IntoResponse, Response};
use axum::Router;
use bookyard_core::rest::RestError;
use log::error;
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

mod book_delete;
mod book_get;
mod book_put;
mod books_get;
mod books_post;
mod health_get;
mod profile_delete;
mod profile_get;
mod profile_put;
mod profiles_get;
mod profiles_post;
mod reservation_delete;
mod reservation_get;
mod reservation_put;
mod reservations_get;
mod reservations_post;
mod root_get;
#[cfg(test)]
mod testutils;

/// Answers requests to paths that no route handles.
async fn fallback() -> RestError {
    RestError::NotFound("No such resource".to_owned())
}

/// Turns a panic raised by a handler into an internal error response.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!("Request handler panicked: {}", details);
    RestError::InternalError("Internal server error".to_owned()).into_response()
}

/// Creates the router for the application.
pub(crate) fn app(driver: Driver, cors: CorsLayer) -> Router {
    use axum::routing::get;

    let books = Router::new()
        .route("/", get(books_get::handler).post(books_post::handler))
        .route(
            "/:id",
            get(book_get::handler).put(book_put::handler).delete(book_delete::handler),
        );

    let profiles = Router::new()
        .route("/", get(profiles_get::handler).post(profiles_post::handler))
        .route(
            "/:id",
            get(profile_get::handler).put(profile_put::handler).delete(profile_delete::handler),
        );

    let reservations = Router::new()
        .route("/", get(reservations_get::handler).post(reservations_post::handler))
        .route(
            "/:id",
            get(reservation_get::handler)
                .put(reservation_put::handler)
                .delete(reservation_delete::handler),
        );

    Router::new()
        .route("/", get(root_get::handler))
        .route("/health", get(health_get::handler))
        .nest("/api/books", books)
        .nest("/api/profiles", profiles)
        .nest("/api/reservations", reservations)
        .fallback(fallback)
        .with_state(driver)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
}
