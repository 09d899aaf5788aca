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

//! Test utilities for the REST API.

use crate::config::CorsOptions;
use crate::db;
use crate::driver::Driver;
use crate::model::*;
use crate::rest::app;
use axum::Router;
use bookyard_core::clocks::testutils::SettableClock;
use bookyard_core::db::{sqlite, Db};
use std::sync::Arc;
use time::macros::datetime;
use time::OffsetDateTime;
use tower_http::cors::CorsLayer;

/// Fixed time returned by the clock of the app under test.
pub(crate) const NOW: OffsetDateTime = datetime!(2023-12-01 05:50:20 UTC);

pub(crate) struct TestContext {
    db: Arc<dyn Db + Send + Sync>,
    app: Router,
}

impl TestContext {
    pub(crate) async fn setup() -> Self {
        Self::setup_with_cors(CorsOptions::default().layer()).await
    }

    pub(crate) async fn setup_with_cors(cors: CorsLayer) -> Self {
        let db: Arc<dyn Db + Send + Sync> = Arc::new(sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let clock = Arc::new(SettableClock::new(NOW));
        let driver = Driver::new(db.clone(), clock);
        let app = app(driver, cors);
        Self { db, app }
    }

    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    pub(crate) async fn put_book(&self, title: &str, author: &str) -> Book {
        let book = Book::new(
            BookId::new_random(),
            BookFields::new(Title::from(title), Author::from(author), None),
        );
        db::create_book(&mut self.db.ex().await.unwrap(), &book).await.unwrap();
        book
    }

    pub(crate) async fn get_book(&self, id: BookId) -> Option<Book> {
        match db::get_book(&mut self.db.ex().await.unwrap(), id).await {
            Ok(book) => Some(book),
            Err(bookyard_core::db::DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }

    pub(crate) async fn put_profile(&self, name: &str, email: &str) -> Profile {
        let profile = Profile::new(
            ProfileId::new_random(),
            ProfileFields::new(PersonName::from(name), EmailAddress::from(email)),
        );
        db::create_profile(&mut self.db.ex().await.unwrap(), &profile).await.unwrap();
        profile
    }

    pub(crate) async fn get_profile(&self, id: ProfileId) -> Option<Profile> {
        match db::get_profile(&mut self.db.ex().await.unwrap(), id).await {
            Ok(profile) => Some(profile),
            Err(bookyard_core::db::DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }

    pub(crate) async fn put_reservation(&self, book: &Book, profile: &Profile) -> Reservation {
        let reservation = Reservation::new(
            ReservationId::new_random(),
            ReservationFields::new(*book.id(), *profile.id(), None),
            NOW,
        );
        db::create_reservation(&mut self.db.ex().await.unwrap(), &reservation).await.unwrap();
        reservation
    }

    pub(crate) async fn get_reservation(&self, id: ReservationId) -> Option<Reservation> {
        match db::get_reservation(&mut self.db.ex().await.unwrap(), id).await {
            Ok(reservation) => Some(reservation),
            Err(bookyard_core::db::DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }

    pub(crate) async fn count_reservations(&self) -> usize {
        db::list_reservations(&mut self.db.ex().await.unwrap()).await.unwrap().len()
    }
}
