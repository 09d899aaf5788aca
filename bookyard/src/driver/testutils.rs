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

//! Test utilities for the business layer.

use crate::config::DbOptions;
use crate::db;
use crate::driver::Driver;
use crate::model::*;
use bookyard_core::clocks::testutils::SettableClock;
use bookyard_core::clocks::Clock;
use bookyard_core::db::{sqlite, Db, Executor};
use std::sync::Arc;
use tempfile::TempDir;
use time::macros::datetime;

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the driver.
    db: Arc<dyn Db + Send + Sync>,

    /// The clock backing the driver.
    clock: Arc<SettableClock>,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Initializes a new in-memory database and a driver on top of it.
    pub(crate) async fn setup() -> Self {
        Self::setup_with_db(Arc::new(sqlite::testutils::setup().await)).await
    }

    /// Initializes a new database stored in a file within `dir` and a driver on top of it.
    pub(crate) async fn setup_with_file(dir: &TempDir) -> Self {
        let conn_str = format!("sqlite:{}?mode=rwc", dir.path().join("bookyard.db").display());
        Self::setup_with_db(crate::connect(DbOptions::Sqlite(conn_str)).await.unwrap()).await
    }

    /// Initializes the schema of `db` and a driver on top of it.
    async fn setup_with_db(db: Arc<dyn Db + Send + Sync>) -> Self {
        crate::initialize(db.as_ref()).await.unwrap();
        let clock = Arc::new(SettableClock::new(datetime!(2023-12-01 05:50:20.290 UTC)));
        let driver = Driver::new(db.clone(), clock.clone());
        Self { db, clock, driver }
    }

    /// Obtains a direct executor against the database.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Returns the clock backing the driver.
    pub(crate) fn clock(&self) -> &SettableClock {
        &self.clock
    }

    /// Returns a copy of the driver under test.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Stores a book with the given `title` directly in the database.
    pub(crate) async fn put_book(&self, title: &str, author: &str) -> Book {
        let book = Book::new(
            BookId::new_random(),
            BookFields::new(Title::from(title), Author::from(author), None),
        );
        db::create_book(&mut self.ex().await, &book).await.unwrap();
        book
    }

    /// Stores a profile with the given `name` and `email` directly in the database.
    pub(crate) async fn put_profile(&self, name: &str, email: &str) -> Profile {
        let profile = Profile::new(
            ProfileId::new_random(),
            ProfileFields::new(PersonName::from(name), EmailAddress::from(email)),
        );
        db::create_profile(&mut self.ex().await, &profile).await.unwrap();
        profile
    }

    /// Stores a reservation of a new book by a new profile directly in the database.
    pub(crate) async fn put_reservation(&self) -> Reservation {
        let book = self.put_book("Dune", "Herbert").await;
        let profile = self.put_profile("Ana", "ana@example.com").await;
        let reservation = Reservation::new(
            ReservationId::new_random(),
            ReservationFields::new(*book.id(), *profile.id(), None),
            self.clock.now_utc(),
        );
        db::create_reservation(&mut self.ex().await, &reservation).await.unwrap();
        reservation
    }
}
