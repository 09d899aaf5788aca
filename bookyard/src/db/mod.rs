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

//! Database abstractions to persist books, profiles and reservations.
//!
//! Every operation is a free function that takes an `Executor`, so callers decide whether the
//! operation runs directly against the pool or inside an open transaction.

use bookyard_core::db::{postgres, sqlite, DbResult, Executor};
use log::info;

mod books;
pub(crate) use books::{create_book, delete_book, get_book, list_books, update_book};
mod profiles;
pub(crate) use profiles::{
    create_profile, delete_profile, get_profile, list_profiles, update_profile,
};
mod reservations;
pub(crate) use reservations::{
    create_reservation, delete_reservation, get_reservation, list_reservations, update_reservation,
};


/// Initializes the database schema.
///
/// This is idempotent: existing tables are left untouched so it is safe to call on every startup.
pub(crate) async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    info!("Initializing database schema");
    match ex {
        Executor::Postgres(ref mut ex) => {
            postgres::run_schema(ex, include_str!("postgres.sql")).await
        }

        Executor::Sqlite(ref mut ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,
    }
}
