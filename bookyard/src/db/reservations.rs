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

//! Persistence of reservations.
//!
//! PostgreSQL stores the creation time natively while SQLite stores it as a pair of integer
//! columns holding the seconds and nanoseconds since the epoch.

use crate::model::{BookId, Note, ProfileId, Reservation, ReservationFields, ReservationId};
use bookyard_core::db::{ensure_one_row, postgres, sqlite, DbResult, Executor};
use futures::TryStreamExt;
use sqlx::Row;
use time::OffsetDateTime;
use uuid::Uuid;

/// Builds a `Reservation` from the raw values stored in the database.
fn build_reservation(
    id: Uuid,
    book_id: Uuid,
    profile_id: Uuid,
    note: Option<String>,
    created: OffsetDateTime,
) -> DbResult<Reservation> {
    let note = note.map(Note::new).transpose()?;
    let fields = ReservationFields::new(BookId::from(book_id), ProfileId::from(profile_id), note);
    Ok(Reservation::new(ReservationId::from(id), fields, created))
}

/// Stores a new `reservation`.
///
/// Fails with `DbError::NotFound` if the referenced book or profile do not exist.
pub(crate) async fn create_reservation(
    ex: &mut Executor,
    reservation: &Reservation,
) -> DbResult<()> {
    let fields = reservation.fields();
    let note = fields.note().as_ref().map(Note::as_str);

    let rows_affected = match ex {
        Executor::Postgres(ref mut ex) => {
            let query_str = "
                INSERT INTO reservations (id, book_id, profile_id, note, created)
                VALUES ($1, $2, $3, $4, $5)
            ";
            sqlx::query(query_str)
                .bind(reservation.id().as_uuid())
                .bind(fields.book_id().as_uuid())
                .bind(fields.profile_id().as_uuid())
                .bind(note)
                .bind(*reservation.created())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?
                .rows_affected()
        }

        Executor::Sqlite(ref mut ex) => {
            let (created_sec, created_nsec) = sqlite::unpack_timestamp(*reservation.created());

            let query_str = "
                INSERT INTO reservations
                    (id, book_id, profile_id, note, created_sec, created_nsec)
                VALUES (?, ?, ?, ?, ?, ?)
            ";
            sqlx::query(query_str)
                .bind(reservation.id().as_uuid())
                .bind(fields.book_id().as_uuid())
                .bind(fields.profile_id().as_uuid())
                .bind(note)
                .bind(created_sec)
                .bind(created_nsec)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?
                .rows_affected()
        }
    };
    ensure_one_row(rows_affected)
}

/// Gets the reservation identified by `id`.
pub(crate) async fn get_reservation(ex: &mut Executor, id: ReservationId) -> DbResult<Reservation> {
    match ex {
        Executor::Postgres(ref mut ex) => {
            let query_str = "
                SELECT book_id, profile_id, note, created
                FROM reservations
                WHERE id = $1
            ";
            let row = sqlx::query(query_str)
                .bind(id.as_uuid())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            let book_id: Uuid = row.try_get("book_id").map_err(postgres::map_sqlx_error)?;
            let profile_id: Uuid = row.try_get("profile_id").map_err(postgres::map_sqlx_error)?;
            let note: Option<String> = row.try_get("note").map_err(postgres::map_sqlx_error)?;
            let created: OffsetDateTime =
                row.try_get("created").map_err(postgres::map_sqlx_error)?;
            build_reservation(*id.as_uuid(), book_id, profile_id, note, created)
        }

        Executor::Sqlite(ref mut ex) => {
            let query_str = "
                SELECT book_id, profile_id, note, created_sec, created_nsec
                FROM reservations
                WHERE id = ?
            ";
            let row = sqlx::query(query_str)
                .bind(id.as_uuid())
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            let book_id: Uuid = row.try_get("book_id").map_err(sqlite::map_sqlx_error)?;
            let profile_id: Uuid = row.try_get("profile_id").map_err(sqlite::map_sqlx_error)?;
            let note: Option<String> = row.try_get("note").map_err(sqlite::map_sqlx_error)?;
            let created_sec: i64 = row.try_get("created_sec").map_err(sqlite::map_sqlx_error)?;
            let created_nsec: i64 = row.try_get("created_nsec").map_err(sqlite::map_sqlx_error)?;
            let created = sqlite::build_timestamp(created_sec, created_nsec)?;
            build_reservation(*id.as_uuid(), book_id, profile_id, note, created)
        }
    }
}

/// Gets all reservations sorted by creation time, oldest first.
pub(crate) async fn list_reservations(ex: &mut Executor) -> DbResult<Vec<Reservation>> {
    let mut reservations = vec![];

    match ex {
        Executor::Postgres(ref mut ex) => {
            let query_str = "
                SELECT id, book_id, profile_id, note, created
                FROM reservations
                ORDER BY created, id
            ";
            let mut rows = sqlx::query(query_str).fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                let id: Uuid = row.try_get("id").map_err(postgres::map_sqlx_error)?;
                let book_id: Uuid = row.try_get("book_id").map_err(postgres::map_sqlx_error)?;
                let profile_id: Uuid =
                    row.try_get("profile_id").map_err(postgres::map_sqlx_error)?;
                let note: Option<String> = row.try_get("note").map_err(postgres::map_sqlx_error)?;
                let created: OffsetDateTime =
                    row.try_get("created").map_err(postgres::map_sqlx_error)?;
                reservations.push(build_reservation(id, book_id, profile_id, note, created)?);
            }
        }

        Executor::Sqlite(ref mut ex) => {
            let query_str = "
                SELECT id, book_id, profile_id, note, created_sec, created_nsec
                FROM reservations
                ORDER BY created_sec, created_nsec, id
            ";
            let mut rows = sqlx::query(query_str).fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                let id: Uuid = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
                let book_id: Uuid = row.try_get("book_id").map_err(sqlite::map_sqlx_error)?;
                let profile_id: Uuid = row.try_get("profile_id").map_err(sqlite::map_sqlx_error)?;
                let note: Option<String> = row.try_get("note").map_err(sqlite::map_sqlx_error)?;
                let created_sec: i64 =
                    row.try_get("created_sec").map_err(sqlite::map_sqlx_error)?;
                let created_nsec: i64 =
                    row.try_get("created_nsec").map_err(sqlite::map_sqlx_error)?;
                let created = sqlite::build_timestamp(created_sec, created_nsec)?;
                reservations.push(build_reservation(id, book_id, profile_id, note, created)?);
            }
        }
    }

    Ok(reservations)
}

/// Replaces the user-provided contents of an existing `reservation`.
///
/// The creation time is never modified.  Fails with `DbError::NotFound` without writing anything
/// if the reservation does not exist or if the new references do not exist.
pub(crate) async fn update_reservation(
    ex: &mut Executor,
    reservation: &Reservation,
) -> DbResult<()> {
    let fields = reservation.fields();
    let note = fields.note().as_ref().map(Note::as_str);

    let rows_affected = match ex {
        Executor::Postgres(ref mut ex) => {
            let query_str = "
                UPDATE reservations
                SET book_id = $1, profile_id = $2, note = $3
                WHERE id = $4
            ";
            sqlx::query(query_str)
                .bind(fields.book_id().as_uuid())
                .bind(fields.profile_id().as_uuid())
                .bind(note)
                .bind(reservation.id().as_uuid())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?
                .rows_affected()
        }

        Executor::Sqlite(ref mut ex) => {
            let query_str = "
                UPDATE reservations
                SET book_id = ?, profile_id = ?, note = ?
                WHERE id = ?
            ";
            sqlx::query(query_str)
                .bind(fields.book_id().as_uuid())
                .bind(fields.profile_id().as_uuid())
                .bind(note)
                .bind(reservation.id().as_uuid())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?
                .rows_affected()
        }
    };
    ensure_one_row(rows_affected)
}

/// Deletes the reservation identified by `id`.
pub(crate) async fn delete_reservation(ex: &mut Executor, id: ReservationId) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ref mut ex) => {
            let query_str = "DELETE FROM reservations WHERE id = $1";
            sqlx::query(query_str)
                .bind(id.as_uuid())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?
                .rows_affected()
        }

        Executor::Sqlite(ref mut ex) => {
            let query_str = "DELETE FROM reservations WHERE id = ?";
            sqlx::query(query_str)
                .bind(id.as_uuid())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?
                .rows_affected()
        }
    };
    ensure_one_row(rows_affected)
}
