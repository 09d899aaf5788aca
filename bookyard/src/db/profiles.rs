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

//! Persistence of profiles.

use crate::model::{EmailAddress, PersonName, Profile, ProfileFields, ProfileId};
use bookyard_core::db::{ensure_one_row, postgres, sqlite, DbResult, Executor};
use futures::TryStreamExt;
use sqlx::Row;
use uuid::Uuid;

/// Builds a `Profile` from the raw values stored in the database.
fn build_profile(id: Uuid, name: String, email: String) -> DbResult<Profile> {
    let fields = ProfileFields::new(PersonName::new(name)?, EmailAddress::new(email)?);
    Ok(Profile::new(ProfileId::from(id), fields))
}

/// Stores a new `profile`.
///
/// Fails with `DbError::AlreadyExists` if another profile already uses the same email.
pub(crate) async fn create_profile(ex: &mut Executor, profile: &Profile) -> DbResult<()> {
    let fields = profile.fields();

    let rows_affected = match ex {
        Executor::Postgres(ref mut ex) => {
            let query_str = "INSERT INTO profiles (id, name, email) VALUES ($1, $2, $3)";
            sqlx::query(query_str)
                .bind(profile.id().as_uuid())
                .bind(fields.name().as_str())
                .bind(fields.email().as_str())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?
                .rows_affected()
        }

        Executor::Sqlite(ref mut ex) => {
            let query_str = "INSERT INTO profiles (id, name, email) VALUES (?, ?, ?)";
            sqlx::query(query_str)
                .bind(profile.id().as_uuid())
                .bind(fields.name().as_str())
                .bind(fields.email().as_str())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?
                .rows_affected()
        }
    };
    ensure_one_row(rows_affected)
}

/// Gets the profile identified by `id`.
pub(crate) async fn get_profile(ex: &mut Executor, id: ProfileId) -> DbResult<Profile> {
    match ex {
        Executor::Postgres(ref mut ex) => {
            let query_str = "SELECT name, email FROM profiles WHERE id = $1";
            let row = sqlx::query(query_str)
                .bind(id.as_uuid())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
            let email: String = row.try_get("email").map_err(postgres::map_sqlx_error)?;
            build_profile(*id.as_uuid(), name, email)
        }

        Executor::Sqlite(ref mut ex) => {
            let query_str = "SELECT name, email FROM profiles WHERE id = ?";
            let row = sqlx::query(query_str)
                .bind(id.as_uuid())
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
            let email: String = row.try_get("email").map_err(sqlite::map_sqlx_error)?;
            build_profile(*id.as_uuid(), name, email)
        }
    }
}

/// Gets all profiles sorted by name.
pub(crate) async fn list_profiles(ex: &mut Executor) -> DbResult<Vec<Profile>> {
    let mut profiles = vec![];

    // Both backends share the same query because it has no parameters.
    let query_str = "SELECT id, name, email FROM profiles ORDER BY name, id";
    match ex {
        Executor::Postgres(ref mut ex) => {
            let mut rows = sqlx::query(query_str).fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                let id: Uuid = row.try_get("id").map_err(postgres::map_sqlx_error)?;
                let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
                let email: String = row.try_get("email").map_err(postgres::map_sqlx_error)?;
                profiles.push(build_profile(id, name, email)?);
            }
        }

        Executor::Sqlite(ref mut ex) => {
            let mut rows = sqlx::query(query_str).fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                let id: Uuid = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
                let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
                let email: String = row.try_get("email").map_err(sqlite::map_sqlx_error)?;
                profiles.push(build_profile(id, name, email)?);
            }
        }
    }

    Ok(profiles)
}

/// Replaces the contents of an existing `profile`.
///
/// Fails with `DbError::NotFound` without writing anything if the profile does not exist, and
/// with `DbError::AlreadyExists` if the new email is in use by another profile.
pub(crate) async fn update_profile(ex: &mut Executor, profile: &Profile) -> DbResult<()> {
    let fields = profile.fields();

    let rows_affected = match ex {
        Executor::Postgres(ref mut ex) => {
            let query_str = "UPDATE profiles SET name = $1, email = $2 WHERE id = $3";
            sqlx::query(query_str)
                .bind(fields.name().as_str())
                .bind(fields.email().as_str())
                .bind(profile.id().as_uuid())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?
                .rows_affected()
        }

        Executor::Sqlite(ref mut ex) => {
            let query_str = "UPDATE profiles SET name = ?, email = ? WHERE id = ?";
            sqlx::query(query_str)
                .bind(fields.name().as_str())
                .bind(fields.email().as_str())
                .bind(profile.id().as_uuid())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?
                .rows_affected()
        }
    };
    ensure_one_row(rows_affected)
}

/// Deletes the profile identified by `id` and, via the schema, all of its reservations.
pub(crate) async fn delete_profile(ex: &mut Executor, id: ProfileId) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ref mut ex) => {
            let query_str = "DELETE FROM profiles WHERE id = $1";
            sqlx::query(query_str)
                .bind(id.as_uuid())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?
                .rows_affected()
        }

        Executor::Sqlite(ref mut ex) => {
            let query_str = "DELETE FROM profiles WHERE id = ?";
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
