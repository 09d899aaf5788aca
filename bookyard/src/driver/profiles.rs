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

//! Operations on profiles.

use crate::db;
use crate::driver::{not_found_as, Driver};
use crate::model::{Profile, ProfileFields, ProfileId};
use bookyard_core::db::DbError;
use bookyard_core::driver::{DriverError, DriverResult};

/// Converts a database error raised while writing `fields` into a driver error.
fn write_error(e: DbError, id: ProfileId, fields: &ProfileFields) -> DriverError {
    match e {
        DbError::AlreadyExists => DriverError::AlreadyExists(format!(
            "Email {} is already in use by another profile",
            fields.email().as_str()
        )),
        e => not_found_as(e, format!("Profile {} not found", id)),
    }
}

impl Driver {
    /// Creates a new profile with `fields` and a fresh identifier.
    pub(crate) async fn create_profile(self, fields: ProfileFields) -> DriverResult<Profile> {
        let id = ProfileId::new_random();
        db::create_profile(&mut self.db.ex().await?, &Profile::new(id, fields.clone()))
            .await
            .map_err(|e| write_error(e, id, &fields))?;
        Ok(Profile::new(id, fields))
    }

    /// Deletes the profile `id` and all of its reservations.
    pub(crate) async fn delete_profile(self, id: ProfileId) -> DriverResult<()> {
        db::delete_profile(&mut self.db.ex().await?, id)
            .await
            .map_err(|e| not_found_as(e, format!("Profile {} not found", id)))
    }

    /// Gets the profile `id`.
    pub(crate) async fn get_profile(self, id: ProfileId) -> DriverResult<Profile> {
        db::get_profile(&mut self.db.ex().await?, id)
            .await
            .map_err(|e| not_found_as(e, format!("Profile {} not found", id)))
    }

    /// Gets all profiles.
    pub(crate) async fn list_profiles(self) -> DriverResult<Vec<Profile>> {
        let profiles = db::list_profiles(&mut self.db.ex().await?).await?;
        Ok(profiles)
    }

    /// Replaces the contents of the existing profile `id` with `fields`.
    pub(crate) async fn update_profile(
        self,
        id: ProfileId,
        fields: ProfileFields,
    ) -> DriverResult<Profile> {
        db::update_profile(&mut self.db.ex().await?, &Profile::new(id, fields.clone()))
            .await
            .map_err(|e| write_error(e, id, &fields))?;
        Ok(Profile::new(id, fields))
    }
}
