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

//! Operations on reservations.

use crate::db;
use crate::driver::{not_found_as, Driver};
use crate::model::{Reservation, ReservationFields, ReservationId};
use bookyard_core::db::{DbError, Executor};
use bookyard_core::driver::{DriverError, DriverResult};

/// Checks that the book and the profile referenced by `fields` exist.
async fn check_references(ex: &mut Executor, fields: &ReservationFields) -> DriverResult<()> {
    match db::get_book(ex, *fields.book_id()).await {
        Ok(_) => (),
        Err(DbError::NotFound) => {
            return Err(DriverError::InvalidInput(format!(
                "Book {} does not exist",
                fields.book_id()
            )))
        }
        Err(e) => return Err(e.into()),
    }

    match db::get_profile(ex, *fields.profile_id()).await {
        Ok(_) => Ok(()),
        Err(DbError::NotFound) => Err(DriverError::InvalidInput(format!(
            "Profile {} does not exist",
            fields.profile_id()
        ))),
        Err(e) => Err(e.into()),
    }
}

impl Driver {
    /// Creates a new reservation with `fields`, stamped with the current time.
    pub(crate) async fn create_reservation(
        self,
        fields: ReservationFields,
    ) -> DriverResult<Reservation> {
        let mut tx = self.db.begin().await?;
        check_references(tx.ex(), &fields).await?;

        let reservation =
            Reservation::new(ReservationId::new_random(), fields, self.clock.now_utc());
        db::create_reservation(tx.ex(), &reservation).await?;

        tx.commit().await?;
        Ok(reservation)
    }

    /// Deletes the reservation `id`.
    pub(crate) async fn delete_reservation(self, id: ReservationId) -> DriverResult<()> {
        db::delete_reservation(&mut self.db.ex().await?, id)
            .await
            .map_err(|e| not_found_as(e, format!("Reservation {} not found", id)))
    }

    /// Gets the reservation `id`.
    pub(crate) async fn get_reservation(self, id: ReservationId) -> DriverResult<Reservation> {
        db::get_reservation(&mut self.db.ex().await?, id)
            .await
            .map_err(|e| not_found_as(e, format!("Reservation {} not found", id)))
    }

    /// Gets all reservations.
    pub(crate) async fn list_reservations(self) -> DriverResult<Vec<Reservation>> {
        let reservations = db::list_reservations(&mut self.db.ex().await?).await?;
        Ok(reservations)
    }

    /// Replaces the contents of the existing reservation `id` with `fields`.
    ///
    /// The creation time of the reservation is kept.
    pub(crate) async fn update_reservation(
        self,
        id: ReservationId,
        fields: ReservationFields,
    ) -> DriverResult<Reservation> {
        let mut tx = self.db.begin().await?;

        let existing = db::get_reservation(tx.ex(), id)
            .await
            .map_err(|e| not_found_as(e, format!("Reservation {} not found", id)))?;
        check_references(tx.ex(), &fields).await?;

        let reservation = Reservation::new(id, fields, *existing.created());
        db::update_reservation(tx.ex(), &reservation).await?;

        tx.commit().await?;
        Ok(reservation)
    }
}
