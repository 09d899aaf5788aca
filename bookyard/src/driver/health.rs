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

//! Liveness reporting.

use crate::driver::Driver;
use crate::model::{HealthState, HealthStatus, API_VERSION};
use log::info;

impl Driver {
    /// Reports that the service is alive.
    ///
    /// This does not talk to the database: a healthy response only means that the process is
    /// able to serve requests.
    pub(crate) fn health(self) -> HealthStatus {
        info!("Health check endpoint called");
        HealthStatus::new(HealthState::Healthy, self.clock.now_utc(), API_VERSION.to_owned())
    }
}
