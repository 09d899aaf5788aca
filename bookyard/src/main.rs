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

//! Launcher for the Bookyard service.
//!
//! The configuration is read from `BOOKYARD_*` environment variables.  See `Config::from_env`
//! for details.

#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use bookyard::config::Config;
use bookyard::{serve, ServeError};
use log::error;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = match Config::from_env("BOOKYARD") {
        Ok(config) => serve(config).await,
        Err(e) => Err(ServeError::Config(e)),
    };
    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}
