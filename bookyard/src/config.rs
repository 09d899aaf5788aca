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

//! Configuration of the service, loaded from environment variables.

use axum::http::{HeaderName, HeaderValue, Method};
use bookyard_core::db::postgres::PostgresOptions;
use bookyard_core::env::{get_optional_var, get_required_var};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Default address to listen on when none is configured.
const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Default port to listen on when none is configured.
const DEFAULT_PORT: u16 = 8000;

/// Options to connect to the database, determined by the scheme of the connection string.
#[derive(Debug, PartialEq)]
pub enum DbOptions {
    /// Connect to a PostgreSQL server.
    Postgres(PostgresOptions),

    /// Open an SQLite database with the given connection string, like `sqlite::memory:` or
    /// `sqlite:bookyard.db?mode=rwc`.
    Sqlite(String),
}

impl DbOptions {
    /// Initializes the database options from environment variables whose name is prefixed with
    /// the given `prefix`.
    ///
    /// The scheme of `<prefix>_URL` selects the backend.  PostgreSQL connections also honor the
    /// pool settings described in `PostgresOptions::from_env`.
    pub fn from_env(prefix: &str) -> Result<DbOptions, String> {
        let url = get_required_var::<String>(prefix, "URL")?;
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(DbOptions::Postgres(PostgresOptions::from_env(prefix)?))
        } else if url.starts_with("sqlite:") {
            Ok(DbOptions::Sqlite(url))
        } else {
            // The URL may carry credentials so it is not part of the message.
            Err(format!(
                "Unsupported database in environment variable {}_URL: must be a postgres:// or \
                sqlite: connection string",
                prefix
            ))
        }
    }
}

/// A set of values to allow in a CORS policy.
#[derive(Debug, PartialEq)]
pub enum AllowList<T> {
    /// Any value is allowed.
    Any,

    /// Only the given values are allowed.
    Only(Vec<T>),
}

impl<T> Default for AllowList<T> {
    fn default() -> Self {
        AllowList::Any
    }
}

impl<T> AllowList<T> {
    /// Parses a comma-separated list of values from the optional variable `<prefix>_<suffix>`.
    ///
    /// An unset variable, an empty variable, or a `*` anywhere in the list mean any value.
    fn from_env<F>(prefix: &str, suffix: &str, parse: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<T>,
    {
        let raw = match get_optional_var::<String>(prefix, suffix)? {
            Some(raw) => raw,
            None => return Ok(AllowList::Any),
        };

        let mut values = vec![];
        for item in raw.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            if item == "*" {
                return Ok(AllowList::Any);
            }
            match parse(item) {
                Some(value) => values.push(value),
                None => {
                    return Err(format!(
                        "Invalid value '{}' in environment variable {}_{}",
                        item, prefix, suffix
                    ))
                }
            }
        }

        if values.is_empty() {
            Ok(AllowList::Any)
        } else {
            Ok(AllowList::Only(values))
        }
    }
}

/// Cross-origin resource sharing policy.
#[derive(Debug, Default, PartialEq)]
pub struct CorsOptions {
    /// Origins allowed to issue cross-origin requests.
    pub origins: AllowList<HeaderValue>,

    /// Methods allowed in cross-origin requests.
    pub methods: AllowList<Method>,

    /// Request headers allowed in cross-origin requests.
    pub headers: AllowList<HeaderName>,
}

impl CorsOptions {
    /// Initializes the CORS policy from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_ALLOWED_ORIGINS`, `<prefix>_ALLOWED_METHODS`
    /// and `<prefix>_ALLOWED_HEADERS`.
    pub fn from_env(prefix: &str) -> Result<CorsOptions, String> {
        Ok(CorsOptions {
            origins: AllowList::from_env(prefix, "ALLOWED_ORIGINS", |s| {
                HeaderValue::from_str(s).ok()
            })?,
            methods: AllowList::from_env(prefix, "ALLOWED_METHODS", |s| {
                Method::from_bytes(s.to_ascii_uppercase().as_bytes()).ok()
            })?,
            headers: AllowList::from_env(prefix, "ALLOWED_HEADERS", |s| {
                HeaderName::from_bytes(s.as_bytes()).ok()
            })?,
        })
    }

    /// Returns true if requests from any origin are allowed.
    pub fn is_permissive(&self) -> bool {
        self.origins == AllowList::Any
    }

    /// Builds the middleware that enforces this policy.
    pub fn layer(&self) -> CorsLayer {
        let origins = match &self.origins {
            AllowList::Any => AllowOrigin::any(),
            AllowList::Only(origins) => AllowOrigin::list(origins.iter().cloned()),
        };
        let methods = match &self.methods {
            AllowList::Any => AllowMethods::any(),
            AllowList::Only(methods) => AllowMethods::list(methods.iter().cloned()),
        };
        let headers = match &self.headers {
            AllowList::Any => AllowHeaders::any(),
            AllowList::Only(headers) => AllowHeaders::list(headers.iter().cloned()),
        };
        CorsLayer::new().allow_origin(origins).allow_methods(methods).allow_headers(headers)
    }
}

/// Configuration of the service.
#[derive(Debug, PartialEq)]
pub struct Config {
    /// Address and port to listen on.
    pub bind_addr: SocketAddr,

    /// Database to connect to.
    pub db: DbOptions,

    /// Cross-origin resource sharing policy.
    pub cors: CorsOptions,
}

impl Config {
    /// Initializes the configuration from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_DATABASE_URL`, `<prefix>_HOST`, `<prefix>_PORT`
    /// and `<prefix>_CORS_ALLOWED_ORIGINS`.
    pub fn from_env(prefix: &str) -> Result<Config, String> {
        let host = get_optional_var::<IpAddr>(prefix, "HOST")?.unwrap_or(DEFAULT_HOST);
        let port = get_optional_var::<u16>(prefix, "PORT")?.unwrap_or(DEFAULT_PORT);
        Ok(Config {
            bind_addr: SocketAddr::new(host, port),
            db: DbOptions::from_env(&format!("{}_DATABASE", prefix))?,
            cors: CorsOptions::from_env(&format!("{}_CORS", prefix))?,
        })
    }
}
