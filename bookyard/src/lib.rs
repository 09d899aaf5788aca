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

//! Bookyard: a service to keep track of books, the profiles of their readers, and the
//! reservations that tie them together.
//!
//! The service is started in two phases: `initialize` prepares the database and `run` serves
//! requests until told to stop.  `serve` puts both together for the `main` launcher.

#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use crate::config::{Config, CorsOptions, DbOptions};
use crate::driver::Driver;
use axum::Router;
use bookyard_core::clocks::{Clock, SystemClock};
use bookyard_core::db::postgres::PostgresDb;
use bookyard_core::db::{sqlite, Db, DbError, DbResult};
use log::{error, info, warn};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;

pub mod config;
pub(crate) mod db;
pub(crate) mod driver;
pub(crate) mod model;
mod rest;

/// Errors that prevent the service from starting or from continuing to serve.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// The configuration is missing or invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The database could not be reached or prepared.
    #[error("Cannot initialize database: {0}")]
    Db(#[from] DbError),

    /// The server could not bind to its address or failed while serving.
    #[error("Server error: {0}")]
    Io(#[from] io::Error),
}

/// Opens the database described by `opts`.
pub async fn connect(opts: DbOptions) -> DbResult<Arc<dyn Db + Send + Sync>> {
    match opts {
        DbOptions::Postgres(opts) => Ok(Arc::new(PostgresDb::connect(opts)?)),
        DbOptions::Sqlite(conn_str) => Ok(Arc::new(sqlite::connect(&conn_str).await?)),
    }
}

/// Prepares the database for use by the service.  Safe to call on every startup.
pub async fn initialize(db: &(dyn Db + Send + Sync)) -> DbResult<()> {
    let mut ex = db.ex().await?;
    db::init_schema(&mut ex).await
}

/// Creates the router for the service backed by the given injected components.
pub fn app(
    db: Arc<dyn Db + Send + Sync>,
    clock: Arc<dyn Clock + Send + Sync>,
    cors: CorsLayer,
) -> Router {
    rest::app(Driver::new(db, clock), cors)
}

/// Serves `app` on `listener` until `shutdown` completes.
///
/// Once `shutdown` completes, no new connections are accepted and this waits for the in-flight
/// requests to finish before returning.
pub async fn run<F>(listener: TcpListener, app: Router, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("Application shutdown");
    Ok(())
}

/// Waits until the process is asked to terminate via Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal; shutting down"),
        () = terminate => info!("Received SIGTERM signal; shutting down"),
    }
}

/// Initializes the service backed by `db` and serves requests on `bind_addr` until `shutdown`
/// completes.
async fn serve_with_db<F>(
    db: Arc<dyn Db + Send + Sync>,
    bind_addr: SocketAddr,
    cors: CorsOptions,
    shutdown: F,
) -> Result<(), ServeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Application startup");
    initialize(db.as_ref()).await?;

    if cors.is_permissive() {
        warn!("CORS allows requests from any origin; restrict the allowed origins in production");
    }

    let listener = TcpListener::bind(bind_addr).await?;
    info!("Bookyard API is running on {}", listener.local_addr()?);

    let app = app(db, Arc::new(SystemClock::default()), cors.layer());
    run(listener, app, shutdown).await?;
    Ok(())
}

/// Starts the service described by `config` and serves requests until the process is asked to
/// terminate.
pub async fn serve(config: Config) -> Result<(), ServeError> {
    let db = connect(config.db).await?;
    let result = serve_with_db(db.clone(), config.bind_addr, config.cors, shutdown_signal()).await;
    db.close().await;
    result
}
