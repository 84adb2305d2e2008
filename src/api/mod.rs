// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod cors;
mod handlers;
mod routes;

use crate::service::ExpenseService;
use axum::{Router, middleware, routing::get};
use std::net::SocketAddr;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    pub expenses: ExpenseService,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .merge(routes::api_routes())
        .layer(middleware::from_fn(cors::allow_any_origin))
        .with_state(state)
}

/// Serves the API until ctrl-c.
pub async fn run_server(expenses: ExpenseService, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(AppState { expenses }))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for ctrl-c: {e}");
    }
}
