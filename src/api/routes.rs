// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route(
            "/expenses/:id",
            put(handlers::update_expense).delete(handlers::delete_expense),
        )
        .route("/stats/days", get(handlers::daily_stats))
        .route("/stats/week", get(handlers::weekly_stats))
        .route("/stats/month", get(handlers::monthly_stats))
}
