// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::AppState;
use crate::errors::{AppError, AppResult};
use crate::models::{DailyTotal, Expense, WindowTotal};
use crate::service::{ExpenseInput, ExpenseService, TelegramId, parse_id};
use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub telegram_id: Option<String>,
}

impl UserQuery {
    fn owner(&self) -> AppResult<TelegramId> {
        TelegramId::parse(self.telegram_id.as_deref())
    }
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: usize,
}

/// Runs a store-backed operation on the blocking pool; rusqlite calls never
/// sit on an async worker.
async fn blocking<T, F>(service: &ExpenseService, op: F) -> AppResult<T>
where
    F: FnOnce(&ExpenseService) -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    let service = service.clone();
    tokio::task::spawn_blocking(move || op(&service)).await?
}

fn parse_body(body: &Bytes) -> AppResult<ExpenseInput> {
    serde_json::from_slice::<ExpenseInput>(body)
        .map_err(|_| AppError::validation("request body must be a JSON object"))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "message": "Moneybot backend is running" }))
}

pub async fn create_expense(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<Created>> {
    let input = parse_body(&body)?;
    let id = blocking(&state.expenses, move |svc| svc.create(&input)).await?;
    Ok(Json(Created { id }))
}

pub async fn list_expenses(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Expense>>> {
    let Query(query) = query?;
    let owner = query.owner()?;
    let expenses = blocking(&state.expenses, move |svc| svc.list(&owner)).await?;
    Ok(Json(expenses))
}

pub async fn update_expense(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let input = parse_body(&body)?;
    // An undecodable segment names no row, same as a non-integer one.
    let id = path.ok().and_then(|Path(id)| parse_id(&id));
    blocking(&state.expenses, move |svc| svc.update(id, &input)).await?;
    Ok(Json(json!({ "success": true })))
}

/// Never fails on client input: anything that cannot name a row deletes nothing.
pub async fn delete_expense(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> AppResult<Json<Deleted>> {
    let id = path.ok().and_then(|Path(id)| parse_id(&id));
    let owner = match query {
        Ok(Query(query)) => match query.telegram_id.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => Some(TelegramId::parse(Some(s))?),
            _ => None,
        },
        Err(rejection) => {
            log::debug!("delete with unreadable owner scope: {rejection}");
            return Ok(Json(Deleted { deleted: 0 }));
        }
    };
    let deleted = blocking(&state.expenses, move |svc| svc.delete(id, owner.as_ref())).await?;
    Ok(Json(Deleted { deleted }))
}

pub async fn daily_stats(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> AppResult<Json<Vec<DailyTotal>>> {
    let Query(query) = query?;
    let owner = query.owner()?;
    let totals = blocking(&state.expenses, move |svc| svc.daily_totals(&owner)).await?;
    Ok(Json(totals))
}

pub async fn weekly_stats(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> AppResult<Json<WindowTotal>> {
    let Query(query) = query?;
    let owner = query.owner()?;
    let total = blocking(&state.expenses, move |svc| svc.weekly_total(&owner)).await?;
    Ok(Json(total))
}

pub async fn monthly_stats(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> AppResult<Json<WindowTotal>> {
    let Query(query) = query?;
    let owner = query.owner()?;
    let total = blocking(&state.expenses, move |svc| svc.monthly_total(&owner)).await?;
    Ok(Json(total))
}
