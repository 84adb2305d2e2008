// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Store;
use crate::errors::{AppError, AppResult};
use crate::models::{DailyTotal, Expense, ExpenseDraft, WindowTotal};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub const WEEK_DAYS: i64 = 7;
pub const MONTH_DAYS: i64 = 30;

/// Canonical text form of a user identifier. `42`, `"42"` and `"042"` map to
/// the same value; non-numeric ids are kept as trimmed text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TelegramId(String);

impl TelegramId {
    pub fn parse(raw: Option<&str>) -> AppResult<Self> {
        match raw.map(str::trim) {
            Some(s) if !s.is_empty() => Ok(TelegramId(canonical_text(s))),
            _ => Err(AppError::validation("telegram_id is required")),
        }
    }

    pub fn from_json(value: Option<&Value>) -> AppResult<Self> {
        match value {
            None | Some(Value::Null) => Err(AppError::validation("telegram_id is required")),
            Some(Value::String(s)) => Self::parse(Some(s.as_str())),
            Some(Value::Number(n)) => {
                if let Some(v) = n.as_i64() {
                    return Ok(TelegramId(v.to_string()));
                }
                if let Some(v) = n.as_u64() {
                    return Ok(TelegramId(v.to_string()));
                }
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
                        Ok(TelegramId((f as i64).to_string()))
                    }
                    _ => Err(AppError::validation("telegram_id must be an integer or a string")),
                }
            }
            Some(_) => Err(AppError::validation("telegram_id must be an integer or a string")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Decimal integers in text are rewritten the way a JSON number would print.
fn canonical_text(s: &str) -> String {
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return s.to_string();
    }
    match digits.trim_start_matches('0') {
        "" => "0".to_string(),
        significant => format!("{sign}{significant}"),
    }
}

impl fmt::Display for TelegramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Loosely typed request body; every field is checked by the service.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ExpenseInput {
    pub amount: Option<Value>,
    pub category: Option<Value>,
    pub comment: Option<Value>,
    pub telegram_id: Option<Value>,
}

pub fn parse_amount(value: Option<&Value>) -> AppResult<f64> {
    let amount = match value {
        None | Some(Value::Null) => return Err(AppError::validation("amount is required")),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err(AppError::validation("amount is required"));
        }
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match amount {
        Some(a) if a.is_finite() => Ok(a),
        _ => Err(AppError::validation("amount must be a finite number")),
    }
}

pub fn parse_category(value: Option<&Value>) -> AppResult<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        None | Some(Value::Null) | Some(Value::String(_)) => {
            Err(AppError::validation("category is required"))
        }
        Some(_) => Err(AppError::validation("category must be a string")),
    }
}

pub fn parse_comment(value: Option<&Value>) -> AppResult<String> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(AppError::validation("comment must be a string")),
    }
}

pub fn parse_draft(input: &ExpenseInput) -> AppResult<ExpenseDraft> {
    Ok(ExpenseDraft {
        amount: parse_amount(input.amount.as_ref())?,
        category: parse_category(input.category.as_ref())?,
        comment: parse_comment(input.comment.as_ref())?,
    })
}

/// Path ids that are not integers cannot name a row.
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Expense operations over an injected [`Store`].
#[derive(Clone)]
pub struct ExpenseService {
    store: Arc<Store>,
}

impl ExpenseService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn create(&self, input: &ExpenseInput) -> AppResult<i64> {
        let draft = parse_draft(input)?;
        let owner = TelegramId::from_json(input.telegram_id.as_ref())?;
        let id = self
            .store
            .insert(draft.amount, &draft.category, &draft.comment, owner.as_str())?;
        log::info!(
            "expense {id} created for {owner}: {} ({})",
            draft.amount,
            draft.category
        );
        Ok(id)
    }

    pub fn list(&self, owner: &TelegramId) -> AppResult<Vec<Expense>> {
        self.store.query_by_user(owner.as_str())
    }

    /// A present `telegram_id` in the input scopes the update to that user's row.
    pub fn update(&self, id: Option<i64>, input: &ExpenseInput) -> AppResult<()> {
        let draft = parse_draft(input)?;
        let owner = match &input.telegram_id {
            None | Some(Value::Null) => None,
            Some(v) => Some(TelegramId::from_json(Some(v))?),
        };
        let changed = match id {
            Some(id) => self
                .store
                .update(id, owner.as_ref().map(TelegramId::as_str), &draft)?,
            None => 0,
        };
        if changed == 0 {
            return Err(AppError::not_found("expense"));
        }
        log::info!("expense {} updated", id.unwrap_or_default());
        Ok(())
    }

    pub fn delete(&self, id: Option<i64>, owner: Option<&TelegramId>) -> AppResult<usize> {
        let deleted = match id {
            Some(id) => self.store.delete(id, owner.map(TelegramId::as_str))?,
            None => 0,
        };
        if deleted > 0 {
            log::info!("expense {} deleted", id.unwrap_or_default());
        }
        Ok(deleted)
    }

    pub fn daily_totals(&self, owner: &TelegramId) -> AppResult<Vec<DailyTotal>> {
        self.store.aggregate_by_day(owner.as_str())
    }

    pub fn weekly_total(&self, owner: &TelegramId) -> AppResult<WindowTotal> {
        self.store.sum_since(owner.as_str(), WEEK_DAYS)
    }

    pub fn monthly_total(&self, owner: &TelegramId) -> AppResult<WindowTotal> {
        self.store.sum_since(owner.as_str(), MONTH_DAYS)
    }
}
