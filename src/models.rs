// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub amount: f64,
    pub category: String,
    pub comment: String,
    pub date: String, // YYYY-MM-DD HH:MM:SS, UTC
    pub telegram_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub day: String, // YYYY-MM-DD
    pub total: f64,
}

/// Sum over an aggregation window; `None` when the user has no rows in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowTotal {
    pub total: Option<f64>,
}

/// Validated input for creating or rewriting an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub amount: f64,
    pub category: String,
    pub comment: String,
}
