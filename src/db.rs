// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::{AppError, AppResult};
use crate::models::{DailyTotal, Expense, ExpenseDraft, WindowTotal};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Moneybot", "moneybot"));

/// Timestamp layout of the `date` column. Lexicographic order equals time order.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Most recent day groups returned by [`Store::aggregate_by_day`].
pub const DAILY_LIMIT: usize = 30;

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("moneybot.sqlite"))
}

/// Opens the store at `path` and makes sure the schema exists.
pub fn open_or_init(path: &Path) -> Result<Store> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let store = Store::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    store.initialize().context("Failed to initialize schema")?;
    Ok(store)
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

/// Single-table expense store. The connection is serialized behind a mutex,
/// each method holds it for exactly one statement.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    pub fn open(path: &Path) -> AppResult<Self> {
        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // Poisoning is recovered; the connection stays valid.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Creates the table and index when missing. Safe to run on every start.
    pub fn initialize(&self) -> AppResult<()> {
        self.conn().execute_batch(
            r#"
        CREATE TABLE IF NOT EXISTS expenses(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount REAL NOT NULL,
            category TEXT NOT NULL,
            comment TEXT NOT NULL DEFAULT '',
            date TEXT NOT NULL,
            telegram_id TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_expenses_user_date ON expenses(telegram_id, date);
        "#,
        )?;
        Ok(())
    }

    pub fn close(self) -> AppResult<()> {
        let conn = self
            .conn
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        conn.close().map_err(|(_, e)| AppError::Database(e))
    }

    pub fn insert(
        &self,
        amount: f64,
        category: &str,
        comment: &str,
        telegram_id: &str,
    ) -> AppResult<i64> {
        self.insert_at(amount, category, comment, telegram_id, Utc::now())
    }

    pub fn insert_at(
        &self,
        amount: f64,
        category: &str,
        comment: &str,
        telegram_id: &str,
        at: DateTime<Utc>,
    ) -> AppResult<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO expenses(amount, category, comment, date, telegram_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![amount, category, comment, format_timestamp(at), telegram_id],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find(&self, id: i64) -> AppResult<Option<Expense>> {
        let expense = self
            .conn()
            .query_row(
                "SELECT id, amount, category, comment, date, telegram_id
                 FROM expenses WHERE id=?1",
                params![id],
                expense_from_row,
            )
            .optional()?;
        Ok(expense)
    }

    /// Newest first; rows stamped within the same second fall back to id order.
    pub fn query_by_user(&self, telegram_id: &str) -> AppResult<Vec<Expense>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, amount, category, comment, date, telegram_id
             FROM expenses WHERE telegram_id=?1
             ORDER BY date DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![telegram_id], expense_from_row)?;
        let expenses = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(expenses)
    }

    /// Rewrites amount, category and comment. `owner` restricts the match to
    /// one user's row. Returns the number of rows changed (0 or 1).
    pub fn update(&self, id: i64, owner: Option<&str>, draft: &ExpenseDraft) -> AppResult<usize> {
        let changed = self.conn().execute(
            "UPDATE expenses SET amount=?1, category=?2, comment=?3
             WHERE id=?4 AND (?5 IS NULL OR telegram_id=?5)",
            params![draft.amount, draft.category, draft.comment, id, owner],
        )?;
        Ok(changed)
    }

    pub fn delete(&self, id: i64, owner: Option<&str>) -> AppResult<usize> {
        let deleted = self.conn().execute(
            "DELETE FROM expenses WHERE id=?1 AND (?2 IS NULL OR telegram_id=?2)",
            params![id, owner],
        )?;
        Ok(deleted)
    }

    /// Totals per UTC calendar day, newest day first, at most [`DAILY_LIMIT`] days.
    pub fn aggregate_by_day(&self, telegram_id: &str) -> AppResult<Vec<DailyTotal>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT substr(date,1,10) AS day, SUM(amount) AS total
             FROM expenses WHERE telegram_id=?1
             GROUP BY day ORDER BY day DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![telegram_id, DAILY_LIMIT as i64], |r| {
            Ok(DailyTotal {
                day: r.get(0)?,
                total: r.get(1)?,
            })
        })?;
        let totals = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(totals)
    }

    pub fn sum_since(&self, telegram_id: &str, window_days: i64) -> AppResult<WindowTotal> {
        let cutoff = format_timestamp(Utc::now() - Duration::days(window_days));
        let total: Option<f64> = self.conn().query_row(
            "SELECT SUM(amount) FROM expenses WHERE telegram_id=?1 AND date >= ?2",
            params![telegram_id, cutoff],
            |r| r.get(0),
        )?;
        Ok(WindowTotal { total })
    }
}

fn expense_from_row(r: &Row<'_>) -> rusqlite::Result<Expense> {
    let comment: Option<String> = r.get(3)?;
    Ok(Expense {
        id: r.get(0)?,
        amount: r.get(1)?,
        category: r.get(2)?,
        comment: comment.unwrap_or_default(),
        date: r.get(4)?,
        telegram_id: r.get(5)?,
    })
}
