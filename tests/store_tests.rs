// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Duration, TimeZone, Utc};
use moneybot::db::{self, DAILY_LIMIT, Store};
use moneybot::models::ExpenseDraft;
use tempfile::tempdir;

fn setup() -> Store {
    let store = Store::open_in_memory().unwrap();
    store.initialize().unwrap();
    store
}

fn draft(amount: f64, category: &str, comment: &str) -> ExpenseDraft {
    ExpenseDraft {
        amount,
        category: category.into(),
        comment: comment.into(),
    }
}

#[test]
fn initialize_is_idempotent_and_data_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("expenses.sqlite");

    let store = db::open_or_init(&path).unwrap();
    store.initialize().unwrap();
    let id = store.insert(12.5, "food", "", "42").unwrap();
    store.close().unwrap();

    let store = db::open_or_init(&path).unwrap();
    let rows = store.query_by_user("42").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert_eq!(rows[0].amount, 12.5);
    assert_eq!(rows[0].category, "food");
    assert_eq!(rows[0].comment, "");
}

#[test]
fn ids_are_never_reused() {
    let store = setup();
    let a = store.insert(1.0, "a", "", "1").unwrap();
    let b = store.insert(2.0, "b", "", "1").unwrap();
    assert_eq!(store.delete(b, None).unwrap(), 1);
    let c = store.insert(3.0, "c", "", "1").unwrap();
    assert!(a < b && b < c);
}

#[test]
fn query_by_user_is_newest_first_and_scoped() {
    let store = setup();
    let base = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    store.insert_at(1.0, "old", "", "7", base).unwrap();
    store
        .insert_at(2.0, "new", "", "7", base + Duration::days(2))
        .unwrap();
    store
        .insert_at(3.0, "mid", "", "7", base + Duration::days(1))
        .unwrap();
    store.insert_at(9.0, "other", "", "8", base).unwrap();

    let rows = store.query_by_user("7").unwrap();
    let cats: Vec<&str> = rows.iter().map(|e| e.category.as_str()).collect();
    assert_eq!(cats, ["new", "mid", "old"]);
    assert!(rows.iter().all(|e| e.telegram_id == "7"));
    assert_eq!(rows[0].date, "2025-03-03 12:00:00");
}

#[test]
fn update_rewrites_fields_but_keeps_date_and_owner() {
    let store = setup();
    let at = Utc.with_ymd_and_hms(2025, 5, 5, 8, 30, 0).unwrap();
    let id = store.insert_at(5.0, "taxi", "", "42", at).unwrap();

    let changed = store.update(id, None, &draft(6.5, "bus", "cheaper")).unwrap();
    assert_eq!(changed, 1);

    let e = store.find(id).unwrap().unwrap();
    assert_eq!(e.amount, 6.5);
    assert_eq!(e.category, "bus");
    assert_eq!(e.comment, "cheaper");
    assert_eq!(e.date, "2025-05-05 08:30:00");
    assert_eq!(e.telegram_id, "42");
}

#[test]
fn update_and_delete_miss_report_zero() {
    let store = setup();
    assert_eq!(store.update(999, None, &draft(1.0, "x", "")).unwrap(), 0);
    assert_eq!(store.delete(999, None).unwrap(), 0);
    assert!(store.find(999).unwrap().is_none());
}

#[test]
fn owner_scope_guards_update_and_delete() {
    let store = setup();
    let id = store.insert(4.0, "coffee", "", "alice").unwrap();

    assert_eq!(store.update(id, Some("bob"), &draft(0.5, "x", "")).unwrap(), 0);
    assert_eq!(store.delete(id, Some("bob")).unwrap(), 0);
    assert_eq!(store.find(id).unwrap().unwrap().amount, 4.0);

    assert_eq!(store.delete(id, Some("alice")).unwrap(), 1);
    assert_eq!(store.delete(id, Some("alice")).unwrap(), 0);
}

#[test]
fn daily_totals_group_by_utc_day() {
    let store = setup();
    let day1 = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 1).unwrap();
    let day2 = Utc.with_ymd_and_hms(2025, 1, 3, 23, 59, 59).unwrap();
    store.insert_at(10.0, "a", "", "42", day1).unwrap();
    store
        .insert_at(2.5, "b", "", "42", day1 + Duration::hours(20))
        .unwrap();
    store.insert_at(4.0, "c", "", "42", day2).unwrap();
    store.insert_at(100.0, "d", "", "43", day2).unwrap();

    let totals = store.aggregate_by_day("42").unwrap();
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].day, "2025-01-03");
    assert_eq!(totals[0].total, 4.0);
    assert_eq!(totals[1].day, "2025-01-02");
    assert_eq!(totals[1].total, 12.5);
}

#[test]
fn daily_totals_keep_only_most_recent_days() {
    let store = setup();
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
    for i in 0..35 {
        store
            .insert_at(1.0, "x", "", "42", start + Duration::days(i))
            .unwrap();
    }
    let totals = store.aggregate_by_day("42").unwrap();
    assert_eq!(totals.len(), DAILY_LIMIT);
    assert_eq!(totals[0].day, "2025-02-04");
    assert_eq!(totals[DAILY_LIMIT - 1].day, "2025-01-06");
    assert!(totals.windows(2).all(|w| w[0].day > w[1].day));
}

#[test]
fn sum_since_respects_window_and_owner() {
    let store = setup();
    let now = Utc::now();
    store.insert_at(3.0, "a", "", "42", now - Duration::days(2)).unwrap();
    store.insert(1.5, "b", "", "42").unwrap();
    store.insert_at(8.0, "c", "", "42", now - Duration::days(10)).unwrap();
    store.insert_at(50.0, "d", "", "42", now - Duration::days(40)).unwrap();
    store.insert_at(99.0, "e", "", "43", now - Duration::days(1)).unwrap();

    assert_eq!(store.sum_since("42", 7).unwrap().total, Some(4.5));
    assert_eq!(store.sum_since("42", 30).unwrap().total, Some(12.5));
    assert_eq!(store.sum_since("nobody", 7).unwrap().total, None);
}
