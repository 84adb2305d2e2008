// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use moneybot::commands::{expenses, exporter, stats};
use moneybot::config::{BotConfig, ServerConfig};
use moneybot::db::Store;
use moneybot::{cli, service::ExpenseService};
use serde_json::Value;
use std::sync::Arc;
use tempfile::tempdir;

fn service() -> ExpenseService {
    let store = Store::open_in_memory().unwrap();
    store.initialize().unwrap();
    ExpenseService::new(Arc::new(store))
}

fn run_expense(service: &ExpenseService, args: &[&str]) -> anyhow::Result<()> {
    let argv = ["moneybot", "expense"].iter().chain(args).copied();
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("expense", sub)) => expenses::handle(service, sub),
        _ => panic!("no expense subcommand"),
    }
}

#[test]
fn add_goes_through_validation() {
    let svc = service();
    run_expense(
        &svc,
        &["add", "--telegram-id", "42", "--amount", "9.5", "--category", "books"],
    )
    .unwrap();
    assert!(run_expense(
        &svc,
        &["add", "--telegram-id", "42", "--amount", "ten", "--category", "books"],
    )
    .is_err());
    assert!(run_expense(
        &svc,
        &["add", "--telegram-id", "42", "--amount", "1", "--category", "  "],
    )
    .is_err());

    let rows = svc.store().query_by_user("42").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, 9.5);
    assert_eq!(rows[0].comment, "");
}

#[test]
fn list_limit_respected() {
    let svc = service();
    for i in 1..=3 {
        svc.store()
            .insert(i as f64, &format!("c{}", i), "", "42")
            .unwrap();
    }
    let matches =
        cli::build_cli().get_matches_from(["moneybot", "expense", "list", "-u", "42", "--limit", "2"]);
    if let Some(("expense", exp_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = exp_m.subcommand() {
            let rows = expenses::query_rows(&svc, list_m).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].category, "c3");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no expense subcommand");
    }
}

#[test]
fn rm_only_touches_owned_rows_when_scoped() {
    let svc = service();
    let id = svc.store().insert(3.0, "x", "", "42").unwrap();
    let id_s = id.to_string();
    run_expense(&svc, &["rm", &id_s, "--telegram-id", "43"]).unwrap();
    assert!(svc.store().find(id).unwrap().is_some());
    run_expense(&svc, &["rm", &id_s]).unwrap();
    assert!(svc.store().find(id).unwrap().is_none());
}

#[test]
fn stats_require_a_user() {
    let svc = service();
    let matches = cli::build_cli().try_get_matches_from(["moneybot", "stats", "week"]);
    assert!(matches.is_err());

    let matches = cli::build_cli().get_matches_from(["moneybot", "stats", "days", "-u", "42", "--json"]);
    if let Some(("stats", sub)) = matches.subcommand() {
        stats::handle(&svc, sub).unwrap();
    } else {
        panic!("no stats subcommand");
    }
}

#[test]
fn export_json_contains_only_that_users_expenses() {
    let svc = service();
    svc.store().insert(12.5, "food", "lunch", "42").unwrap();
    svc.store().insert(99.0, "rent", "", "43").unwrap();

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();
    let matches = cli::build_cli().get_matches_from([
        "moneybot", "export", "-u", "42", "--format", "json", "--out", &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(&svc, export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let parsed: Value = serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["category"], "food");
    assert_eq!(items[0]["comment"], "lunch");
    assert_eq!(items[0]["telegram_id"], "42");
}

#[test]
fn export_csv_writes_header_and_rows() {
    let svc = service();
    svc.store().insert(3.0, "tea", "", "42").unwrap();

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    let out_str = out_path.to_string_lossy().to_string();
    let matches =
        cli::build_cli().get_matches_from(["moneybot", "export", "-u", "42", "--out", &out_str]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(&svc, export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        ["id", "date", "amount", "category", "comment"]
    );
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][3], "tea");
}

#[test]
fn export_rejects_unknown_format() {
    let svc = service();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();
    let matches = cli::build_cli().get_matches_from([
        "moneybot", "export", "-u", "42", "--format", "xml", "--out", &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        assert!(exporter::handle(&svc, export_m).is_err());
    } else {
        panic!("no export subcommand");
    }
    assert!(!out_path.exists());
}

#[test]
fn serve_config_reads_flags() {
    let matches = cli::build_cli().get_matches_from([
        "moneybot",
        "serve",
        "--host",
        "127.0.0.1",
        "--port",
        "8080",
        "--bot-token",
        "123:abc",
        "--web-app-url",
        "https://mini.example",
    ]);
    let Some(("serve", sub)) = matches.subcommand() else {
        panic!("no serve subcommand");
    };
    let cfg = ServerConfig::from_matches(sub).unwrap();
    assert_eq!(cfg.addr.to_string(), "127.0.0.1:8080");
    assert_eq!(
        cfg.bot,
        Some(BotConfig {
            token: "123:abc".into(),
            web_app_url: "https://mini.example".into(),
        })
    );
}

#[test]
fn bot_token_without_url_is_a_config_error() {
    let matches = cli::build_cli().get_matches_from([
        "moneybot",
        "serve",
        "--host",
        "127.0.0.1",
        "--bot-token",
        "123:abc",
        "--web-app-url",
        "",
    ]);
    let Some(("serve", sub)) = matches.subcommand() else {
        panic!("no serve subcommand");
    };
    assert!(BotConfig::from_matches(sub).is_err());
}
