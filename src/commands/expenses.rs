// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Expense;
use crate::service::{ExpenseInput, ExpenseService, TelegramId, parse_id};
use crate::utils::{fmt_amount, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use serde_json::Value;

pub fn handle(service: &ExpenseService, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(service, sub)?,
        Some(("list", sub)) => list(service, sub)?,
        Some(("rm", sub)) => remove(service, sub)?,
        _ => {}
    }
    Ok(())
}

fn arg_value(sub: &clap::ArgMatches, name: &str) -> Option<Value> {
    sub.get_one::<String>(name).map(|s| Value::String(s.clone()))
}

pub fn owner_arg(sub: &clap::ArgMatches) -> Result<TelegramId> {
    Ok(TelegramId::parse(
        sub.get_one::<String>("telegram-id").map(String::as_str),
    )?)
}

fn add(service: &ExpenseService, sub: &clap::ArgMatches) -> Result<()> {
    let input = ExpenseInput {
        amount: arg_value(sub, "amount"),
        category: arg_value(sub, "category"),
        comment: arg_value(sub, "comment"),
        telegram_id: arg_value(sub, "telegram-id"),
    };
    let id = service.create(&input)?;
    println!("Recorded expense #{}", id);
    Ok(())
}

fn list(service: &ExpenseService, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(service, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|e| {
                vec![
                    e.id.to_string(),
                    e.date.clone(),
                    e.category.clone(),
                    fmt_amount(e.amount),
                    e.comment.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Date", "Category", "Amount", "Comment"], rows)
        );
    }
    Ok(())
}

pub fn query_rows(service: &ExpenseService, sub: &clap::ArgMatches) -> Result<Vec<Expense>> {
    let owner = owner_arg(sub)?;
    let mut data = service.list(&owner)?;
    if let Some(limit) = sub.get_one::<usize>("limit") {
        data.truncate(*limit);
    }
    Ok(data)
}

fn remove(service: &ExpenseService, sub: &clap::ArgMatches) -> Result<()> {
    let raw = sub.get_one::<String>("id").context("missing expense id")?;
    let owner = match sub.get_one::<String>("telegram-id") {
        Some(_) => Some(owner_arg(sub)?),
        None => None,
    };
    let deleted = service.delete(parse_id(raw), owner.as_ref())?;
    if deleted == 0 {
        println!("No expense #{} to remove", raw);
    } else {
        println!("Removed expense #{}", raw);
    }
    Ok(())
}
