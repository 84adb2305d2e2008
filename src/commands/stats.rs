// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::expenses::owner_arg;
use crate::models::WindowTotal;
use crate::service::{ExpenseService, MONTH_DAYS, WEEK_DAYS};
use crate::utils::{fmt_amount, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(service: &ExpenseService, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("days", sub)) => days(service, sub)?,
        Some(("week", sub)) => {
            let total = service.weekly_total(&owner_arg(sub)?)?;
            print_window(sub, WEEK_DAYS, &total)?;
        }
        Some(("month", sub)) => {
            let total = service.monthly_total(&owner_arg(sub)?)?;
            print_window(sub, MONTH_DAYS, &total)?;
        }
        _ => {}
    }
    Ok(())
}

fn days(service: &ExpenseService, sub: &clap::ArgMatches) -> Result<()> {
    let data = service.daily_totals(&owner_arg(sub)?)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|d| vec![d.day.clone(), fmt_amount(d.total)])
            .collect();
        println!("{}", pretty_table(&["Day", "Total"], rows));
    }
    Ok(())
}

fn print_window(sub: &clap::ArgMatches, days: i64, total: &WindowTotal) -> Result<()> {
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), total)? {
        let shown = total.total.map(fmt_amount).unwrap_or_else(|| "-".into());
        println!(
            "{}",
            pretty_table(&["Window", "Total"], vec![vec![format!("last {days} days"), shown]])
        );
    }
    Ok(())
}
