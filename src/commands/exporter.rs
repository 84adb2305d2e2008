// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::expenses::owner_arg;
use crate::service::ExpenseService;
use anyhow::{Context, Result, bail};

pub fn handle(service: &ExpenseService, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .context("missing --format")?
        .to_lowercase();
    let out = sub.get_one::<String>("out").context("missing --out")?;
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let owner = owner_arg(sub)?;
    let expenses = service.list(&owner)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Failed to create {}", out))?;
            wtr.write_record(["id", "date", "amount", "category", "comment"])?;
            for e in &expenses {
                wtr.write_record([
                    e.id.to_string(),
                    e.date.clone(),
                    e.amount.to_string(),
                    e.category.clone(),
                    e.comment.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            std::fs::write(out, serde_json::to_string_pretty(&expenses)?)
                .with_context(|| format!("Failed to write {}", out))?;
        }
    }
    println!("Exported {} expenses for {} to {}", expenses.len(), owner, out);
    Ok(())
}
