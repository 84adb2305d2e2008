// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::sync::Arc;

use moneybot::{cli, commands, config, db, service::ExpenseService};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let matches = cli::build_cli().get_matches();
    let level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("info");
    config::init_logging(level);

    // The gateway never touches the store.
    if let Some(("bot", sub)) = matches.subcommand() {
        return commands::bot::handle(sub);
    }

    let path = config::db_path(&matches)?;
    let store = Arc::new(db::open_or_init(&path)?);
    {
        let service = ExpenseService::new(Arc::clone(&store));
        match matches.subcommand() {
            Some(("init", _)) => {
                println!("Database initialized at {}", path.display());
            }
            Some(("serve", sub)) => commands::serve::handle(service, sub)?,
            Some(("expense", sub)) => commands::expenses::handle(&service, sub)?,
            Some(("stats", sub)) => commands::stats::handle(&service, sub)?,
            Some(("export", sub)) => commands::exporter::handle(&service, sub)?,
            _ => {
                cli::build_cli().print_help()?;
                println!();
            }
        }
    }

    match Arc::try_unwrap(store) {
        Ok(store) => store.close()?,
        Err(_) => log::warn!("store still shared at exit, skipping explicit close"),
    }
    Ok(())
}
