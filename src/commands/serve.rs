// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api;
use crate::config::ServerConfig;
use crate::service::ExpenseService;
use anyhow::{Context, Result};

pub fn handle(service: ExpenseService, sub: &clap::ArgMatches) -> Result<()> {
    let cfg = ServerConfig::from_matches(sub)?;

    match cfg.bot {
        Some(bot_cfg) => {
            let _bot = super::bot::spawn(bot_cfg)?;
        }
        None => log::info!("no bot token configured, serving the API only"),
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(api::run_server(service, cfg.addr))
}
