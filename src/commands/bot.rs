// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::bot::{TelegramClient, run_polling};
use crate::config::BotConfig;
use anyhow::{Context, Result};
use std::thread;

pub fn handle(sub: &clap::ArgMatches) -> Result<()> {
    let cfg = BotConfig::from_matches(sub)?.context("BOT_TOKEN is required to run the bot")?;
    let client = TelegramClient::new(&cfg.token)?;
    run_polling(&client, &cfg.web_app_url);
    Ok(())
}

/// Runs the gateway on its own thread next to the HTTP server.
pub fn spawn(cfg: BotConfig) -> Result<thread::JoinHandle<()>> {
    let client = TelegramClient::new(&cfg.token)?;
    let handle = thread::Builder::new()
        .name("telegram-bot".into())
        .spawn(move || run_polling(&client, &cfg.web_app_url))
        .context("Failed to spawn bot thread")?;
    Ok(handle)
}
