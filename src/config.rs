// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::{AppError, AppResult};
use anyhow::{Context, Result};
use clap::ArgMatches;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Telegram settings. Present only when a token was supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    pub token: String,
    pub web_app_url: String,
}

impl BotConfig {
    pub fn from_matches(m: &ArgMatches) -> AppResult<Option<Self>> {
        let token = match m.get_one::<String>("bot-token").map(|t| t.trim()) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => return Ok(None),
        };
        let web_app_url = match m.get_one::<String>("web-app-url").map(|u| u.trim()) {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => {
                return Err(AppError::configuration(
                    "a bot token was given without --web-app-url / WEB_APP_URL",
                ));
            }
        };
        Ok(Some(Self { token, web_app_url }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub bot: Option<BotConfig>,
}

impl ServerConfig {
    pub fn from_matches(m: &ArgMatches) -> Result<Self> {
        let host = m.get_one::<String>("host").context("missing --host")?;
        let port = *m.get_one::<u16>("port").context("missing --port")?;
        let ip: IpAddr = host
            .parse()
            .with_context(|| format!("Invalid host '{}', expected an IP address", host))?;
        Ok(Self {
            addr: SocketAddr::new(ip, port),
            bot: BotConfig::from_matches(m)?,
        })
    }
}

/// `--db` / `MONEYBOT_DB`, falling back to the platform data dir.
pub fn db_path(m: &ArgMatches) -> Result<PathBuf> {
    match m.get_one::<String>("db") {
        Some(p) => Ok(PathBuf::from(p)),
        None => crate::db::db_path(),
    }
}

pub fn level_filter(level: &str) -> log::LevelFilter {
    match level.to_lowercase().as_str() {
        "off" => log::LevelFilter::Off,
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    }
}

pub fn init_logging(level: &str) {
    env_logger::Builder::from_default_env()
        .filter_level(level_filter(level))
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .init();
    log::debug!("logging initialised at level {level}");
}
