// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn telegram_id_arg(required: bool) -> Arg {
    Arg::new("telegram-id")
        .long("telegram-id")
        .short('u')
        .value_name("ID")
        .required(required)
        .help("Telegram user id that owns the expenses")
}

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl"),
        Arg::new("jsonl").long("jsonl").action(ArgAction::SetTrue),
    ]
}

fn bot_args(required: bool) -> [Arg; 2] {
    [
        Arg::new("bot-token")
            .long("bot-token")
            .env("BOT_TOKEN")
            .hide_env_values(true)
            .required(required),
        Arg::new("web-app-url")
            .long("web-app-url")
            .env("WEB_APP_URL")
            .required(required)
            .help("URL of the mini-app opened from the /start buttons"),
    ]
}

fn stats_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(telegram_id_arg(true))
        .args(json_args())
}

pub fn build_cli() -> Command {
    Command::new("moneybot")
        .about("Per-user expense tracker: HTTP API, Telegram front door and admin CLI")
        .version(crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .env("MONEYBOT_DB")
                .value_name("PATH")
                .global(true)
                .help("SQLite file (defaults to the platform data dir)"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .env("MONEYBOT_LOG")
                .default_value("info")
                .global(true),
        )
        .subcommand(Command::new("init").about("Create the database if needed"))
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP API (and the bot when a token is set)")
                .arg(
                    Arg::new("host")
                        .long("host")
                        .env("HOST")
                        .default_value("0.0.0.0"),
                )
                .arg(
                    Arg::new("port")
                        .long("port")
                        .env("PORT")
                        .default_value("5001")
                        .value_parser(value_parser!(u16)),
                )
                .args(bot_args(false)),
        )
        .subcommand(
            Command::new("bot")
                .about("Run only the Telegram gateway")
                .args(bot_args(true)),
        )
        .subcommand(
            Command::new("expense")
                .about("Manage expenses")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(telegram_id_arg(true))
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .required(true)
                                .allow_hyphen_values(true),
                        )
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("comment").long("comment")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(telegram_id_arg(true))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        )
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("rm")
                        .arg(Arg::new("id").required(true))
                        .arg(telegram_id_arg(false)),
                ),
        )
        .subcommand(
            Command::new("stats")
                .about("Aggregated spending")
                .subcommand_required(true)
                .subcommand(stats_command("days", "Totals per day, last 30 active days"))
                .subcommand(stats_command("week", "Total over the last 7 days"))
                .subcommand(stats_command("month", "Total over the last 30 days")),
        )
        .subcommand(
            Command::new("export")
                .about("Export a user's expenses")
                .arg(telegram_id_arg(true))
                .arg(Arg::new("format").long("format").default_value("csv"))
                .arg(Arg::new("out").long("out").required(true)),
        )
}
