// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Telegram front door: answers `/start` with buttons that open the mini-app.
//! The gateway never reads or writes expenses.

use crate::errors::{AppError, AppResult};
use crate::utils::http_client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::thread;
use std::time::Duration;

const API_BASE: &str = "https://api.telegram.org";
const POLL_TIMEOUT_SECS: u64 = 30;
const MAX_BACKOFF: Duration = Duration::from_secs(60);
const WEBHOOK_ATTEMPTS: u32 = 5;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// One outgoing message with its keyboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub reply_markup: Value,
}

pub struct TelegramClient {
    http: reqwest::blocking::Client,
    base: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> AppResult<Self> {
        Self::with_base(API_BASE, token)
    }

    pub fn with_base(api_base: &str, token: &str) -> AppResult<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::configuration("bot token is empty"));
        }
        // Long polls hold the request open for POLL_TIMEOUT_SECS.
        let http = http_client(Duration::from_secs(POLL_TIMEOUT_SECS + 15))?;
        Ok(Self {
            http,
            base: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
        })
    }

    fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> AppResult<T> {
        let resp: ApiResponse<T> = self
            .http
            .post(format!("{}/{}", self.base, method))
            .json(body)
            .send()?
            .json()?;
        match (resp.ok, resp.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(AppError::Telegram(format!(
                "{method}: {}",
                resp.description.unwrap_or_else(|| "no description".into())
            ))),
        }
    }

    pub fn get_updates(&self, offset: i64, timeout_secs: u64) -> AppResult<Vec<Update>> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message"],
            }),
        )
    }

    pub fn send_message(&self, chat_id: i64, reply: &Reply) -> AppResult<()> {
        let _: Value = self.call(
            "sendMessage",
            &json!({
                "chat_id": chat_id,
                "text": reply.text,
                "reply_markup": reply.reply_markup,
            }),
        )?;
        Ok(())
    }

    /// Polling and webhooks are mutually exclusive on the Bot API side.
    pub fn delete_webhook(&self) -> AppResult<()> {
        let _: bool = self.call("deleteWebhook", &json!({ "drop_pending_updates": false }))?;
        Ok(())
    }
}

pub fn start_replies(web_app_url: &str) -> Vec<Reply> {
    vec![
        Reply {
            text: "Welcome! 👋\n\nOpen the expense tracker with one of the buttons below 👇".into(),
            reply_markup: json!({
                "inline_keyboard": [[
                    { "text": "Open via inline button", "web_app": { "url": web_app_url } }
                ]]
            }),
        },
        Reply {
            text: "Or use the keyboard:".into(),
            reply_markup: json!({
                "keyboard": [[
                    { "text": "Open the app", "web_app": { "url": web_app_url } }
                ]],
                "resize_keyboard": true,
                "one_time_keyboard": true,
            }),
        },
    ]
}

/// `/start`, `/start@SomeBot` and `/start <payload>` all count.
pub fn is_start_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or_default();
    let name = command.split('@').next().unwrap_or_default();
    name == "/start"
}

/// Chat to answer and what to send, if the update is a `/start`.
pub fn replies_for(update: &Update, web_app_url: &str) -> Option<(i64, Vec<Reply>)> {
    let message = update.message.as_ref()?;
    let text = message.text.as_deref()?;
    if !is_start_command(text) {
        return None;
    }
    Some((message.chat.id, start_replies(web_app_url)))
}

fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}

fn clear_webhook(client: &TelegramClient) {
    let mut backoff = Duration::from_secs(1);
    for attempt in 1..=WEBHOOK_ATTEMPTS {
        match client.delete_webhook() {
            Ok(()) => {
                log::info!("webhook cleared, switching to long polling");
                return;
            }
            Err(e) => {
                log::warn!("deleteWebhook attempt {attempt}/{WEBHOOK_ATTEMPTS} failed: {e}");
                thread::sleep(backoff);
                backoff = next_backoff(backoff);
            }
        }
    }
    log::warn!("could not clear webhook, polling anyway");
}

/// Blocks forever. Transport errors are logged and retried with backoff.
pub fn run_polling(client: &TelegramClient, web_app_url: &str) {
    clear_webhook(client);
    log::info!("bot started, mini-app at {web_app_url}");

    let mut offset = 0;
    let mut backoff = Duration::from_secs(1);
    loop {
        let updates = match client.get_updates(offset, POLL_TIMEOUT_SECS) {
            Ok(updates) => {
                backoff = Duration::from_secs(1);
                updates
            }
            Err(e) => {
                log::warn!("getUpdates failed, retrying in {}s: {e}", backoff.as_secs());
                thread::sleep(backoff);
                backoff = next_backoff(backoff);
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some((chat_id, replies)) = replies_for(&update, web_app_url) else {
                continue;
            };
            log::debug!("answering /start in chat {chat_id}");
            for reply in &replies {
                if let Err(e) = client.send_message(chat_id, reply) {
                    log::warn!("sendMessage to chat {chat_id} failed: {e}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(text: Option<&str>) -> Update {
        serde_json::from_value(json!({
            "update_id": 10,
            "message": { "message_id": 1, "chat": { "id": 555, "type": "private" }, "text": text }
        }))
        .unwrap()
    }

    #[test]
    fn start_command_variants() {
        assert!(is_start_command("/start"));
        assert!(is_start_command("/start@moneybot"));
        assert!(is_start_command("/start ref42"));
        assert!(!is_start_command("/stats"));
        assert!(!is_start_command("start"));
        assert!(!is_start_command(""));
    }

    #[test]
    fn start_sends_inline_then_keyboard_button() {
        let replies = start_replies("https://mini.example");
        assert_eq!(replies.len(), 2);
        assert_eq!(
            replies[0].reply_markup["inline_keyboard"][0][0]["web_app"]["url"],
            "https://mini.example"
        );
        let keyboard = &replies[1].reply_markup;
        assert_eq!(keyboard["keyboard"][0][0]["web_app"]["url"], "https://mini.example");
        assert_eq!(keyboard["resize_keyboard"], true);
        assert_eq!(keyboard["one_time_keyboard"], true);
    }

    #[test]
    fn only_start_messages_get_replies() {
        let (chat, replies) = replies_for(&update(Some("/start")), "https://x").unwrap();
        assert_eq!(chat, 555);
        assert_eq!(replies.len(), 2);
        assert!(replies_for(&update(Some("hello")), "https://x").is_none());
        assert!(replies_for(&update(None), "https://x").is_none());
    }

    #[test]
    fn backoff_is_capped() {
        assert_eq!(next_backoff(Duration::from_secs(1)), Duration::from_secs(2));
        assert_eq!(next_backoff(Duration::from_secs(50)), MAX_BACKOFF);
    }

    #[test]
    fn empty_token_is_rejected() {
        assert!(matches!(
            TelegramClient::new("  "),
            Err(AppError::Configuration(_))
        ));
    }
}
