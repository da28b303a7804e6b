use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::notify::{DeliveryError, NotificationChannel};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API client bound to a single recipient chat.
pub struct TelegramClient {
    http_client: Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramClient {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http_client,
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", TELEGRAM_API_BASE, self.bot_token)
    }
}

#[async_trait]
impl NotificationChannel for TelegramClient {
    async fn send_text(&self, text: &str) -> Result<(), DeliveryError> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        // The request URL embeds the bot token; strip it from any error
        let response = self
            .http_client
            .post(self.send_message_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| DeliveryError::Http(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DeliveryError::Http(e.without_url()))?;

        debug!("Telegram response: {} {}", status, body);
        interpret_response(status, &body)
    }
}

/// A send only counts as delivered on a 2xx status whose body does not say
/// `"ok": false`.
fn interpret_response(status: StatusCode, body: &str) -> Result<(), DeliveryError> {
    let parsed = serde_json::from_str::<TelegramApiResponse>(body).ok();

    if status.is_success() && parsed.as_ref().map_or(true, |r| r.ok) {
        return Ok(());
    }

    let description = parsed
        .and_then(|r| r.description)
        .unwrap_or_else(|| body.to_string());

    Err(DeliveryError::Rejected {
        status: status.as_u16(),
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let body = r#"{"ok":true,"result":{"message_id":1}}"#;
        assert!(interpret_response(StatusCode::OK, body).is_ok());
    }

    #[test]
    fn test_error_status_uses_description() {
        let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;
        match interpret_response(StatusCode::BAD_REQUEST, body) {
            Err(DeliveryError::Rejected { status, description }) => {
                assert_eq!(status, 400);
                assert_eq!(description, "Bad Request: chat not found");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_ok_false_with_success_status() {
        let body = r#"{"ok":false,"description":"Forbidden: bot was blocked by the user"}"#;
        assert!(matches!(
            interpret_response(StatusCode::OK, body),
            Err(DeliveryError::Rejected { status: 200, .. })
        ));
    }

    #[test]
    fn test_non_json_error_body() {
        match interpret_response(StatusCode::BAD_GATEWAY, "upstream down") {
            Err(DeliveryError::Rejected { description, .. }) => assert_eq!(description, "upstream down"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_url_embeds_token() {
        let client = TelegramClient::new("123:abc", "42").unwrap();
        assert_eq!(client.send_message_url(), "https://api.telegram.org/bot123:abc/sendMessage");
    }
}
