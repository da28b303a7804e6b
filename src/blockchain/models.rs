//! JSON-RPC wire types for the Solana account subscription feed.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use solana_sdk::commitment_config::CommitmentConfig;

use crate::models::WatchedAddress;

pub type RequestId = u64;
pub type SubscriptionId = u64;

pub const ACCOUNT_SUBSCRIBE: &str = "accountSubscribe";
pub const ACCOUNT_NOTIFICATION: &str = "accountNotification";

#[derive(Debug, Serialize)]
pub struct SubscribeRequest {
    jsonrpc: &'static str,
    id: RequestId,
    method: &'static str,
    params: Value,
}

impl SubscribeRequest {
    pub fn account(id: RequestId, address: &WatchedAddress, commitment: CommitmentConfig) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: ACCOUNT_SUBSCRIBE,
            params: json!([
                address.as_str(),
                { "encoding": "base64", "commitment": commitment.commitment }
            ]),
        }
    }

    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// A frame with an `id`: the feed's answer to one of our requests.
#[derive(Debug, Deserialize)]
struct RawAck {
    id: RequestId,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RawNotification {
    method: String,
    params: NotificationParams,
}

#[derive(Debug, Deserialize)]
struct NotificationParams {
    subscription: SubscriptionId,
    result: NotificationResult,
}

#[derive(Debug, Deserialize)]
struct NotificationResult {
    #[serde(default)]
    context: Option<NotificationContext>,
    value: AccountValue,
}

#[derive(Debug, Deserialize)]
struct NotificationContext {
    slot: u64,
}

#[derive(Debug, Deserialize)]
struct AccountValue {
    lamports: u64,
}

/// Inbound frame, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Ack {
        id: RequestId,
        result: Option<Value>,
        error: Option<RpcErrorObject>,
    },
    AccountNotification {
        subscription: SubscriptionId,
        lamports: u64,
        slot: Option<u64>,
    },
    /// Anything else: other notifications, malformed frames.
    Other,
}

impl InboundMessage {
    pub fn parse(text: &str) -> Self {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(_) => return Self::Other,
        };

        if value.get("method").is_some() {
            return match serde_json::from_value::<RawNotification>(value) {
                Ok(n) if n.method == ACCOUNT_NOTIFICATION => Self::AccountNotification {
                    subscription: n.params.subscription,
                    lamports: n.params.result.value.lamports,
                    slot: n.params.result.context.map(|c| c.slot),
                },
                _ => Self::Other,
            };
        }

        match serde_json::from_value::<RawAck>(value) {
            Ok(ack) => Self::Ack {
                id: ack.id,
                result: ack.result,
                error: ack.error,
            },
            Err(_) => Self::Other,
        }
    }
}
