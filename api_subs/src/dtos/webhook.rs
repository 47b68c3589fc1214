use serde::Deserialize;

/// Event envelope. `data.object` stays raw JSON until the event kind is known.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub created: i64,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, serde::Serialize)]
pub struct WebhookAck {
    pub received: bool,
}
