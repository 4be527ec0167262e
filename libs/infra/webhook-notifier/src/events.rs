// [libs/infra/webhook-notifier/src/events.rs]
/*!
 * APARATO: WEBHOOK EVENT TAXONOMY (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: FORMA DE UN EVENTO OBSERVACIONAL DISPARADO POR EL
 * EVALUADOR (spec §4.M)
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    Blocked,
    RateLimit,
    HighScore,
    Captcha,
    Honeypot,
    DisposableEmail,
    FingerprintFlood,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event_type: WebhookEventType,
    pub vhost_id: String,
    pub endpoint_id: Option<String>,
    pub client_ip: String,
    pub spam_score: i64,
    pub flags: Vec<String>,
    pub occurred_at: DateTime<Utc>,
}

impl WebhookEvent {
    pub fn new(event_type: WebhookEventType, vhost_id: impl Into<String>, client_ip: impl Into<String>, spam_score: i64, flags: Vec<String>, occurred_at: DateTime<Utc>) -> Self {
        Self { event_type, vhost_id: vhost_id.into(), endpoint_id: None, client_ip: client_ip.into(), spam_score, flags, occurred_at }
    }
}
