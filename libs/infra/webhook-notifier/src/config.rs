// [libs/infra/webhook-notifier/src/config.rs]
/*!
 * APARATO: WEBHOOK NOTIFIER CONFIGURATION (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * (spec §3 "webhooks:config"; §4.M)
 */

use crate::events::WebhookEventType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub urls: Vec<String>,
    pub subscribed_types: HashSet<WebhookEventType>,
    pub batch_size: usize,
    pub flush_interval_ms: u64,
    pub delivery_timeout_ms: u64,
    pub max_retries: u32,
    pub queue_capacity: usize,
}

impl WebhookConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            subscribed_types: HashSet::new(),
            batch_size: 25,
            flush_interval_ms: 5_000,
            delivery_timeout_ms: 5_000,
            max_retries: 2,
            queue_capacity: 1_000,
        }
    }
}
