// [libs/infra/webhook-notifier/src/notifier.rs]
/*!
 * APARATO: WEBHOOK NOTIFIER (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: ENCOLAR EVENTOS TIPADOS Y VACIAR LOTES A CADA URL
 * CONFIGURADA POR TAMAÑO DE LOTE O INTERVALO, LO QUE OCURRA PRIMERO
 * (spec §4.M)
 *
 * La entrega es de mejor esfuerzo: un `non-2xx` se registra y se
 * descarta, sin cola persistente de reintento más allá del presupuesto
 * acotado en proceso (`max_retries`) de esta misma ronda de vaciado.
 */

use crate::config::WebhookConfig;
use crate::errors::NotifierError;
use crate::events::{WebhookEvent, WebhookEventType};
use crate::queue::EventQueue;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, instrument, warn};

pub struct WebhookNotifier {
    config: WebhookConfig,
    queue: EventQueue,
    http: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig, http: reqwest::Client) -> Self {
        let queue = EventQueue::new(config.queue_capacity);
        Self { config, queue, http }
    }

    /// Encola un evento si su tipo está en el conjunto suscrito; de lo
    /// contrario lo descarta silenciosamente en el punto de encolado
    /// (spec §4.M: "events whose type is not in the subscribed set are
    /// dropped at enqueue").
    pub fn enqueue(&self, event: WebhookEvent) {
        if !self.config.subscribed_types.contains(&event.event_type) {
            return;
        }
        self.queue.push(event);
    }

    /// Arranca la tarea en segundo plano que vacía la cola por temporizador.
    /// El tamaño de lote también dispara un vaciado inmediato desde
    /// `enqueue`'s caller vía [`Self::flush_if_batch_ready`] cuando se desea
    /// una latencia menor que el intervalo completo.
    pub fn spawn_flush_loop(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.config.flush_interval());
            loop {
                ticker.tick().await;
                self.flush().await;
            }
        })
    }

    pub async fn flush_if_batch_ready(&self) {
        if self.queue.len() >= self.config.batch_size {
            self.flush().await;
        }
    }

    #[instrument(skip(self))]
    pub async fn flush(&self) {
        if self.queue.is_empty() || self.config.urls.is_empty() {
            return;
        }
        let batch = self.queue.drain_up_to(self.config.batch_size);
        if batch.is_empty() {
            return;
        }

        for url in &self.config.urls {
            if let Err(fault) = self.deliver(url, &batch).await {
                warn!("⚠️ [WEBHOOK_NOTIFIER]: {}", fault);
            } else {
                info!("📡 [WEBHOOK_NOTIFIER]: delivered batch of {} events to {}", batch.len(), url);
            }
        }
    }

    async fn deliver(&self, url: &str, batch: &[WebhookEvent]) -> Result<(), NotifierError> {
        let mut last_error = String::new();
        for attempt in 0..=self.config.max_retries {
            let send_result = self
                .http
                .post(url)
                .timeout(self.config.delivery_timeout())
                .json(batch)
                .send()
                .await;

            match send_result {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => last_error = format!("non-2xx status {}", response.status()),
                Err(fault) => last_error = fault.to_string(),
            }

            if attempt < self.config.max_retries {
                tokio::time::sleep(Duration::from_millis(100 * (attempt as u64 + 1))).await;
            }
        }
        Err(NotifierError::DeliveryFailure { url: url.to_string(), reason: last_error })
    }

    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }
}

pub fn all_event_types() -> Vec<WebhookEventType> {
    vec![
        WebhookEventType::Blocked,
        WebhookEventType::RateLimit,
        WebhookEventType::HighScore,
        WebhookEventType::Captcha,
        WebhookEventType::Honeypot,
        WebhookEventType::DisposableEmail,
        WebhookEventType::FingerprintFlood,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashSet;

    fn sample_event(event_type: WebhookEventType) -> WebhookEvent {
        WebhookEvent::new(event_type, "vh-1", "9.9.9.9", 90, vec!["kw:payday".to_string()], Utc::now())
    }

    #[tokio::test]
    async fn unsubscribed_event_type_is_dropped_at_enqueue() {
        let mut config = WebhookConfig::default();
        config.subscribed_types = HashSet::from([WebhookEventType::Blocked]);
        let notifier = WebhookNotifier::new(config, reqwest::Client::new());
        notifier.enqueue(sample_event(WebhookEventType::Honeypot));
        assert_eq!(notifier.queue_depth(), 0);
    }

    #[tokio::test]
    async fn subscribed_event_type_is_queued() {
        let mut config = WebhookConfig::default();
        config.subscribed_types = HashSet::from([WebhookEventType::Blocked]);
        let notifier = WebhookNotifier::new(config, reqwest::Client::new());
        notifier.enqueue(sample_event(WebhookEventType::Blocked));
        assert_eq!(notifier.queue_depth(), 1);
    }

    #[tokio::test]
    async fn flush_with_no_configured_urls_drains_nothing() {
        let mut config = WebhookConfig::default();
        config.subscribed_types = HashSet::from([WebhookEventType::Blocked]);
        config.urls = vec![];
        let notifier = WebhookNotifier::new(config, reqwest::Client::new());
        notifier.enqueue(sample_event(WebhookEventType::Blocked));
        notifier.flush().await;
        assert_eq!(notifier.queue_depth(), 1);
    }
}
