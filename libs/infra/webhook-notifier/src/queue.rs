// [libs/infra/webhook-notifier/src/queue.rs]
/*!
 * APARATO: BOUNDED IN-PROCESS EVENT QUEUE (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: ENCOLADO CON DESCARTE DEL MÁS ANTIGUO AL LLENARSE
 * (spec §4.M, §5 "el estrato webhook es por-worker y descarta el más
 * antiguo cuando se llena")
 */

use crate::events::WebhookEvent;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::warn;

pub struct EventQueue {
    capacity: usize,
    items: Mutex<VecDeque<WebhookEvent>>,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), items: Mutex::new(VecDeque::with_capacity(capacity.max(1))) }
    }

    /// Encola un evento; si la cola está llena, descarta el miembro más
    /// antiguo y registra una advertencia en lugar de bloquear al llamador.
    pub fn push(&self, event: WebhookEvent) {
        let mut items = self.items.lock().expect("webhook queue mutex poisoned");
        if items.len() >= self.capacity {
            items.pop_front();
            warn!("⚠️ [WEBHOOK_NOTIFIER]: queue at capacity ({}), dropping oldest event", self.capacity);
        }
        items.push_back(event);
    }

    pub fn drain_up_to(&self, max_items: usize) -> Vec<WebhookEvent> {
        let mut items = self.items.lock().expect("webhook queue mutex poisoned");
        let take = max_items.min(items.len());
        items.drain(..take).collect()
    }

    pub fn len(&self) -> usize {
        self.items.lock().expect("webhook queue mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::WebhookEventType;
    use chrono::Utc;

    fn sample_event(tag: &str) -> WebhookEvent {
        WebhookEvent::new(WebhookEventType::Blocked, "vh-1", tag, 90, vec![], Utc::now())
    }

    #[test]
    fn pushing_past_capacity_drops_the_oldest() {
        let queue = EventQueue::new(2);
        queue.push(sample_event("a"));
        queue.push(sample_event("b"));
        queue.push(sample_event("c"));
        let drained = queue.drain_up_to(10);
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].client_ip, "b");
        assert_eq!(drained[1].client_ip, "c");
    }

    #[test]
    fn drain_up_to_never_takes_more_than_available() {
        let queue = EventQueue::new(10);
        queue.push(sample_event("a"));
        let drained = queue.drain_up_to(5);
        assert_eq!(drained.len(), 1);
        assert!(queue.is_empty());
    }
}
