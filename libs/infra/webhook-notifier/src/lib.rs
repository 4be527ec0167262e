// [libs/infra/webhook-notifier/src/lib.rs]
/*!
 * =================================================================
 * APARATO: WEBHOOK NOTIFIER CRATE ROOT (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: ENTREGA ASÍNCRONA POR LOTES DE EVENTOS OBSERVACIONALES
 * (spec §4.M)
 * =================================================================
 */

pub mod config;
pub mod errors;
pub mod events;
pub mod notifier;
pub mod queue;

pub mod prelude {
    pub use crate::config::WebhookConfig;
    pub use crate::errors::NotifierError;
    pub use crate::events::{WebhookEvent, WebhookEventType};
    pub use crate::notifier::{all_event_types, WebhookNotifier};
}
