// [libs/infra/webhook-notifier/src/errors.rs]
/*!
 * APARATO: WEBHOOK ERROR CATALOG (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifierError {
    /// Una entrega individual agotó su presupuesto de reintentos o su
    /// tiempo de espera; no hay cola persistente detrás (spec §4.M, §7).
    #[error("[L3_WEBHOOK_FAULT]: DELIVERY_FAILURE -> {url}: {reason}")]
    DeliveryFailure { url: String, reason: String },
}
