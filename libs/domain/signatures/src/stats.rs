// [libs/domain/signatures/src/stats.rs]
/*!
 * APARATO: SIGNATURE/DEFENSE STATISTICS LEDGER (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: CONTADORES ATÓMICOS POR (FIRMA, TIPO DE DEFENSA) (spec §4.E)
 */

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use waf_domain_models::prelude::{DefenseType, SignatureDefenseStats};

#[derive(Default)]
pub struct SignatureStatsLedger {
    entries: DashMap<(String, DefenseType), SignatureDefenseStats>,
}

impl SignatureStatsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_match(
        &self,
        signature_id: &str,
        defense_type: DefenseType,
        histogram_key: &str,
        observed_at: DateTime<Utc>,
    ) {
        let mut entry = self
            .entries
            .entry((signature_id.to_string(), defense_type))
            .or_default();
        entry.record_match(histogram_key, observed_at);
    }

    pub fn snapshot(&self, signature_id: &str, defense_type: DefenseType) -> Option<SignatureDefenseStats> {
        self.entries.get(&(signature_id.to_string(), defense_type)).map(|entry| entry.clone())
    }
}
