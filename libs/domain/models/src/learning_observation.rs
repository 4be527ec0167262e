// [libs/domain/models/src/learning_observation.rs]
/*!
 * APARATO: LEARNING FIELD OBSERVATION MODEL (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN MODEL (ESTRATO L2)
 * (spec §3, Entity Learning Field Observation; §4.J)
 *
 * Invariante: los valores nunca se inspeccionan ni almacenan, solo los
 * nombres de campo y su tipo inferido a partir del nombre.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferredFieldType {
    Email,
    Phone,
    Password,
    CreditCard,
    Name,
    Address,
    Date,
    Url,
    Numeric,
    Generic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningFieldObservation {
    pub endpoint_id: String,
    pub vhost_id: String,
    pub field_name: String,
    pub inferred_type: InferredFieldType,
    pub count: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub endpoint_set: HashSet<String>,
}

impl LearningFieldObservation {
    pub fn merge_occurrence(&mut self, endpoint_id: &str, observed_at: DateTime<Utc>) {
        self.count += 1;
        self.last_seen = observed_at;
        self.endpoint_set.insert(endpoint_id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_occurrence_grows_endpoint_set_and_advances_last_seen() {
        let first_seen = Utc::now();
        let mut observation = LearningFieldObservation {
            endpoint_id: "ep-1".into(),
            vhost_id: "vh-1".into(),
            field_name: "email_address".into(),
            inferred_type: InferredFieldType::Email,
            count: 1,
            first_seen,
            last_seen: first_seen,
            endpoint_set: HashSet::from(["ep-1".to_string()]),
        };
        let later = first_seen + chrono::Duration::seconds(30);
        observation.merge_occurrence("ep-2", later);
        assert_eq!(observation.count, 2);
        assert_eq!(observation.last_seen, later);
        assert!(observation.endpoint_set.contains("ep-2"));
    }
}
