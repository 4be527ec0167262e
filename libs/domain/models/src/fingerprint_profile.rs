// [libs/domain/models/src/fingerprint_profile.rs]
/*!
 * APARATO: FINGERPRINT PROFILE MODEL (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN MODEL (ESTRATO L2)
 * (spec §3, Entity Fingerprint Profile; §4.H)
 */

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderConditionKind {
    Present,
    Absent,
    Matches,
    NotMatches,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderCondition {
    pub header_name: String,
    pub condition: HeaderConditionKind,
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    All,
    Any,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintRecipe {
    pub header_names: Vec<String>,
    pub normalize: bool,
    pub max_length_per_value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FingerprintAction {
    Allow,
    Flag { score: i64 },
    Block,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateLimitOverride {
    pub max_requests: u32,
    pub window_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintProfile {
    pub id: String,
    pub priority: i32,
    pub enabled: bool,
    pub matching_rules: Vec<HeaderCondition>,
    pub mode: MatchMode,
    pub recipe: FingerprintRecipe,
    pub action: FingerprintAction,
    pub rate_limit_override: Option<RateLimitOverride>,
}
