// [libs/domain/identity-detectors/src/geoip_policy.rs]
/*!
 * APARATO: GEOIP/ASN POLICY EVALUATOR (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: APLICACIÓN DE POLÍTICAS DE PAÍS/ASN SOBRE UN LOOKUP (spec §4.F)
 *
 * Las anulaciones a nivel de endpoint REEMPLAZAN las listas del vhost,
 * nunca las combinan (spec §4.F: "Endpoint-level overrides replace
 * (not merge) the lists.").
 */

use crate::geoip::GeoLookup;
use crate::verdict::DetectorVerdict;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPolicy {
    pub blocked_countries: Vec<String>,
    pub allowed_countries: Vec<String>,
    pub flagged_countries: Vec<String>,
    pub country_flag_score: i64,
    pub blocked_asns: Vec<u32>,
    pub allowed_asns: Vec<u32>,
    pub flagged_asns: Vec<u32>,
    pub asn_flag_score: i64,
    pub block_datacenters: bool,
    pub flag_datacenters: bool,
    pub datacenter_flag_score: i64,
}

pub fn evaluate_geo_policy(lookup: &GeoLookup, policy: &GeoPolicy) -> DetectorVerdict {
    if lookup.unavailable {
        return DetectorVerdict { score: 0, blocked: false, flags: vec!["geoip:unavailable".to_string()] };
    }

    let mut verdict = DetectorVerdict::default();

    if let Some(country) = &lookup.country_code {
        if !policy.allowed_countries.is_empty() && !policy.allowed_countries.contains(country) {
            verdict.blocked = true;
            verdict.flags.push(format!("geoip:country_not_allowed:{country}"));
        } else if policy.blocked_countries.contains(country) {
            verdict.blocked = true;
            verdict.flags.push(format!("geoip:country_blocked:{country}"));
        } else if policy.flagged_countries.contains(country) {
            verdict.score += policy.country_flag_score;
            verdict.flags.push(format!("geoip:country_flagged:{country}"));
        }
    }

    if let Some(asn) = lookup.asn {
        if !policy.allowed_asns.is_empty() && !policy.allowed_asns.contains(&asn) {
            verdict.blocked = true;
            verdict.flags.push(format!("geoip:asn_not_allowed:{asn}"));
        } else if policy.blocked_asns.contains(&asn) {
            verdict.blocked = true;
            verdict.flags.push(format!("geoip:asn_blocked:{asn}"));
        } else if policy.flagged_asns.contains(&asn) {
            verdict.score += policy.asn_flag_score;
            verdict.flags.push(format!("geoip:asn_flagged:{asn}"));
        }
    }

    if lookup.is_datacenter == Some(true) {
        if policy.block_datacenters {
            verdict.blocked = true;
            verdict.flags.push("geoip:datacenter_blocked".to_string());
        } else if policy.flag_datacenters {
            verdict.score += policy.datacenter_flag_score;
            verdict.flags.push("geoip:datacenter_flagged".to_string());
        }
    }

    verdict
}
