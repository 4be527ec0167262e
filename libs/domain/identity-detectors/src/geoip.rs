// [libs/domain/identity-detectors/src/geoip.rs]
/*!
 * APARATO: GEOIP/ASN DETECTOR (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: LOCALIZACIÓN GEOGRÁFICA Y DE RED POR IP (spec §4.F)
 *
 * Inerte cuando la base de datos estilo MaxMind está ausente: reporta
 * `unavailable` en lugar de fallar la evaluación.
 */

use maxminddb::geoip2;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoLookup {
    pub country_code: Option<String>,
    pub asn: Option<u32>,
    pub asn_org: Option<String>,
    pub is_datacenter: Option<bool>,
    pub datacenter_provider: Option<String>,
    pub unavailable: bool,
}

/// Subconjunto representativo de organizaciones ASN de centro de datos
/// conocidas, usado para derivar `is_datacenter`/`datacenter_provider`
/// cuando la base ASN no distingue explícitamente el tipo de red.
const BUILTIN_DATACENTER_ASN_ORG_SUBSTRINGS: &[(&str, &str)] = &[
    ("amazon", "AWS"),
    ("aws", "AWS"),
    ("google cloud", "GCP"),
    ("google llc", "GCP"),
    ("microsoft", "Azure"),
    ("digitalocean", "DigitalOcean"),
    ("linode", "Linode"),
    ("akamai", "Linode"),
    ("ovh", "OVH"),
    ("hetzner", "Hetzner"),
    ("vultr", "Vultr"),
    ("cloudflare", "Cloudflare"),
    ("oracle", "OracleCloud"),
    ("alibaba", "Alibaba"),
    ("tencent", "Tencent"),
];

pub struct GeoIpDetector {
    country_reader: Option<maxminddb::Reader<Vec<u8>>>,
    asn_reader: Option<maxminddb::Reader<Vec<u8>>>,
}

impl GeoIpDetector {
    pub fn inert() -> Self {
        Self { country_reader: None, asn_reader: None }
    }

    pub fn with_databases(country_db_path: Option<&str>, asn_db_path: Option<&str>) -> Self {
        let country_reader = country_db_path.and_then(|path| {
            maxminddb::Reader::open_readfile(path)
                .map_err(|fault| warn!("⚠️ [GEOIP]: Country database unavailable at [{}]: {}", path, fault))
                .ok()
        });
        let asn_reader = asn_db_path.and_then(|path| {
            maxminddb::Reader::open_readfile(path)
                .map_err(|fault| warn!("⚠️ [GEOIP]: ASN database unavailable at [{}]: {}", path, fault))
                .ok()
        });
        Self { country_reader, asn_reader }
    }

    pub fn is_inert(&self) -> bool {
        self.country_reader.is_none() && self.asn_reader.is_none()
    }

    pub fn lookup(&self, ip: IpAddr) -> GeoLookup {
        if self.is_inert() {
            return GeoLookup { unavailable: true, ..Default::default() };
        }

        let country_code = self
            .country_reader
            .as_ref()
            .and_then(|reader| reader.lookup::<geoip2::Country>(ip).ok().flatten())
            .and_then(|record| record.country)
            .and_then(|country| country.iso_code)
            .map(str::to_string);

        let asn_record = self.asn_reader.as_ref().and_then(|reader| reader.lookup::<geoip2::Asn>(ip).ok().flatten());

        let asn = asn_record.as_ref().and_then(|record| record.autonomous_system_number);
        let asn_org = asn_record.as_ref().and_then(|record| record.autonomous_system_organization).map(str::to_string);

        let (is_datacenter, datacenter_provider) = match &asn_org {
            Some(org) => {
                let normalized = org.to_lowercase();
                BUILTIN_DATACENTER_ASN_ORG_SUBSTRINGS
                    .iter()
                    .find(|(substring, _)| normalized.contains(substring))
                    .map(|(_, provider)| (Some(true), Some(provider.to_string())))
                    .unwrap_or((Some(false), None))
            }
            None => (None, None),
        };

        GeoLookup { country_code, asn, asn_org, is_datacenter, datacenter_provider, unavailable: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inert_detector_reports_unavailable() {
        let detector = GeoIpDetector::inert();
        let lookup = detector.lookup("8.8.8.8".parse().unwrap());
        assert!(lookup.unavailable);
    }

    #[test]
    fn datacenter_classification_matches_known_substrings() {
        assert!(BUILTIN_DATACENTER_ASN_ORG_SUBSTRINGS.iter().any(|(s, _)| "AMAZON-02".to_lowercase().contains(s)));
    }
}
