// [libs/domain/behavioral/src/ip_tracker.rs]
/*!
 * APARATO: APPROXIMATE UNIQUE-IP TRACKER (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: CONTEO APROXIMADO DE IPs ÚNICAS POR HORA/FLUJO (spec §4.I)
 *
 * En lugar de HyperLogLog se usa un filtro de Bloom por bucket (la
 * workspace ya depende de `bloomfilter` para la deduplicación de
 * huellas de contenido), que es suficiente para una cota superior con
 * falsos positivos acotados. Cuando la ocupación estimada del filtro
 * supera `SATURATION_RATIO` se reporta el centinela de desbordamiento
 * en lugar de un conteo potencialmente muy subestimado.
 */

use bloomfilter::Bloom;
use dashmap::DashMap;
use std::net::IpAddr;
use waf_domain_models::prelude::UNIQUE_IPS_OVERFLOW_SENTINEL;

const EXPECTED_UNIQUE_IPS_PER_HOUR: usize = 50_000;
const FALSE_POSITIVE_RATE: f64 = 0.01;
const SATURATION_RATIO: f64 = 0.9;

struct HourBucketTracker {
    bloom: Bloom<IpAddr>,
    observed_count: u64,
}

impl HourBucketTracker {
    fn new() -> Self {
        Self {
            bloom: Bloom::new_for_fp_rate(EXPECTED_UNIQUE_IPS_PER_HOUR, FALSE_POSITIVE_RATE),
            observed_count: 0,
        }
    }

    fn observe(&mut self, ip: IpAddr) -> bool {
        if self.bloom.check(&ip) {
            return false;
        }
        self.bloom.set(&ip);
        self.observed_count += 1;
        true
    }

    fn approximate_count(&self) -> u64 {
        if self.observed_count as usize >= (EXPECTED_UNIQUE_IPS_PER_HOUR as f64 * SATURATION_RATIO) as usize {
            UNIQUE_IPS_OVERFLOW_SENTINEL
        } else {
            self.observed_count
        }
    }
}

/// Rastreador por-worker, indexado por (flujo, hora-unix truncada). Vive
/// en memoria del proceso; su estimación se vuelca al bucket horario
/// compartido en cada ingesta (spec §4.I, spec §5 "per-worker, atomic").
#[derive(Default)]
pub struct UniqueIpTracker {
    buckets: DashMap<(String, i64), HourBucketTracker>,
}

impl UniqueIpTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra la IP para el par (flujo, hora) y retorna la estimación
    /// de únicas tras la observación (incluye el centinela de desbordamiento).
    pub fn observe(&self, flow: &str, hour_ts: i64, ip: IpAddr) -> u64 {
        let mut entry = self.buckets.entry((flow.to_string(), hour_ts)).or_insert_with(HourBucketTracker::new);
        entry.observe(ip);
        entry.approximate_count()
    }

    /// Purga los trackers de horas ya cerradas, evitando crecimiento sin
    /// límite del mapa (llamado periódicamente por quien posea el motor).
    pub fn retain_hours(&self, keep: impl Fn(i64) -> bool) {
        self.buckets.retain(|(_, hour_ts), _| keep(*hour_ts));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_ip_is_not_counted_twice() {
        let tracker = UniqueIpTracker::new();
        let ip: IpAddr = "1.2.3.4".parse().unwrap();
        assert_eq!(tracker.observe("signup", 1000, ip), 1);
        assert_eq!(tracker.observe("signup", 1000, ip), 1);
    }

    #[test]
    fn distinct_ips_accumulate() {
        let tracker = UniqueIpTracker::new();
        assert_eq!(tracker.observe("signup", 1000, "1.2.3.4".parse().unwrap()), 1);
        assert_eq!(tracker.observe("signup", 1000, "5.6.7.8".parse().unwrap()), 2);
    }

    #[test]
    fn different_hours_are_independent_buckets() {
        let tracker = UniqueIpTracker::new();
        let ip: IpAddr = "1.2.3.4".parse().unwrap();
        assert_eq!(tracker.observe("signup", 1000, ip), 1);
        assert_eq!(tracker.observe("signup", 2000, ip), 1);
    }

    #[test]
    fn retain_hours_drops_closed_buckets() {
        let tracker = UniqueIpTracker::new();
        tracker.observe("signup", 1000, "1.2.3.4".parse().unwrap());
        tracker.observe("signup", 2000, "1.2.3.4".parse().unwrap());
        tracker.retain_hours(|hour| hour >= 2000);
        assert_eq!(tracker.buckets.len(), 1);
    }
}
