// [libs/domain/field-learner/src/sampler.rs]
/*!
 * APARATO: SAMPLING GATE (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: DECISIÓN DE MUESTREO POR PROBABILIDAD (spec §4.J)
 */

use rand::Rng;

pub const DEFAULT_SAMPLE_RATE: f64 = 0.1;

/// Retorna `true` con probabilidad `rate` (acotada a `[0.0, 1.0]`).
pub fn should_sample(rate: f64) -> bool {
    should_sample_with(rate, &mut rand::thread_rng())
}

pub(crate) fn should_sample_with(rate: f64, rng: &mut impl Rng) -> bool {
    let clamped = rate.clamp(0.0, 1.0);
    rng.gen_bool(clamped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn zero_rate_never_samples() {
        let mut rng = StepRng::new(0, 1);
        for _ in 0..10 {
            assert!(!should_sample_with(0.0, &mut rng));
        }
    }

    #[test]
    fn full_rate_always_samples() {
        let mut rng = StepRng::new(0, 1);
        for _ in 0..10 {
            assert!(should_sample_with(1.0, &mut rng));
        }
    }

    #[test]
    fn out_of_range_rate_is_clamped() {
        let mut rng = StepRng::new(0, 1);
        assert!(should_sample_with(5.0, &mut rng));
    }
}
