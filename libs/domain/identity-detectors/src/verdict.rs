// [libs/domain/identity-detectors/src/verdict.rs]
/*!
 * APARATO: IDENTITY DETECTOR VERDICT (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: FORMA DE SALIDA COMÚN DE LOS TRES DETECTORES DE IDENTIDAD
 */

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectorVerdict {
    pub score: i64,
    pub blocked: bool,
    pub flags: Vec<String>,
}

impl DetectorVerdict {
    pub fn merge(&mut self, other: DetectorVerdict) {
        self.score += other.score;
        self.blocked = self.blocked || other.blocked;
        self.flags.extend(other.flags);
    }
}
