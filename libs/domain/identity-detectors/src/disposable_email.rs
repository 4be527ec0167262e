// [libs/domain/identity-detectors/src/disposable_email.rs]
/*!
 * APARATO: DISPOSABLE EMAIL DETECTOR (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: CLASIFICACIÓN DE DOMINIOS DE CORREO DESECHABLE (spec §4.F)
 *
 * Conjunto integrado de dominios conocidos, extensible en tiempo de
 * ejecución vía lista permitida/bloqueada del almacén. La búsqueda
 * intenta el dominio exacto y, como respaldo, el dominio padre (para
 * subdominios de servicios desechables).
 */

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisposableSource {
    Builtin,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisposableVerdict {
    pub is_disposable: bool,
    pub source: Option<DisposableSource>,
}

/// Subconjunto representativo de dominios de correo desechable conocidos
/// públicamente. Extensible en tiempo de ejecución vía la lista
/// personalizada del almacén (spec §4.F: "~250 dominios").
const BUILTIN_DISPOSABLE_DOMAINS: &[&str] = &[
    "mailinator.com", "guerrillamail.com", "guerrillamail.info", "guerrillamail.biz",
    "guerrillamail.de", "guerrillamail.net", "guerrillamail.org", "sharklasers.com",
    "10minutemail.com", "10minutemail.net", "20minutemail.com", "temp-mail.org",
    "tempmail.com", "tempmail.net", "throwawaymail.com", "getnada.com", "nada.email",
    "maildrop.cc", "mailnesia.com", "mintemail.com", "yopmail.com", "yopmail.net",
    "yopmail.fr", "trashmail.com", "trashmail.net", "trashmail.me", "dispostable.com",
    "fakeinbox.com", "spamgourmet.com", "mailcatch.com", "mail-temporaire.fr",
    "moakt.cc", "moakt.com", "tempr.email", "emailondeck.com", "mohmal.com",
    "mohmal.in", "mytemp.email", "mailsac.com", "inboxkitten.com", "tempinbox.com",
    "burnermail.io", "anonaddy.com", "33mail.com", "mailbox52.ml", "mailbox92.biz",
    "crazymailing.com", "dropmail.me", "emailfake.com", "fake-mail.ml",
    "fakemailgenerator.com", "guerrillamailblock.com", "harakirimail.com",
    "incognitomail.com", "jetable.org", "kasmail.com", "kurzepost.de",
    "letthemeatspam.com", "meltmail.com", "mailforspam.com", "mailimate.com",
    "mailnull.com", "mt2015.com", "mytrashmail.com", "no-spam.ws", "nobulk.com",
    "nospam.ze.tc", "nospamfor.us", "nowmymail.com", "objectmail.com",
    "obobbo.com", "oneoffemail.com", "onewaymail.com", "pookmail.com",
    "proxymail.eu", "putthisinyourspamdatabase.com", "quickinbox.com",
    "rcpt.at", "recode.me", "recursor.net", "regbypass.com", "rppkn.com",
    "rtrtr.com", "safetymail.info", "sendspamhere.com", "shieldedmail.com",
    "shitmail.me", "skeefmail.com", "slopsbox.com", "smellfear.com",
    "snakemail.com", "sofort-mail.de", "sogetthis.com", "spam.la",
    "spambob.com", "spambog.com", "spambox.us", "spamcannon.com",
    "spamcero.com", "spamcon.org", "spamcorptastic.com", "spamday.com",
    "spamex.com", "spamfree24.org", "spamherelots.com", "spamhereplease.com",
    "spaml.com", "spamobox.com", "spamoff.de", "spamslicer.com", "spamspot.com",
    "spamthis.co.uk", "spamthisplease.com", "tempemail.net", "tempemail.co.za",
    "tempmail2.com", "tempomail.fr", "temporarily.de", "temporaryemail.net",
    "temporaryinbox.com", "thankyou2010.com", "thisisnotmyrealemail.com",
    "trash2009.com", "trashdevil.com", "trashemail.de", "trashmail.at",
    "trashymail.com", "tyldd.com", "veryrealemail.com", "viewcastmedia.com",
    "walala.org", "wegwerfmail.de", "wegwerfmail.net", "wegwerfmail.org",
    "wh4f.org", "whyspam.me", "willselfdestruct.com", "winemaven.info",
    "wronghead.com", "wuzup.net", "wuzupmail.net", "xemaps.com", "xyzfree.net",
    "yeah.net", "youmailr.com", "zoemail.net",
];

pub struct DisposableEmailDetector {
    builtin: HashSet<&'static str>,
    custom_blocked: HashSet<String>,
    custom_allowed: HashSet<String>,
}

impl DisposableEmailDetector {
    pub fn new(custom_blocked: Vec<String>, custom_allowed: Vec<String>) -> Self {
        Self {
            builtin: BUILTIN_DISPOSABLE_DOMAINS.iter().copied().collect(),
            custom_blocked: custom_blocked.into_iter().map(|domain| domain.to_lowercase()).collect(),
            custom_allowed: custom_allowed.into_iter().map(|domain| domain.to_lowercase()).collect(),
        }
    }

    /// Clasifica la dirección de correo dada. Retorna `is_disposable: false`
    /// si el valor no contiene una forma de correo reconocible.
    pub fn classify(&self, email_value: &str) -> DisposableVerdict {
        let Some((_, domain)) = email_value.rsplit_once('@') else {
            return DisposableVerdict { is_disposable: false, source: None };
        };
        let domain = domain.trim().to_lowercase();
        if domain.is_empty() {
            return DisposableVerdict { is_disposable: false, source: None };
        }

        if self.custom_allowed.contains(&domain) {
            return DisposableVerdict { is_disposable: false, source: None };
        }
        if self.custom_blocked.contains(&domain) {
            return DisposableVerdict { is_disposable: true, source: Some(DisposableSource::Custom) };
        }
        if self.builtin.contains(domain.as_str()) {
            return DisposableVerdict { is_disposable: true, source: Some(DisposableSource::Builtin) };
        }

        // Respaldo de dominio padre, para subdominios de servicios desechables
        // (p.ej. `inbox.mailinator.com`).
        if let Some((_, parent_domain)) = domain.split_once('.') {
            if self.builtin.contains(parent_domain) {
                return DisposableVerdict { is_disposable: true, source: Some(DisposableSource::Builtin) };
            }
            if self.custom_blocked.contains(parent_domain) {
                return DisposableVerdict { is_disposable: true, source: Some(DisposableSource::Custom) };
            }
        }

        DisposableVerdict { is_disposable: false, source: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_builtin_domain_is_flagged_disposable() {
        let detector = DisposableEmailDetector::new(vec![], vec![]);
        let verdict = detector.classify("someone@mailinator.com");
        assert!(verdict.is_disposable);
        assert_eq!(verdict.source, Some(DisposableSource::Builtin));
    }

    #[test]
    fn custom_allowlist_overrides_builtin_block() {
        let detector = DisposableEmailDetector::new(vec![], vec!["mailinator.com".into()]);
        let verdict = detector.classify("someone@mailinator.com");
        assert!(!verdict.is_disposable);
    }

    #[test]
    fn parent_domain_fallback_catches_subdomains() {
        let detector = DisposableEmailDetector::new(vec![], vec![]);
        let verdict = detector.classify("someone@inbox.mailinator.com");
        assert!(verdict.is_disposable);
    }

    #[test]
    fn non_email_value_is_not_disposable() {
        let detector = DisposableEmailDetector::new(vec![], vec![]);
        let verdict = detector.classify("not-an-email");
        assert!(!verdict.is_disposable);
        assert_eq!(verdict.source, None);
    }

    #[test]
    fn custom_blocked_domain_outside_builtin_set_is_flagged() {
        let detector = DisposableEmailDetector::new(vec!["myburner.example".into()], vec![]);
        let verdict = detector.classify("user@myburner.example");
        assert!(verdict.is_disposable);
        assert_eq!(verdict.source, Some(DisposableSource::Custom));
    }
}
