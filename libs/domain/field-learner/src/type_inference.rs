// [libs/domain/field-learner/src/type_inference.rs]
/*!
 * APARATO: FIELD NAME TYPE INFERENCE (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: CLASIFICACIÓN DE UN NOMBRE DE CAMPO EN `InferredFieldType`
 * (spec §4.J: "el valor nunca se inspecciona, solo el nombre")
 *
 * La inferencia es puramente léxica sobre el nombre normalizado
 * (minúsculas, separadores colapsados); ningún valor de solicitud
 * participa de esta decisión.
 */

use waf_domain_models::prelude::InferredFieldType;

fn normalize(field_name: &str) -> String {
    field_name.to_ascii_lowercase().replace(['-', ' '], "_")
}

/// Infiera el tipo de un campo a partir de su nombre únicamente.
pub fn infer_field_type(field_name: &str) -> InferredFieldType {
    let name = normalize(field_name);

    if name.contains("email") {
        InferredFieldType::Email
    } else if name.contains("phone") || name.contains("mobile") || name.contains("tel") {
        InferredFieldType::Phone
    } else if name.contains("password") || name.contains("passwd") || name.contains("pwd") {
        InferredFieldType::Password
    } else if name.contains("card") || name.contains("cc_number") || name.contains("pan") {
        InferredFieldType::CreditCard
    } else if name.contains("address") || name.contains("street") || name.contains("zip") || name.contains("postal") {
        InferredFieldType::Address
    } else if name.contains("name") {
        InferredFieldType::Name
    } else if name.contains("date") || name.contains("dob") || name.contains("birth") {
        InferredFieldType::Date
    } else if name.contains("url") || name.contains("link") || name.contains("website") {
        InferredFieldType::Url
    } else if name.contains("count")
        || name.contains("amount")
        || name.contains("qty")
        || name.contains("quantity")
        || name.contains("number")
        || name.contains("price")
    {
        InferredFieldType::Numeric
    } else {
        InferredFieldType::Generic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_email_variants() {
        assert_eq!(infer_field_type("email"), InferredFieldType::Email);
        assert_eq!(infer_field_type("user_email_address"), InferredFieldType::Email);
    }

    #[test]
    fn recognizes_password_variants() {
        assert_eq!(infer_field_type("password"), InferredFieldType::Password);
        assert_eq!(infer_field_type("pwd"), InferredFieldType::Password);
    }

    #[test]
    fn hyphenated_and_spaced_names_are_normalized() {
        assert_eq!(infer_field_type("credit-card"), InferredFieldType::CreditCard);
        assert_eq!(infer_field_type("credit card number"), InferredFieldType::CreditCard);
    }

    #[test]
    fn unrecognized_names_fall_back_to_generic() {
        assert_eq!(infer_field_type("freeform_note"), InferredFieldType::Generic);
    }

    #[test]
    fn numeric_hints_are_recognized() {
        assert_eq!(infer_field_type("quantity"), InferredFieldType::Numeric);
        assert_eq!(infer_field_type("total_price"), InferredFieldType::Numeric);
    }
}
