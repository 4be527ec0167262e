// [libs/core/body-parser/src/urlencoded.rs]
/*!
 * APARATO: URL-ENCODED BODY DECODER (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: CORE UTILITY (ESTRATO L2)
 */

use crate::flat_body::FlatBody;

pub fn parse_urlencoded(raw_body: &[u8]) -> FlatBody {
    let mut body = FlatBody::new();
    for (name, value) in form_urlencoded::parse(raw_body) {
        body.push(name.into_owned(), value.into_owned());
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_keys_become_a_list() {
        let body = parse_urlencoded(b"tag=red&tag=blue&name=acme");
        assert_eq!(body.get("tag"), Some(&["red".to_string(), "blue".to_string()][..]));
        assert_eq!(body.first("name"), Some("acme"));
    }

    #[test]
    fn percent_encoding_and_plus_are_decoded() {
        let body = parse_urlencoded(b"q=hello+world%21");
        assert_eq!(body.first("q"), Some("hello world!"));
    }
}
