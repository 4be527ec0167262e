// [libs/core/body-parser/src/multipart.rs]
/*!
 * APARATO: MULTIPART BODY DECODER (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: CORE UTILITY (ESTRATO L2)
 * RESPONSABILIDAD: DECODIFICACIÓN DE `multipart/form-data` SIN LECTURA DE ARCHIVOS
 *
 * Las partes de archivo se reemplazan por el centinela `[FILE:<filename>]`
 * (spec §4.B); el cuerpo entero ya reside en memoria, de modo que se
 * expone como un único fragmento de flujo hacia `multer`.
 */

use crate::errors::BodyParseError;
use crate::flat_body::{file_sentinel, FlatBody};
use bytes::Bytes;
use futures_util::stream;

pub async fn parse_multipart(raw_body: &[u8], content_type: &str) -> Result<FlatBody, BodyParseError> {
    let boundary = multer::parse_boundary(content_type)
        .map_err(|fault| BodyParseError::ParseError(format!("BOUNDARY_EXTRACTION_FAILURE: {fault}")))?;

    let single_chunk = stream::once(async { Ok::<Bytes, std::io::Error>(Bytes::copy_from_slice(raw_body)) });
    let mut multipart_stream = multer::Multipart::new(single_chunk, boundary);

    let mut body = FlatBody::new();

    loop {
        let next_field = multipart_stream
            .next_field()
            .await
            .map_err(|fault| BodyParseError::ParseError(format!("FIELD_DECODE_FAILURE: {fault}")))?;

        let Some(field) = next_field else { break };

        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);

        match file_name {
            Some(name) => {
                body.push(field_name, file_sentinel(&name));
            }
            None => {
                let text_value = field
                    .text()
                    .await
                    .map_err(|fault| BodyParseError::ParseError(format!("TEXT_FIELD_DECODE_FAILURE: {fault}")))?;
                body.push(field_name, text_value);
            }
        }
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn text_field_is_decoded_and_file_field_uses_sentinel() {
        let boundary = "WafBoundary";
        let raw_body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"username\"\r\n\r\n\
             carlos\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"resume\"; filename=\"resume.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n\
             %PDF-FAKE-BYTES\r\n\
             --{boundary}--\r\n"
        );
        let content_type = format!("multipart/form-data; boundary={boundary}");

        let body = parse_multipart(raw_body.as_bytes(), &content_type).await.unwrap();
        assert_eq!(body.first("username"), Some("carlos"));
        assert_eq!(body.first("resume"), Some("[FILE:resume.pdf]"));
    }
}
