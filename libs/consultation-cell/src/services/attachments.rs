use base64::{engine::general_purpose, Engine as _};

use crate::error::ConsultationError;
use crate::models::NewAttachment;

/// Per-file limit on the decoded payload.
pub const MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

pub const MAX_ATTACHMENTS: usize = 5;

/// Body limit for creating a request: every attachment at the limit, base64-encoded,
/// plus room for the `data:` prefixes and the other fields.
pub const MAX_CREATE_BODY_BYTES: usize =
    MAX_ATTACHMENTS * (MAX_ATTACHMENT_BYTES.div_ceil(3) * 4 + 1024) + 64 * 1024;

/// Strips a `data:<mime>;base64,` prefix, returning the raw base64 text.
pub fn base64_payload(data: &str) -> &str {
    match data.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, payload)| payload).unwrap_or(rest),
        None => data,
    }
}

pub fn validate_attachments(attachments: &[NewAttachment]) -> Result<(), ConsultationError> {
    if attachments.len() > MAX_ATTACHMENTS {
        return Err(ConsultationError::Validation(format!(
            "At most {} attachments per request",
            MAX_ATTACHMENTS
        )));
    }

    for attachment in attachments {
        if attachment.name.trim().is_empty() {
            return Err(ConsultationError::Validation("Attachment name is required".to_string()));
        }

        let decoded = general_purpose::STANDARD
            .decode(base64_payload(&attachment.data).trim())
            .map_err(|_| {
                ConsultationError::Validation(format!(
                    "Attachment {} is not valid base64",
                    attachment.name
                ))
            })?;

        if decoded.len() > MAX_ATTACHMENT_BYTES {
            return Err(ConsultationError::Validation(format!(
                "Attachment {} exceeds the 10MB limit",
                attachment.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn attachment(name: &str, data: String) -> NewAttachment {
        NewAttachment {
            name: name.to_string(),
            mime_type: "image/png".to_string(),
            data,
        }
    }

    #[test]
    fn accepts_plain_and_data_url_payloads() {
        let raw = general_purpose::STANDARD.encode(b"exame");
        let files = vec![
            attachment("exame.png", raw.clone()),
            attachment("raio-x.png", format!("data:image/png;base64,{}", raw)),
        ];

        assert!(validate_attachments(&files).is_ok());
    }

    #[test]
    fn rejects_invalid_base64_and_blank_names() {
        assert_matches!(
            validate_attachments(&[attachment("exame.png", "não é base64!".to_string())]),
            Err(ConsultationError::Validation(_))
        );
        assert_matches!(
            validate_attachments(&[attachment("  ", general_purpose::STANDARD.encode(b"x"))]),
            Err(ConsultationError::Validation(_))
        );
    }

    #[test]
    fn enforces_size_limit() {
        let too_big = general_purpose::STANDARD.encode(vec![0u8; MAX_ATTACHMENT_BYTES + 1]);
        let at_limit = general_purpose::STANDARD.encode(vec![0u8; MAX_ATTACHMENT_BYTES]);

        assert_matches!(
            validate_attachments(&[attachment("grande.pdf", too_big)]),
            Err(ConsultationError::Validation(msg)) if msg.contains("10MB")
        );
        assert!(validate_attachments(&[attachment("ok.pdf", at_limit)]).is_ok());
    }

    #[test]
    fn limits_attachment_count() {
        let data = general_purpose::STANDARD.encode(b"x");
        let files: Vec<NewAttachment> = (0..=MAX_ATTACHMENTS)
            .map(|i| attachment(&format!("exame-{}.png", i), data.clone()))
            .collect();

        assert_matches!(validate_attachments(&files), Err(ConsultationError::Validation(_)));
        assert!(validate_attachments(&files[..MAX_ATTACHMENTS]).is_ok());
    }
}
