use phonenumber::country::Id as CountryId;
use phonenumber::Mode;

use crate::errors::AppError;

/// Validate and normalize a customer's Brazilian phone number.
///
/// Uses the phonenumber library (port of Google's libphonenumber) with BR
/// as the default region, so `(11) 98765-4321`, `11987654321` and
/// `+55 11 98765-4321` all normalize to `+5511987654321`.
pub fn normalize_br_phone(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.len() < 8 {
        return Err(AppError::BadRequest(format!(
            "Phone number too short: '{}'",
            trimmed
        )));
    }

    let number = phonenumber::parse(Some(CountryId::BR), trimmed).map_err(|e| {
        tracing::warn!("Failed to parse BR phone '{}': {:?}", trimmed, e);
        AppError::BadRequest(format!("Invalid phone number: '{}'", trimmed))
    })?;

    if !phonenumber::is_valid(&number) {
        tracing::warn!("Invalid BR phone number: {}", trimmed);
        return Err(AppError::BadRequest(format!(
            "Invalid Brazilian phone number: '{}'",
            trimmed
        )));
    }

    Ok(number.format().mode(Mode::E164).to_string())
}

/// Recipient in the form the WhatsApp Cloud API expects: E.164 digits
/// without the leading `+`.
pub fn whatsapp_recipient(raw: &str) -> Result<String, AppError> {
    let e164 = normalize_br_phone(raw)?;
    Ok(e164.trim_start_matches('+').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_normalize_to_e164() {
        for raw in [
            "11987654321",
            "(11) 98765-4321",
            "+5511987654321",
            "5511987654321",
            " +55 11 98765-4321 ",
        ] {
            assert_eq!(normalize_br_phone(raw).unwrap(), "+5511987654321", "{}", raw);
        }
    }

    #[test]
    fn test_whatsapp_recipient_has_no_plus() {
        assert_eq!(
            whatsapp_recipient("(21) 98765-4321").unwrap(),
            "5521987654321"
        );
    }

    #[test]
    fn test_rejects_short_and_garbage() {
        assert!(matches!(
            normalize_br_phone("1234"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            normalize_br_phone("not a phone"),
            Err(AppError::BadRequest(_))
        ));
        assert!(normalize_br_phone("").is_err());
    }
}
