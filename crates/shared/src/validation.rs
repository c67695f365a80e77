//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    static ref NIK_REGEX: Regex = Regex::new(r"^\d{16}$").unwrap();
    static ref PHONE_REGEX: Regex = Regex::new(r"^(?:\+62|62|0)8\d{8,11}$").unwrap();
    static ref TIME_REGEX: Regex = Regex::new(r"^([01]\d|2[0-3])[:.][0-5]\d$").unwrap();
}

/// Country calling code used when normalising local phone numbers.
pub const DEFAULT_COUNTRY_CODE: &str = "62";

/// Validates a national identity number (NIK): exactly 16 digits.
pub fn validate_nik(nik: &str) -> Result<(), ValidationError> {
    if NIK_REGEX.is_match(nik) {
        Ok(())
    } else {
        let mut err = ValidationError::new("nik_format");
        err.message = Some("NIK must be exactly 16 digits".into());
        Err(err)
    }
}

/// Validates an Indonesian mobile number.
///
/// Accepts `08…`, `628…` and `+628…` forms with 8 to 11 digits after the
/// leading `8`.
pub fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    if PHONE_REGEX.is_match(phone) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_format");
        err.message = Some("Phone number must be a valid Indonesian mobile number".into());
        Err(err)
    }
}

/// Validates a wall-clock time written as `HH:MM` or `HH.MM`.
pub fn validate_clock_time(time: &str) -> Result<(), ValidationError> {
    if TIME_REGEX.is_match(time) {
        Ok(())
    } else {
        let mut err = ValidationError::new("time_format");
        err.message = Some("Time must use the HH:MM format".into());
        Err(err)
    }
}

/// Validates that an optional URL-ish string is an http(s) link.
pub fn validate_http_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        let mut err = ValidationError::new("url_scheme");
        err.message = Some("URL must start with http:// or https://".into());
        Err(err)
    }
}

/// Normalises a phone number to international digits without `+`.
///
/// `081234567890` becomes `6281234567890`; numbers already carrying the
/// country code are returned with non-digits removed.
pub fn normalize_phone_number(phone: &str, country_code: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if let Some(local) = digits.strip_prefix('0') {
        format!("{}{}", country_code, local)
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_nik() {
        assert!(validate_nik("3201010101010001").is_ok());
        assert!(validate_nik("320101010101000").is_err());
        assert!(validate_nik("32010101010100011").is_err());
        assert!(validate_nik("32010101010A0001").is_err());
        assert!(validate_nik("").is_err());
    }

    #[test]
    fn test_validate_nik_error_message() {
        let err = validate_nik("123").unwrap_err();
        assert_eq!(err.message.unwrap().to_string(), "NIK must be exactly 16 digits");
    }

    #[test]
    fn test_validate_phone_number_local_form() {
        assert!(validate_phone_number("081234567890").is_ok());
        assert!(validate_phone_number("0812345678").is_ok());
        assert!(validate_phone_number("08123456").is_err());
    }

    #[test]
    fn test_validate_phone_number_international_form() {
        assert!(validate_phone_number("6281234567890").is_ok());
        assert!(validate_phone_number("+6281234567890").is_ok());
        assert!(validate_phone_number("+6221234567").is_err());
    }

    #[test]
    fn test_validate_phone_number_rejects_garbage() {
        assert!(validate_phone_number("").is_err());
        assert!(validate_phone_number("0812-3456-7890").is_err());
        assert!(validate_phone_number("not a phone").is_err());
        assert!(validate_phone_number("0712345678").is_err());
    }

    #[test]
    fn test_validate_clock_time() {
        assert!(validate_clock_time("08:00").is_ok());
        assert!(validate_clock_time("23.59").is_ok());
        assert!(validate_clock_time("24:00").is_err());
        assert!(validate_clock_time("8:00").is_err());
    }

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("https://cdn.example.com/a.jpg").is_ok());
        assert!(validate_http_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_normalize_phone_number() {
        assert_eq!(
            normalize_phone_number("081234567890", DEFAULT_COUNTRY_CODE),
            "6281234567890"
        );
        assert_eq!(
            normalize_phone_number("+6281234567890", DEFAULT_COUNTRY_CODE),
            "6281234567890"
        );
        assert_eq!(
            normalize_phone_number("6281234567890", DEFAULT_COUNTRY_CODE),
            "6281234567890"
        );
    }
}
