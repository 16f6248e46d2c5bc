// Utils module

use base64::{engine::general_purpose, Engine as _};
use chrono::{SecondsFormat, Utc};

/// Normalize a 14-digit ABHA number to the gateway's `XX-XXXX-XXXX-XXXX`
/// form. Anything that is not 14 digits (ignoring existing dashes) passes
/// through unchanged, so the function is idempotent.
pub fn format_abha_number(raw: &str) -> String {
    if !raw.chars().all(|c| c.is_ascii_digit() || c == '-') {
        return raw.to_string();
    }

    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 14 {
        return raw.to_string();
    }

    format!(
        "{}-{}-{}-{}",
        &digits[0..2],
        &digits[2..6],
        &digits[6..10],
        &digits[10..14]
    )
}

/// Current UTC timestamp in the ISO-8601 millisecond form the gateway
/// expects in the TIMESTAMP header and OTP payloads.
pub fn iso_timestamp_millis() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Sniff the ABHA card payload: the gateway serves either a PDF or a PNG
/// without a usable content-type.
pub fn sniff_card_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"%PDF") {
        "application/pdf"
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else {
        "application/octet-stream"
    }
}

/// Decode the payload segment of a JWT without verifying the signature.
/// The gateway owns the signature; callers only inspect claims.
pub(crate) fn jwt_payload(token: &str) -> Option<serde_json::Value> {
    let segment = token.split('.').nth(1)?;
    let bytes = general_purpose::URL_SAFE_NO_PAD.decode(segment).ok()?;
    serde_json::from_slice(&bytes).ok()
}
