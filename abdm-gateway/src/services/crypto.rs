//! Payload encryptor.
//!
//! The gateway mandates RSA-OAEP with a SHA-1 digest for every sensitive
//! field (identity numbers, OTPs, mobile numbers, passwords, selection
//! indices). The certificate endpoint sometimes returns a bare base64 key
//! instead of a PEM block, so the key is normalized before parsing.

use base64::{engine::general_purpose, Engine as _};
use rsa::pkcs8::DecodePublicKey;
use rsa::{Oaep, RsaPublicKey};
use sha1::Sha1;

use crate::services::error::GatewayError;

const PEM_HEADER: &str = "-----BEGIN PUBLIC KEY-----";
const PEM_FOOTER: &str = "-----END PUBLIC KEY-----";

/// Re-wrap the stored key as a standard PEM block. A key that already
/// carries a PEM header passes through with line endings normalized; a bare
/// base64 key is stripped of whitespace and wrapped at 64 columns.
pub fn normalize_public_key(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.contains("-----BEGIN") {
        let mut pem = trimmed.replace("\r\n", "\n");
        if !pem.ends_with('\n') {
            pem.push('\n');
        }
        return pem;
    }

    let stripped: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    let mut pem = String::with_capacity(stripped.len() + 64);
    pem.push_str(PEM_HEADER);
    pem.push('\n');
    for chunk in stripped.as_bytes().chunks(64) {
        pem.push_str(&String::from_utf8_lossy(chunk));
        pem.push('\n');
    }
    pem.push_str(PEM_FOOTER);
    pem.push('\n');
    pem
}

/// Encrypt a single plaintext field for transmission, returning standard
/// base64 ciphertext. Pure; recomputed per call with the currently cached
/// public key.
pub fn encrypt(plaintext: &str, public_key: &str) -> Result<String, GatewayError> {
    let pem = normalize_public_key(public_key);
    let key = RsaPublicKey::from_public_key_pem(&pem).map_err(|e| {
        GatewayError::Encryption(format!("gateway public key is not parseable: {e}"))
    })?;

    let mut rng = rand::thread_rng();
    let ciphertext = key
        .encrypt(&mut rng, Oaep::new::<Sha1>(), plaintext.as_bytes())
        .map_err(|e| GatewayError::Encryption(e.to_string()))?;

    Ok(general_purpose::STANDARD.encode(ciphertext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::{EncodePublicKey, LineEnding};
    use rsa::RsaPrivateKey;

    fn test_key_pair() -> (RsaPrivateKey, String) {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let public_pem = RsaPublicKey::from(&private_key)
            .to_public_key_pem(LineEnding::LF)
            .unwrap();
        (private_key, public_pem)
    }

    fn decrypt(private_key: &RsaPrivateKey, ciphertext_b64: &str) -> String {
        let ciphertext = general_purpose::STANDARD.decode(ciphertext_b64).unwrap();
        let plaintext = private_key
            .decrypt(Oaep::new::<Sha1>(), &ciphertext)
            .unwrap();
        String::from_utf8(plaintext).unwrap()
    }

    #[test]
    fn round_trip_with_pem_key() {
        let (private_key, public_pem) = test_key_pair();
        let ciphertext = encrypt("946495363918", &public_pem).unwrap();
        assert_eq!(decrypt(&private_key, &ciphertext), "946495363918");
    }

    #[test]
    fn round_trip_with_bare_base64_key() {
        let (private_key, public_pem) = test_key_pair();
        // Collapse the PEM to the single-line base64 form the gateway
        // sometimes returns.
        let bare: String = public_pem
            .lines()
            .filter(|line| !line.starts_with("-----"))
            .collect();

        let ciphertext = encrypt("123456", &bare).unwrap();
        assert_eq!(decrypt(&private_key, &ciphertext), "123456");
    }

    #[test]
    fn ciphertext_differs_per_call() {
        let (_, public_pem) = test_key_pair();
        let first = encrypt("9876543210", &public_pem).unwrap();
        let second = encrypt("9876543210", &public_pem).unwrap();
        // OAEP is randomized
        assert_ne!(first, second);
    }

    #[test]
    fn normalize_wraps_at_64_columns() {
        let bare = "A".repeat(200);
        let pem = normalize_public_key(&bare);
        assert!(pem.starts_with(PEM_HEADER));
        assert!(pem.trim_end().ends_with(PEM_FOOTER));
        let body: Vec<&str> = pem
            .lines()
            .filter(|line| !line.starts_with("-----"))
            .collect();
        assert!(body[..body.len() - 1].iter().all(|line| line.len() == 64));
    }

    #[test]
    fn normalize_passes_pem_through() {
        let (_, public_pem) = test_key_pair();
        assert_eq!(normalize_public_key(&public_pem), public_pem);
    }

    #[test]
    fn garbage_key_is_an_encryption_error() {
        assert!(matches!(
            encrypt("otp", "not-a-key"),
            Err(GatewayError::Encryption(_))
        ));
    }
}
