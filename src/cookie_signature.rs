//! Optional HMAC signing of the session cookie value
//!
//! Signed values look like `token.signature`, where the signature is the
//! unpadded URL-safe base64 of HMAC-SHA256(token, secret). A forged or
//! tampered cookie is rejected before the store is ever consulted.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Sign a token with `secret`
pub fn sign(token: &str, secret: &str) -> String {
    let signature = mac(token, secret).finalize().into_bytes();
    format!("{}.{}", token, URL_SAFE_NO_PAD.encode(signature))
}

/// Verify a signed value against every secret in turn.
/// Returns the token on the first match.
pub fn unsign<'a>(signed_value: &'a str, secrets: &[String]) -> Option<&'a str> {
    let (token, signature) = signed_value.rsplit_once('.')?;
    if token.is_empty() {
        return None;
    }
    let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

    // verify_slice compares in constant time
    secrets
        .iter()
        .any(|secret| mac(token, secret).verify_slice(&signature).is_ok())
        .then_some(token)
}

/// Produce the cookie value for a token: signed with the first secret, or bare
pub fn encode(token: &str, secrets: &[String]) -> String {
    match secrets.first() {
        Some(secret) => sign(token, secret),
        None => token.to_string(),
    }
}

/// Recover the token from a cookie value, `None` if empty or badly signed
pub fn decode<'a>(value: &'a str, secrets: &[String]) -> Option<&'a str> {
    if value.is_empty() {
        return None;
    }
    if secrets.is_empty() {
        return Some(value);
    }
    unsign(value, secrets)
}

fn mac(token: &str, secret: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(token.as_bytes());
    mac
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sign_and_unsign() {
        let signed = sign("0123abcd", "keyboard cat");
        assert!(signed.starts_with("0123abcd."));
        assert!(!signed.ends_with('='));

        assert_eq!(unsign(&signed, &secrets(&["keyboard cat"])), Some("0123abcd"));
    }

    #[test]
    fn test_wrong_secret() {
        let signed = sign("0123abcd", "keyboard cat");
        assert_eq!(unsign(&signed, &secrets(&["wrong secret"])), None);
    }

    #[test]
    fn test_tampered_token() {
        let signed = sign("0123abcd", "secret");
        let (_, signature) = signed.rsplit_once('.').unwrap();
        let forged = format!("ffffffff.{}", signature);
        assert_eq!(unsign(&forged, &secrets(&["secret"])), None);
    }

    #[test]
    fn test_malformed_values() {
        let list = secrets(&["secret"]);
        assert_eq!(unsign("no-signature", &list), None);
        assert_eq!(unsign(".abc", &list), None);
        assert_eq!(unsign("token.not base64!", &list), None);
    }

    #[test]
    fn test_secret_rotation() {
        let signed = sign("session-token", "old-secret");
        let list = secrets(&["new-secret", "old-secret"]);
        assert_eq!(unsign(&signed, &list), Some("session-token"));

        // new cookies are signed with the first secret
        let fresh = encode("session-token", &list);
        assert_eq!(fresh, sign("session-token", "new-secret"));
    }

    #[test]
    fn test_unsigned_mode() {
        assert_eq!(encode("abc", &[]), "abc");
        assert_eq!(decode("abc", &[]), Some("abc"));
        assert_eq!(decode("", &[]), None);
        assert_eq!(decode("", &secrets(&["secret"])), None);
    }
}
