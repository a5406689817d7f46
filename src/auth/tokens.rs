use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

/// One-time email verification token. The raw value goes into the email and
/// is never stored; only the SHA-256 digest is persisted, so a leaked
/// database exposes no usable tokens.
pub struct VerificationToken {
    pub raw: String,
    pub digest: String,
    pub expires_at: OffsetDateTime,
}

pub fn issue_verification_token(ttl_hours: i64) -> VerificationToken {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let raw = hex::encode(bytes);
    VerificationToken {
        digest: digest_token(&raw),
        raw,
        expires_at: OffsetDateTime::now_utc() + Duration::hours(ttl_hours),
    }
}

/// Lookup at redemption time hashes the incoming value and matches by
/// digest; raw values are never compared against storage.
pub fn digest_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_value_differs_from_digest() {
        let token = issue_verification_token(24);
        assert_eq!(token.raw.len(), 64);
        assert_ne!(token.raw, token.digest);
    }

    #[test]
    fn digest_is_deterministic() {
        let token = issue_verification_token(24);
        assert_eq!(token.digest, digest_token(&token.raw));
    }

    #[test]
    fn tokens_are_unique() {
        let a = issue_verification_token(24);
        let b = issue_verification_token(24);
        assert_ne!(a.raw, b.raw);
        assert_ne!(a.digest, b.digest);
    }

    #[test]
    fn expiry_is_24_hours_out() {
        let token = issue_verification_token(24);
        let delta = token.expires_at - OffsetDateTime::now_utc();
        assert!(delta > Duration::hours(23));
        assert!(delta <= Duration::hours(24));
    }

    #[test]
    fn known_digest_value() {
        // SHA-256 of the ASCII string "abc"
        assert_eq!(
            digest_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
