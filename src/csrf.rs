//! csrf.rs
//!
//! Защита формы от подделки запросов. Каждый клиент получает случайный
//! nonce в cookie `jq_csrf`, а в форму кладётся токен
//! `<unix_secs>.<base64url(HMAC-SHA256(secret, nonce ":" unix_secs))>`.
//! Токен принимается только вместе с cookie того же клиента и живёт час.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

pub const FIELD: &str = "csrf_token";
pub const COOKIE: &str = "jq_csrf";
pub const TIME_LIMIT_SECS: i64 = 3600;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfRejection {
    Missing,
    SessionMissing,
    Invalid,
    Expired,
}

impl CsrfRejection {
    pub fn message(&self) -> &'static str {
        match self {
            CsrfRejection::Missing => "The CSRF token is missing.",
            CsrfRejection::SessionMissing => "The CSRF session token is missing.",
            CsrfRejection::Invalid => "The CSRF token is invalid.",
            CsrfRejection::Expired => "The CSRF token has expired.",
        }
    }
}

#[derive(Debug, Error)]
#[error("SECRET_KEY cannot be used as an HMAC key")]
pub struct InvalidSecret;

#[derive(Clone)]
pub struct CsrfGuard {
    mac: HmacSha256,
}

impl CsrfGuard {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, InvalidSecret> {
        let mac = HmacSha256::new_from_slice(secret.as_ref()).map_err(|_| InvalidSecret)?;
        Ok(Self { mac })
    }

    /// Новый nonce клиента для cookie.
    pub fn new_nonce() -> String {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    pub fn issue(&self, nonce: &str) -> String {
        self.issue_at(nonce, Utc::now())
    }

    pub fn issue_at(&self, nonce: &str, now: DateTime<Utc>) -> String {
        let issued = now.timestamp();
        let tag = self.tagged(nonce, issued).finalize().into_bytes();
        format!("{}.{}", issued, URL_SAFE_NO_PAD.encode(tag))
    }

    pub fn verify(&self, token: &str, nonce: Option<&str>) -> Result<(), CsrfRejection> {
        self.verify_at(token, nonce, Utc::now())
    }

    pub fn verify_at(
        &self,
        token: &str,
        nonce: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), CsrfRejection> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CsrfRejection::Missing);
        }
        let nonce = nonce
            .filter(|n| !n.is_empty())
            .ok_or(CsrfRejection::SessionMissing)?;

        let (issued, signature) = token.split_once('.').ok_or(CsrfRejection::Invalid)?;
        let issued: i64 = issued.parse().map_err(|_| CsrfRejection::Invalid)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| CsrfRejection::Invalid)?;

        // verify_slice сравнивает за постоянное время
        self.tagged(nonce, issued)
            .verify_slice(&signature)
            .map_err(|_| CsrfRejection::Invalid)?;

        let age = now.timestamp() - issued;
        if !(0..=TIME_LIMIT_SECS).contains(&age) {
            return Err(CsrfRejection::Expired);
        }

        Ok(())
    }

    fn tagged(&self, nonce: &str, issued: i64) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(nonce.as_bytes());
        mac.update(b":");
        mac.update(issued.to_string().as_bytes());
        mac
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const NONCE: &str = "client-a";

    fn guard() -> CsrfGuard {
        CsrfGuard::new("s3cret").unwrap()
    }

    #[test]
    fn fresh_token_verifies_for_its_client() {
        let guard = guard();
        let token = guard.issue(NONCE);
        assert_eq!(guard.verify(&token, Some(NONCE)), Ok(()));
    }

    #[test]
    fn empty_token_is_missing() {
        assert_eq!(guard().verify("", Some(NONCE)), Err(CsrfRejection::Missing));
    }

    #[test]
    fn token_without_cookie_is_rejected() {
        let guard = guard();
        let token = guard.issue(NONCE);

        assert_eq!(guard.verify(&token, None), Err(CsrfRejection::SessionMissing));
        assert_eq!(guard.verify(&token, Some("")), Err(CsrfRejection::SessionMissing));
    }

    #[test]
    fn token_from_another_client_is_invalid() {
        let guard = guard();
        let token = guard.issue("client-b");

        assert_eq!(guard.verify(&token, Some(NONCE)), Err(CsrfRejection::Invalid));
    }

    #[test]
    fn tampered_or_foreign_tokens_are_invalid() {
        let guard = guard();
        let now = Utc::now();
        let token = guard.issue_at(NONCE, now);

        let (_, signature) = token.split_once('.').unwrap();
        let shifted = format!("{}.{}", now.timestamp() + 1, signature);
        assert_eq!(guard.verify_at(&shifted, Some(NONCE), now), Err(CsrfRejection::Invalid));

        let foreign = CsrfGuard::new("other").unwrap().issue_at(NONCE, now);
        assert_eq!(guard.verify_at(&foreign, Some(NONCE), now), Err(CsrfRejection::Invalid));

        assert_eq!(guard.verify_at("garbage", Some(NONCE), now), Err(CsrfRejection::Invalid));
        assert_eq!(guard.verify_at("1.@@@", Some(NONCE), now), Err(CsrfRejection::Invalid));
    }

    #[test]
    fn token_expires_after_an_hour() {
        let guard = guard();
        let issued = Utc::now() - Duration::seconds(TIME_LIMIT_SECS + 1);
        let token = guard.issue_at(NONCE, issued);

        assert_eq!(guard.verify(&token, Some(NONCE)), Err(CsrfRejection::Expired));
    }

    #[test]
    fn nonces_are_unique() {
        assert_ne!(CsrfGuard::new_nonce(), CsrfGuard::new_nonce());
    }
}
