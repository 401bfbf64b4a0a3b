//! Per-browser session carried in a signed cookie.
//!
//! Holds one-shot flash notices and the CSRF token. The cookie value is
//! `base64url(json) "." base64url(hmac_sha256(json))`; anything that fails to
//! decode or verify is treated as a fresh session.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "mesopotamia_session";

/// Signing key derived from the application secret.
#[derive(Clone)]
pub struct SessionKey([u8; 32]);

impl SessionKey {
    pub fn derive(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self(key)
    }

    fn mac(&self) -> HmacSha256 {
        <HmacSha256 as Mac>::new_from_slice(&self.0).expect("HMAC accepts any key size")
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }

    fn verify(&self, payload: &[u8], signature: &[u8]) -> bool {
        let mut mac = self.mac();
        mac.update(payload);
        mac.verify_slice(signature).is_ok()
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Warning,
    Danger,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Warning => "warning",
            FlashLevel::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    csrf_token: Option<String>,
    #[serde(default)]
    flashes: Vec<Flash>,
    #[serde(skip)]
    dirty: bool,
}

impl Session {
    /// Load the session from the request's `Cookie` headers.
    pub fn from_headers(headers: &HeaderMap, key: &SessionKey) -> Self {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .and_then(|(_, value)| Self::decode(value, key))
            .unwrap_or_default()
    }

    pub fn decode(value: &str, key: &SessionKey) -> Option<Self> {
        let (payload, signature) = value.split_once('.')?;
        let payload = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;
        if !key.verify(&payload, &signature) {
            tracing::debug!("session cookie signature mismatch; starting fresh session");
            return None;
        }
        serde_json::from_slice(&payload).ok()
    }

    pub fn encode(&self, key: &SessionKey) -> String {
        // Serializing a struct of strings cannot fail.
        let payload = serde_json::to_vec(self).unwrap_or_default();
        let signature = key.sign(&payload);
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(signature)
        )
    }

    pub fn flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        self.flashes.push(Flash {
            level,
            message: message.into(),
        });
        self.dirty = true;
    }

    /// Pending notices, removed from the session so they show only once.
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        if !self.flashes.is_empty() {
            self.dirty = true;
        }
        std::mem::take(&mut self.flashes)
    }

    /// Current CSRF token, minting one on first use.
    pub fn csrf_token(&mut self) -> String {
        if let Some(token) = &self.csrf_token {
            return token.clone();
        }
        let token = uuid::Uuid::new_v4().simple().to_string();
        self.csrf_token = Some(token.clone());
        self.dirty = true;
        token
    }

    pub fn verify_csrf(&self, submitted: Option<&str>) -> bool {
        match (self.csrf_token.as_deref(), submitted) {
            (Some(expected), Some(submitted)) => {
                constant_time_eq(expected.as_bytes(), submitted.as_bytes())
            }
            _ => false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Attach a `Set-Cookie` header when the session changed during the request.
    pub fn apply(&self, mut response: Response, key: &SessionKey) -> Response {
        if !self.dirty {
            return response;
        }
        let cookie = format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            self.encode(key)
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "session cookie not representable as a header"),
        }
        response
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
