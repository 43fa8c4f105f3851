//! Session tokens carried in a cookie.
//!
//! The cookie holds an HS256 token with the user's id and name. Nothing is
//! stored server-side; signing out means telling the client to drop it.

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use bookshelf_kernel::settings::AuthSettings;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The authenticated user behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user_id: i64,
    username: String,
    iat: u64,
    exp: u64,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("invalid session token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Signs, verifies, and formats session cookies. Clones share the keys.
#[derive(Clone)]
pub struct SessionKeys {
    inner: Arc<Inner>,
}

struct Inner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
    cookie_name: String,
    secure: bool,
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl_secs: u64, cookie_name: impl Into<String>, secure: bool) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            inner: Arc::new(Inner {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
                validation,
                ttl_secs,
                cookie_name: cookie_name.into(),
                secure,
            }),
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(
            settings.secret_key.as_bytes(),
            settings.session_ttl_secs,
            settings.cookie_name.clone(),
            settings.secure_cookie,
        )
    }

    pub fn cookie_name(&self) -> &str {
        &self.inner.cookie_name
    }

    /// Sign a token for `user_id` valid for the configured lifetime.
    pub fn issue(&self, user_id: i64, username: &str) -> Result<String, SessionError> {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            user_id,
            username: username.to_string(),
            iat: now,
            exp: now + self.inner.ttl_secs,
        };
        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.inner.encoding,
        )?)
    }

    /// Check signature and expiry and recover the session.
    pub fn verify(&self, token: &str) -> Result<Session, SessionError> {
        let data = decode::<Claims>(token, &self.inner.decoding, &self.inner.validation)?;
        Ok(Session {
            user_id: data.claims.user_id,
            username: data.claims.username,
        })
    }

    /// `Set-Cookie` value that establishes the session.
    pub fn session_cookie(&self, token: &str) -> String {
        self.cookie(token, self.inner.ttl_secs)
    }

    /// `Set-Cookie` value that makes the client forget the session.
    pub fn clear_cookie(&self) -> String {
        self.cookie("", 0)
    }

    fn cookie(&self, value: &str, max_age: u64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.inner.cookie_name, value, max_age
        );
        if self.inner.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// The session token from the request's `Cookie` headers, if any.
    pub fn token_from_headers<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == self.inner.cookie_name && !value.is_empty())
            .map(|(_, value)| value)
    }
}
