use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::GameError;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

// The claims struct used for creating a Bearer token
#[derive(Deserialize, Serialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
    pub typ: TokenKind,
}

/// Issues and verifies HS256 tokens. Durations are in seconds.
#[derive(Clone)]
pub struct JwtProvider {
    secret: String,
    access_duration: i64,
    refresh_duration: i64,
}

impl JwtProvider {
    pub fn new(secret: impl Into<String>, access_duration: i64, refresh_duration: i64) -> Self {
        Self { secret: secret.into(), access_duration, refresh_duration }
    }

    pub fn access_duration(&self) -> i64 {
        self.access_duration
    }

    pub fn issue(&self, user_id: Uuid, kind: TokenKind) -> Result<String, GameError> {
        let duration = match kind {
            TokenKind::Access => self.access_duration,
            TokenKind::Refresh => self.refresh_duration,
        };
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: user_id.to_string(),        // user id
            iat: now as usize,               // valid from
            exp: (now + duration) as usize,  // valid until
            typ: kind,
        };
        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, GameError> {
        Ok(encode(&Header::default(), claims, &EncodingKey::from_secret(self.secret.as_bytes()))?)
    }

    /// Returns the user id of a valid, unexpired token of the expected kind.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Uuid, GameError> {
        let unauthorized = || GameError::Unauthorized("Invalid or expired token".to_string());

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|err| {
            debug!("Invalid token: {:?}", err.kind());
            unauthorized()
        })?;

        if data.claims.typ != kind {
            debug!("Expected a {:?} token, got {:?}", kind, data.claims.typ);
            return Err(unauthorized());
        }
        Uuid::parse_str(&data.claims.sub).map_err(|_| unauthorized())
    }
}
