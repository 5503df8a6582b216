//! Manage json web tokens.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Pieces of information asserted on a JWT.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    /// Identifies the organization that issued the JWT.
    pub iss: String,
    /// Identifies the time at which the JWT was issued.
    pub iat: u64,
    /// Expiration time; absent unless an expiry is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// Manage JWT tokens signed with the service secret.
#[derive(Clone)]
pub struct TokenManager {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    expiry: Option<u64>,
}

impl TokenManager {
    /// Create a new [`TokenManager`] instance.
    pub fn new(secret: &str, issuer: &str) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_owned(),
            expiry: None,
        }
    }

    /// Set token lifetime, in seconds. Tokens never expire by default.
    pub fn expiry(&mut self, seconds: u64) {
        self.expiry = Some(seconds);
    }

    /// Create a new token bound to a user ID.
    pub fn create(&self, user_id: i32) -> Result<String> {
        let time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|err| crate::error::ServerError::Internal {
                details: "system clock before unix epoch".into(),
                source: Some(Box::new(err)),
            })?
            .as_secs();
        let header = Header::new(self.algorithm);
        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            iat: time,
            exp: self.expiry.map(|seconds| time + seconds),
        };

        Ok(encode(&header, &claims, &self.encoding_key)?)
    }

    /// Decode and check a token.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["sub", "iss"]);
        validation.validate_exp = self.expiry.is_some();

        Ok(decode::<Claims>(token, &self.decoding_key, &validation)?.claims)
    }
}
