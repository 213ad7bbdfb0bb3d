use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, TokenData, Validation};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};
use snafu::{Location, OptionExt as _, ResultExt as _, Snafu};

/// The authenticated identity behind a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub uid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AuthError {
    #[snafu(display("failed to decode JWT token: {source}"))]
    Decode {
        source: jsonwebtoken::errors::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to encode JWT token: {source}"))]
    Encode {
        source: jsonwebtoken::errors::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("request does not carry a bearer token"))]
    ExtractToken {
        #[snafu(implicit)]
        location: Location,
    },
}

/// Verifies bearer tokens signed with a shared secret.
#[derive(Clone)]
pub struct Authenticator {
    secret: SecretString,
    algorithm: Algorithm,
    validation: Validation,
}

impl Authenticator {
    pub fn new(secret: SecretString, algorithm: Algorithm) -> Self {
        Self {
            secret,
            algorithm,
            validation: Validation::new(algorithm),
        }
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.expose_secret().as_ref())
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.expose_secret().as_ref())
    }

    pub fn decode(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        jsonwebtoken::decode(token, &self.decoding_key(), &self.validation).context(DecodeSnafu)
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        let header = jsonwebtoken::Header::new(self.algorithm);
        jsonwebtoken::encode(&header, claims, &self.encoding_key()).context(EncodeSnafu)
    }

    pub fn expiration(&self) -> i64 {
        (Utc::now() + Duration::days(7)).timestamp()
    }

    /// Mint a token for `uid` that is valid for seven days.
    pub fn issue(&self, uid: impl Into<String>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: uid.into(),
            exp: self.expiration(),
        };

        self.encode(&claims)
    }

    /// Establish who is calling from the `Authorization: Bearer <token>` header.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Caller, AuthError> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .context(ExtractTokenSnafu)?;

        let TokenData { claims, .. } = self.decode(token.trim())?;
        Ok(Caller { uid: claims.sub })
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
