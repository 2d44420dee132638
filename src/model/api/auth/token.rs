use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, TokenData, Validation};
use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;
use crate::model::common::VoterId;

use super::RegistrationClaims;

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// The claims of a token issued by the identity gateway.
#[derive(Debug, Serialize, Deserialize)]
pub struct GatewayClaims {
    /// The verified voter ID.
    pub sub: String,
    #[serde(rename = "exp", with = "ts_seconds")]
    pub expire_at: DateTime<Utc>,
    /// Registration attributes, present on tokens issued around sign-up.
    #[serde(rename = "reg", default, skip_serializing_if = "Option::is_none")]
    pub registration: Option<RegistrationClaims>,
}

/// A verified voter, as vouched for by the identity gateway.
#[derive(Debug)]
pub struct VoterToken {
    pub voter_id: VoterId,
    pub registration: RegistrationClaims,
}

impl VoterToken {
    /// Verify and decode a raw gateway token.
    pub fn decode(token: &str, config: &Config) -> Result<Self, Error> {
        let claims = jsonwebtoken::decode(
            token,
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|data: TokenData<GatewayClaims>| data.claims)?;

        if claims.sub.trim().is_empty() {
            return Err(Error::Unauthorized("Token has no subject".to_string()));
        }
        Ok(Self {
            voter_id: VoterId::new(claims.sub),
            registration: claims.registration.unwrap_or_default(),
        })
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for VoterToken {
    type Error = Error;

    /// Read the gateway token from the auth cookie, or failing that from a
    /// bearer `Authorization` header, and verify it.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = match req.rocket().state::<Config>() {
            Some(config) => config,
            None => {
                return Outcome::Failure((
                    Status::InternalServerError,
                    Error::Misconfigured("Config is not managed".to_string()),
                ))
            }
        };

        let raw = req
            .cookies()
            .get(AUTH_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .or_else(|| {
                req.headers()
                    .get_one("Authorization")
                    .and_then(|header| header.strip_prefix("Bearer "))
                    .map(str::to_string)
            });
        let raw = match raw {
            Some(raw) => raw,
            None => {
                return Outcome::Failure((
                    Status::Unauthorized,
                    Error::Unauthorized("No gateway token".to_string()),
                ))
            }
        };

        match Self::decode(&raw, config) {
            Ok(token) => Outcome::Success(token),
            Err(err) => Outcome::Failure((Status::Unauthorized, err)),
        }
    }
}
