//! Bearer tokens for customers and food providers.
//!
//! Tokens are HS256 JWTs signed with the configured `token_signing_key`. The
//! subject is the numeric account id and `kind` says which kind of account it
//! is, so a customer token can never be used where a food provider is
//! required.
//!
//! # Example
//!
//! ```rust,no_run
//! use domain::jwt::{issue_token, verify_token, Principal};
//! use events::CustomerId;
//! use service::config::Config;
//!
//! fn example(config: &Config) {
//!     let token = issue_token(config, Principal::User(CustomerId(7))).unwrap();
//!     assert_eq!(verify_token(config, &token.token).unwrap(), Principal::User(CustomerId(7)));
//! }
//! ```

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use chrono::Utc;
use claims::{BearerClaims, PrincipalKind};
use events::{CustomerId, FoodProviderId};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::Serialize;
use service::config::Config;

pub(crate) mod claims;

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    User(CustomerId),
    FoodProvider(FoodProviderId),
}

/// A signed bearer token and the unix time at which it expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub token: String,
    pub expires_at: i64,
}

fn signing_key(config: &Config) -> Result<String, Error> {
    config.token_signing_key().ok_or_else(|| {
        warn!("Failed to get token signing key from config");
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    })
}

pub fn issue_token(config: &Config, principal: Principal) -> Result<Token, Error> {
    let key = signing_key(config)?;

    let (sub, kind) = match principal {
        Principal::User(id) => (id.0, PrincipalKind::User),
        Principal::FoodProvider(id) => (id.0, PrincipalKind::FoodProvider),
    };
    let iat = Utc::now().timestamp();
    let exp = iat.saturating_add(config.token_ttl_secs as i64);

    let token = encode(
        &Header::new(Algorithm::HS256),
        &BearerClaims { sub, kind, iat, exp },
        &EncodingKey::from_secret(key.as_bytes()),
    )?;

    Ok(Token {
        token,
        expires_at: exp,
    })
}

/// Verifies signature and expiry of `token` and returns who it was issued to.
pub fn verify_token(config: &Config, token: &str) -> Result<Principal, Error> {
    let key = signing_key(config)?;

    let data = decode::<BearerClaims>(
        token,
        &DecodingKey::from_secret(key.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;

    Ok(match data.claims.kind {
        PrincipalKind::User => Principal::User(CustomerId(data.claims.sub)),
        PrincipalKind::FoodProvider => Principal::FoodProvider(FoodProviderId(data.claims.sub)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EntityErrorKind;
    use clap::Parser;

    fn config(key: Option<&str>) -> Config {
        let config = Config::parse_from(["ovto"]);
        match key {
            Some(key) => config.set_token_signing_key(key.to_owned()),
            None => config,
        }
    }

    #[test]
    fn issued_tokens_verify_to_the_same_principal() {
        let config = config(Some("test-signing-key"));

        for principal in [
            Principal::User(CustomerId(7)),
            Principal::FoodProvider(FoodProviderId(7)),
        ] {
            let token = issue_token(&config, principal).unwrap();
            assert_eq!(verify_token(&config, &token.token).unwrap(), principal);
        }
    }

    #[test]
    fn token_lifetime_follows_config() {
        let config = config(Some("test-signing-key"));
        let before = Utc::now().timestamp();

        let token = issue_token(&config, Principal::User(CustomerId(1))).unwrap();

        assert!(token.expires_at >= before + config.token_ttl_secs as i64);
    }

    #[test]
    fn a_token_signed_with_another_key_is_unauthenticated() {
        let token = issue_token(&config(Some("one-key")), Principal::User(CustomerId(1))).unwrap();

        let err = verify_token(&config(Some("another-key")), &token.token).unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Unauthenticated))
        );
    }

    #[test]
    fn garbage_is_unauthenticated() {
        let err = verify_token(&config(Some("key")), "not-a-jwt").unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Unauthenticated))
        );
    }

    #[test]
    fn missing_signing_key_is_a_config_error() {
        let config = config(None);
        if config.token_signing_key().is_some() {
            // TOKEN_SIGNING_KEY is set in the environment running the tests
            return;
        }

        let err = issue_token(&config, Principal::User(CustomerId(1))).unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config)
        );
    }
}
