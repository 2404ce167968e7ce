pub mod config;
pub mod factory;
pub mod jwt;
pub mod plain;

use anyhow::Result;

use crate::types::user::TokenResponse;

use jwt::JwtTokenValidator;
use plain::PlainTokenValidator;

pub trait TokenGenerator {
    fn generate_token(&self, user: String) -> Result<TokenResponse>;
}

pub trait TokenValidator {
    /// Validates the token and returns the user key it was issued for.
    fn validate_token(&self, token: &str) -> Result<String>;
}

pub enum UnionTokenValidator {
    Plain(PlainTokenValidator),
    Jwt(JwtTokenValidator),
}

impl TokenValidator for UnionTokenValidator {
    fn validate_token(&self, token: &str) -> Result<String> {
        match self {
            UnionTokenValidator::Plain(v) => v.validate_token(token),
            UnionTokenValidator::Jwt(v) => v.validate_token(token),
        }
    }
}
