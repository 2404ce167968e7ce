use actix_web::HttpRequest;
use anyhow::Result;

use super::anonymous::AnonymousAuthenticator;
use super::bearer_token::BearerTokenAuthenticator;
use super::token::TokenValidator;
use super::{Authenticator, AuthnResponse, AuthnUserInfo};

/// The authenticators a chain can hold, dispatched statically.
pub enum UnionAuthenticator<T: TokenValidator> {
    Bearer(BearerTokenAuthenticator<T>),
    Anonymous(AnonymousAuthenticator),
}

impl<T: TokenValidator> UnionAuthenticator<T> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bearer(_) => "bearer",
            Self::Anonymous(_) => "anonymous",
        }
    }
}

impl<T> Authenticator for UnionAuthenticator<T>
where
    T: TokenValidator + Send + Sync,
{
    fn authenticate_request(
        &self,
        req: &HttpRequest,
        user: Option<AuthnUserInfo>,
    ) -> Result<AuthnResponse> {
        match self {
            Self::Bearer(auth) => auth.authenticate_request(req, user),
            Self::Anonymous(auth) => auth.authenticate_request(req, user),
        }
    }
}
