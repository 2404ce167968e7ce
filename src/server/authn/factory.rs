use anyhow::Result;
use log::{info, warn};

use super::anonymous::AnonymousAuthenticator;
use super::bearer_token::BearerTokenAuthenticator;
use super::chain::ChainAuthenticator;
use super::config::AuthnConfig;
use super::token::config::TokenKind;
use super::token::factory::TokenFactory;
use super::token::UnionTokenValidator;
use super::union::UnionAuthenticator;

/// Factory for building authentication chains based on configuration.
///
/// This factory creates a chain of authenticators in the following order:
/// 1. Bearer token authentication (always enabled)
/// 2. Anonymous authentication (if enabled in config)
pub struct AuthnFactory;

impl AuthnFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn build_authenticator(
        &self,
        cfg: &AuthnConfig,
        token_factory: &TokenFactory,
    ) -> Result<ChainAuthenticator<UnionTokenValidator>> {
        let mut authenticators = Vec::new();

        if cfg.token.kind == TokenKind::Plain {
            warn!("Using plain bearer tokens, the token is trusted as the user key. DO NOT USE IN PRODUCTION");
        }
        let validator = token_factory.build_token_validator()?;
        let token_auth = BearerTokenAuthenticator::new(validator);
        authenticators.push(UnionAuthenticator::Bearer(token_auth));

        if cfg.allow_anonymous {
            info!("Anonymous authentication is enabled");
            let anonymous_auth = AnonymousAuthenticator::new();
            authenticators.push(UnionAuthenticator::Anonymous(anonymous_auth));
        }

        Ok(ChainAuthenticator::new(authenticators))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use crate::config::CommonConfig;
    use crate::server::authn::token::config::TokenConfig;
    use crate::server::authn::{Authenticator, AuthnResponse, AuthnUserInfo};

    use super::*;

    fn mock_token_factory() -> TokenFactory {
        TokenFactory::new(&TokenConfig::default()).unwrap()
    }

    #[test]
    fn test_factory() {
        let factory = AuthnFactory::new();
        let token_factory = mock_token_factory();

        let cfg = AuthnConfig::default();
        let chain = factory.build_authenticator(&cfg, &token_factory).unwrap();
        assert_eq!(chain.names(), vec!["bearer", "anonymous"]);

        let mut cfg = AuthnConfig::default();
        cfg.allow_anonymous = false;
        let chain = factory.build_authenticator(&cfg, &token_factory).unwrap();
        assert_eq!(chain.names(), vec!["bearer"]);
    }

    #[test]
    fn test_chain() {
        let factory = AuthnFactory::new();
        let token_factory = mock_token_factory();
        let chain = factory
            .build_authenticator(&AuthnConfig::default(), &token_factory)
            .unwrap();

        let req = TestRequest::default().to_http_request();
        let resp = chain.authenticate_request(&req, None).unwrap();
        assert_eq!(resp, AuthnResponse::Ok(AuthnUserInfo::anonymous()));

        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer user@permit-todo.app"))
            .to_http_request();
        let resp = chain.authenticate_request(&req, None).unwrap();
        assert_eq!(
            resp,
            AuthnResponse::Ok(AuthnUserInfo {
                name: "user@permit-todo.app".to_string(),
                is_anonymous: false,
            })
        );

        // A broken token is never downgraded to anonymous
        let req = TestRequest::default()
            .insert_header(("Authorization", "Token user@permit-todo.app"))
            .to_http_request();
        let resp = chain.authenticate_request(&req, None).unwrap();
        assert_eq!(resp, AuthnResponse::Unauthenticated);

        let mut cfg = AuthnConfig::default();
        cfg.allow_anonymous = false;
        let chain = factory.build_authenticator(&cfg, &token_factory).unwrap();
        let req = TestRequest::default().to_http_request();
        let resp = chain.authenticate_request(&req, None).unwrap();
        assert_eq!(resp, AuthnResponse::Continue);
    }
}
