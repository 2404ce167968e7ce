use std::{fs, io};

use anyhow::{bail, Context, Result};
use log::info;

use crate::rsa::generate_rsa_keys;

use super::config::{TokenConfig, TokenKind};
use super::jwt::{JwtTokenGenerator, JwtTokenValidator};
use super::plain::PlainTokenValidator;
use super::UnionTokenValidator;

pub struct TokenFactory {
    kind: TokenKind,
    allow_users: Vec<String>,
    keys: Option<(Vec<u8>, Vec<u8>)>,
    expiry: u64,
}

impl TokenFactory {
    pub fn new(cfg: &TokenConfig) -> Result<Self> {
        let keys = match cfg.kind {
            TokenKind::Plain => None,
            TokenKind::Jwt => Some(Self::load_keys(cfg)?),
        };

        Ok(Self {
            kind: cfg.kind,
            allow_users: cfg.allow_users.clone(),
            keys,
            expiry: cfg.expiry,
        })
    }

    fn load_keys(cfg: &TokenConfig) -> Result<(Vec<u8>, Vec<u8>)> {
        match fs::read(&cfg.public_key_path) {
            Ok(public_key) => {
                let private_key = fs::read(&cfg.private_key_path)
                    .context("read token private key failed")?;
                Ok((public_key, private_key))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound && cfg.generate_if_not_exists => {
                info!("Public key and private key for token not found, generating with rsa");
                let (public_key, private_key) = generate_rsa_keys()?;
                fs::write(&cfg.public_key_path, &public_key)
                    .context("write token public key")?;
                fs::write(&cfg.private_key_path, &private_key)
                    .context("write token private key")?;
                Ok((public_key, private_key))
            }
            Err(err) => Err(err).context("read token public key failed"),
        }
    }

    pub fn build_token_generator(&self) -> Result<JwtTokenGenerator> {
        match self.keys {
            Some((_, ref private_key)) => JwtTokenGenerator::new(private_key, self.expiry),
            None => bail!("token generation requires jwt tokens, the server uses plain tokens"),
        }
    }

    pub fn build_token_validator(&self) -> Result<UnionTokenValidator> {
        match self.kind {
            TokenKind::Plain => Ok(UnionTokenValidator::Plain(PlainTokenValidator::new(
                self.allow_users.clone(),
            ))),
            TokenKind::Jwt => match self.keys {
                Some((ref public_key, _)) => {
                    Ok(UnionTokenValidator::Jwt(JwtTokenValidator::new(public_key)?))
                }
                None => bail!("missing public key for jwt token validation"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{CommonConfig, PathSet};

    use super::super::{TokenGenerator, TokenValidator};
    use super::*;

    #[test]
    fn test_factory() {
        let ps = PathSet::new_test("token_factory");
        let _ = fs::remove_file(ps.pki_path.join("token_public.pem"));
        let _ = fs::remove_file(ps.pki_path.join("token_private.pem"));

        let mut cfg = TokenConfig::default();
        cfg.complete(&ps).unwrap();
        let factory = TokenFactory::new(&cfg).unwrap();
        assert!(factory.build_token_generator().is_err());
        let validator = factory.build_token_validator().unwrap();
        assert!(matches!(validator, UnionTokenValidator::Plain(_)));

        cfg.kind = TokenKind::Jwt;
        let factory = TokenFactory::new(&cfg).unwrap();
        assert!(ps.pki_path.join("token_public.pem").exists());
        assert!(ps.pki_path.join("token_private.pem").exists());

        let generator = factory.build_token_generator().unwrap();
        let validator = factory.build_token_validator().unwrap();
        let token = generator.generate_token("Alice".to_string()).unwrap();
        assert_eq!(validator.validate_token(&token.token).unwrap(), "Alice");

        // The second factory reuses the generated keys
        let factory = TokenFactory::new(&cfg).unwrap();
        let validator = factory.build_token_validator().unwrap();
        assert_eq!(validator.validate_token(&token.token).unwrap(), "Alice");
    }
}
