use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;

use crate::config::ConfigArgs;
use crate::display;
use crate::server::config::ServerConfig;
use crate::server::{TokenFactory, TokenGenerator};

use super::RunCommand;

/// Issue a signed bearer token for a user. Requires `authn.token.kind = "jwt"`
/// in the server config, the token is signed with the server's private key.
#[derive(Args)]
pub struct TokenArgs {
    /// The user key, e.g. admin@permit-todo.app
    pub user: String,

    /// Only print the token
    #[arg(short, long)]
    pub quiet: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[async_trait]
impl RunCommand for TokenArgs {
    async fn run(&self) -> Result<()> {
        let cfg: ServerConfig = self.config.load("server")?;
        let factory = TokenFactory::new(&cfg.authn.token).context("init token")?;
        let generator = factory.build_token_generator()?;

        let resp = generator.generate_token(self.user.clone())?;
        if self.quiet {
            println!("{}", resp.token);
            return Ok(());
        }
        display::pretty_json(resp)
    }
}
