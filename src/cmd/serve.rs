use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;
use log::info;

use crate::config::ConfigArgs;
use crate::display;
use crate::server::config::ServerConfig;
use crate::server::factory::ServerFactory;

use super::{LogArgs, RunCommand};

/// Start the task api server. Write operations are authorized by the policy
/// decision point (or the local permission table).
#[derive(Args)]
pub struct ServeArgs {
    /// Print server configuration data (JSON) and exit.
    #[arg(long)]
    pub print_config: bool,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[async_trait]
impl RunCommand for ServeArgs {
    async fn run(&self) -> Result<()> {
        let cfg: ServerConfig = self.config.load("server")?;
        if self.print_config {
            return display::pretty_json(cfg);
        }

        self.log.init(&cfg.log_level)?;
        info!("Starting permit-todo {}", env!("PERMIT_TODO_VERSION"));

        let factory = ServerFactory::new(cfg)?;
        let srv = factory.build_server()?;
        srv.run().await.context("run restful server")
    }
}
