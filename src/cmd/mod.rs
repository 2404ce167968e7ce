mod lint;
mod serve;
mod tasks;
mod token;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};

use crate::logs;

#[async_trait]
pub trait RunCommand {
    async fn run(&self) -> Result<()>;
}

#[derive(Args, Debug, Clone, Default)]
pub struct LogArgs {
    /// Log level: error, warn, info or debug.
    #[arg(long)]
    pub log_level: Option<String>,
}

impl LogArgs {
    pub fn init(&self, default: &str) -> Result<()> {
        let level = self.log_level.as_deref().unwrap_or(default);
        logs::init(level)
    }
}

#[derive(Parser)]
#[command(author, version = env!("PERMIT_TODO_VERSION"), about)]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Serve(serve::ServeArgs),
    Tasks(tasks::TasksCommand),
    Token(token::TokenArgs),
    Lint(lint::LintArgs),
}

#[async_trait]
impl RunCommand for App {
    async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Serve(args) => args.run().await,
            Commands::Tasks(args) => args.run().await,
            Commands::Token(args) => args.run().await,
            Commands::Lint(args) => args.run().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli() {
        App::command().debug_assert();

        let app = App::try_parse_from([
            "permit-todo",
            "tasks",
            "list",
            "--owner",
            "user@permit-todo.app",
            "--token",
            "user@permit-todo.app",
        ])
        .unwrap();
        assert!(matches!(app.command, Commands::Tasks(_)));

        let app = App::try_parse_from(["permit-todo", "lint", "README.md", "--check-links"]);
        assert!(app.is_ok());

        let app = App::try_parse_from(["permit-todo", "tasks", "cani", "fly"]);
        assert!(app.is_err());
    }
}
