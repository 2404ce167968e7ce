use anyhow::{bail, Result};
use async_trait::async_trait;
use clap::{Args, Subcommand};
use console::style;

use crate::client::config::ClientConfig;
use crate::client::factory::ClientFactory;
use crate::client::{Client, RequestError};
use crate::config::ConfigArgs;
use crate::display::{self, DisplayStyle};
use crate::types::task::{TaskQuery, TaskRequest};

use super::{LogArgs, RunCommand};

/// Manage tasks on a permit-todo server.
#[derive(Args)]
pub struct TasksCommand {
    #[command(subcommand)]
    pub command: TasksCommands,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[derive(Args)]
pub struct ClientArgs {
    /// Bearer token, overrides the token in client config.
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Print client configuration data (JSON) and exit.
    #[arg(long, global = true)]
    pub print_config: bool,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Subcommand)]
pub enum TasksCommands {
    /// List tasks, readable without a token when tasks are public.
    List(ListArgs),
    /// Show one task.
    Get(IdArgs),
    /// Create a task owned by the current user.
    Create(CreateArgs),
    /// Change title or checked state of a task.
    Update(UpdateArgs),
    /// Mark a task as done.
    Check(IdArgs),
    /// Delete a task.
    Delete(IdArgs),
    /// Show the user the token belongs to.
    Whoami,
    /// Ask the server whether the current user may perform an action.
    Cani(CaniArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Only show tasks of this owner.
    #[arg(long)]
    pub owner: Option<String>,

    /// Filter by checked state.
    #[arg(long)]
    pub checked: Option<bool>,

    #[arg(long)]
    pub offset: Option<u64>,

    #[arg(long)]
    pub limit: Option<u64>,

    #[arg(short, long, default_value = "table")]
    pub output: DisplayStyle,
}

#[derive(Args)]
pub struct IdArgs {
    pub id: u64,
}

#[derive(Args)]
pub struct CreateArgs {
    pub title: String,

    #[arg(long)]
    pub checked: bool,
}

#[derive(Args)]
pub struct UpdateArgs {
    pub id: u64,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub checked: Option<bool>,
}

#[derive(Args)]
pub struct CaniArgs {
    /// One of: get, post, put, delete
    #[arg(value_parser = ["get", "post", "put", "delete"])]
    pub action: String,

    /// Check against an existing task.
    pub id: Option<u64>,
}

#[async_trait]
impl RunCommand for TasksCommand {
    async fn run(&self) -> Result<()> {
        let cfg: ClientConfig = self.client.config.load("client")?;
        if self.client.print_config {
            return display::pretty_json(cfg);
        }
        self.client.log.init("warn")?;

        let client = ClientFactory::new(cfg)
            .with_token(self.client.token.clone())
            .build_client()
            .await?;

        let result = self.run_command(&client).await;
        if let Err(err) = &result {
            if let Some(req_err) = err.downcast_ref::<RequestError>() {
                if req_err.is_not_found() {
                    bail!("task not found");
                }
                if req_err.is_forbidden() {
                    bail!("not authorized, try `tasks cani` to see what you may do");
                }
            }
        }
        result
    }
}

impl TasksCommand {
    async fn run_command(&self, client: &Client) -> Result<()> {
        match &self.command {
            TasksCommands::List(args) => list(client, args).await,
            TasksCommands::Get(args) => {
                let task = client.get_task(args.id).await?;
                display::pretty_json(task)
            }
            TasksCommands::Create(args) => {
                let req = TaskRequest {
                    title: Some(args.title.clone()),
                    checked: if args.checked { Some(true) } else { None },
                };
                let task = client.create_task(&req).await?;
                display::pretty_json(task)
            }
            TasksCommands::Update(args) => {
                if args.title.is_none() && args.checked.is_none() {
                    bail!("nothing to update, use --title or --checked");
                }
                let req = TaskRequest {
                    title: args.title.clone(),
                    checked: args.checked,
                };
                let task = client.update_task(args.id, &req).await?;
                display::pretty_json(task)
            }
            TasksCommands::Check(args) => {
                let req = TaskRequest {
                    title: None,
                    checked: Some(true),
                };
                let task = client.update_task(args.id, &req).await?;
                println!("Task {} '{}' checked", task.id, task.title);
                Ok(())
            }
            TasksCommands::Delete(args) => {
                let task = client.delete_task(args.id).await?;
                println!("Task {} '{}' deleted", task.id, task.title);
                Ok(())
            }
            TasksCommands::Whoami => {
                let name = client.whoami().await?;
                println!("{name}");
                Ok(())
            }
            TasksCommands::Cani(args) => {
                let allow = client.cani(&args.action, args.id).await?;
                if allow {
                    println!("{}", style("yes").green().bold());
                } else {
                    println!("{}", style("no").red().bold());
                }
                Ok(())
            }
        }
    }
}

async fn list(client: &Client, args: &ListArgs) -> Result<()> {
    let query = TaskQuery {
        owner: args.owner.clone(),
        checked: args.checked,
        offset: args.offset,
        limit: args.limit,
    };
    let tasks = client.list_tasks(&query).await?;
    display::display_list(tasks, args.output)
}
