use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::Args;
use console::style;

use crate::docs::lint::{self, LintOptions};

use super::{LogArgs, RunCommand};

/// Check a Markdown article: unresolved TBD markers, code blocks that don't
/// parse, broken links and malformed permission tables.
#[derive(Args)]
pub struct LintArgs {
    /// The Markdown file to check.
    pub file: PathBuf,

    /// Request every http(s) link and report the ones that fail.
    #[arg(long)]
    pub check_links: bool,

    /// Require at least one permission table (first column 'Role').
    #[arg(long)]
    pub roles_table: bool,

    /// Timeout for each link request.
    #[arg(long, default_value = "10")]
    pub timeout_secs: u64,

    #[command(flatten)]
    pub log: LogArgs,
}

#[async_trait]
impl RunCommand for LintArgs {
    async fn run(&self) -> Result<()> {
        self.log.init("warn")?;

        let text = fs::read_to_string(&self.file)
            .with_context(|| format!("read file {}", self.file.display()))?;
        let opts = LintOptions {
            check_links: self.check_links,
            require_roles_table: self.roles_table,
        };

        let mut report = lint::lint_text(&text, &opts);
        if opts.check_links {
            let timeout = Duration::from_secs(self.timeout_secs);
            let findings = lint::check_links(&report.links, timeout).await?;
            report.findings.extend(findings);
            report.findings.sort_by_key(|f| (f.line, f.kind));
        }

        let name = format!("{}", self.file.display());
        for finding in report.findings.iter() {
            finding.show(&name);
        }

        if !report.findings.is_empty() {
            bail!("{} problem(s) found in {name}", report.findings.len());
        }

        println!(
            "{} {name}: {} link(s) found, no problems",
            style("ok").green().bold(),
            report.links.len()
        );
        Ok(())
    }
}
