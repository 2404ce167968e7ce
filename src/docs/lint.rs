//! Checks a Markdown article for problems a reader would trip over: leftover
//! `TBD` markers, code blocks that don't parse, dead links and malformed
//! permission tables.

use std::collections::HashSet;
use std::fmt::{self, Display};
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use log::debug;
use reqwest::{Method, Url};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FindingKind {
    Tbd,
    Fence,
    Link,
    Table,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// 1-based line number
    pub line: usize,
    pub kind: FindingKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LintOptions {
    /// Request every external link.
    pub check_links: bool,
    /// The document must contain at least one permission table.
    pub require_roles_table: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub line: usize,
    pub url: String,
}

/// Result of the offline checks, links are kept for the optional online pass.
#[derive(Debug, Default)]
pub struct Report {
    pub findings: Vec<Finding>,
    pub links: Vec<Link>,
}

struct Fence {
    line: usize,
    marker: String,
    lang: String,
    content: Vec<String>,
}

const ALLOW_MARKERS: [&str; 7] = ["✓", "✔", "✅", "yes", "y", "x", "allow"];
const DENY_MARKERS: [&str; 7] = ["✗", "✘", "❌", "no", "n", "-", "deny"];

impl Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FindingKind::Tbd => "tbd",
            FindingKind::Fence => "fence",
            FindingKind::Link => "link",
            FindingKind::Table => "table",
        };
        write!(f, "{name}")
    }
}

impl Finding {
    fn new(line: usize, kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            message: message.into(),
        }
    }

    pub fn show(&self, file: &str) {
        println!(
            "{}:{}: {} {}",
            style(file).bold(),
            self.line,
            style(format!("[{}]", self.kind)).red(),
            self.message
        );
    }
}

/// Runs every check that does not need the network.
pub fn lint_text(text: &str, opts: &LintOptions) -> Report {
    let mut report = Report::default();
    let mut fence: Option<Fence> = None;
    let mut table: Vec<(usize, &str)> = Vec::new();
    let mut has_roles_table = false;

    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;
        let trimmed = line.trim();

        if let Some(open) = fence.as_mut() {
            if is_fence_close(trimmed, &open.marker) {
                if let Some(open) = fence.take() {
                    check_fence(&open, &mut report.findings);
                }
            } else {
                open.content.push(line.to_string());
            }
            continue;
        }

        if trimmed.starts_with('|') {
            table.push((lineno, trimmed));
            check_inline(line, lineno, &mut report);
            continue;
        }
        if !table.is_empty() {
            has_roles_table |= check_table(&table, &mut report.findings);
            table.clear();
        }

        if let Some(open) = parse_fence_open(trimmed, lineno) {
            fence = Some(open);
            continue;
        }

        check_inline(line, lineno, &mut report);
    }

    if let Some(open) = fence {
        report.findings.push(Finding::new(
            open.line,
            FindingKind::Fence,
            format!("code block opened with '{}' is never closed", open.marker),
        ));
    }
    if !table.is_empty() {
        has_roles_table |= check_table(&table, &mut report.findings);
    }

    if opts.require_roles_table && !has_roles_table {
        report.findings.push(Finding::new(
            1,
            FindingKind::Table,
            "no permission table found, expect a table whose first column is 'Role'",
        ));
    }

    report.findings.sort_by_key(|f| (f.line, f.kind));
    report
}

/// TBD markers and links, for any line outside a code block.
fn check_inline(line: &str, lineno: usize, report: &mut Report) {
    if contains_tbd(line) {
        report
            .findings
            .push(Finding::new(lineno, FindingKind::Tbd, "unresolved TBD marker"));
    }

    for url in extract_urls(line) {
        if let Err(e) = Url::parse(&url) {
            report.findings.push(Finding::new(
                lineno,
                FindingKind::Link,
                format!("invalid url '{url}': {e}"),
            ));
            continue;
        }
        report.links.push(Link { line: lineno, url });
    }
    for target in empty_link_targets(line) {
        report.findings.push(Finding::new(
            lineno,
            FindingKind::Link,
            format!("link '{target}' has no target"),
        ));
    }
}

/// Requests every link once, a HEAD first and a GET when the server refuses
/// HEAD. Any status >= 400 or a network error is a finding.
pub async fn check_links(links: &[Link], timeout: Duration) -> Result<Vec<Finding>> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("build link check client")?;

    let mut checked: HashSet<&str> = HashSet::new();
    let mut findings = Vec::new();
    for link in links {
        if !checked.insert(link.url.as_str()) {
            continue;
        }

        debug!("Checking link {}", link.url);
        let message = match request_link(&client, Method::HEAD, &link.url).await {
            Ok(status) if status < 400 => continue,
            _ => match request_link(&client, Method::GET, &link.url).await {
                Ok(status) if status < 400 => continue,
                Ok(status) => format!("'{}' returned status {status}", link.url),
                Err(e) => format!("'{}' is unreachable: {e}", link.url),
            },
        };
        findings.push(Finding::new(link.line, FindingKind::Link, message));
    }
    Ok(findings)
}

async fn request_link(client: &reqwest::Client, method: Method, url: &str) -> Result<u16> {
    let resp = client.request(method, url).send().await?;
    Ok(resp.status().as_u16())
}

fn parse_fence_open(line: &str, lineno: usize) -> Option<Fence> {
    let ch = line.chars().next()?;
    if ch != '`' && ch != '~' {
        return None;
    }
    let count = line.chars().take_while(|c| *c == ch).count();
    if count < 3 {
        return None;
    }

    let marker: String = std::iter::repeat(ch).take(count).collect();
    let info = line[marker.len()..].trim();
    // Backticks are not allowed in the info string of a backtick fence
    if ch == '`' && info.contains('`') {
        return None;
    }
    let lang = info
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();

    Some(Fence {
        line: lineno,
        marker,
        lang,
        content: Vec::new(),
    })
}

fn is_fence_close(line: &str, marker: &str) -> bool {
    let ch = match marker.chars().next() {
        Some(ch) => ch,
        None => return false,
    };
    let count = line.chars().take_while(|c| *c == ch).count();
    count >= marker.len() && line.chars().skip(count).all(char::is_whitespace)
}

fn check_fence(fence: &Fence, findings: &mut Vec<Finding>) {
    let content = fence.content.join("\n");
    if content.trim().is_empty() {
        findings.push(Finding::new(
            fence.line,
            FindingKind::Fence,
            "code block is empty",
        ));
        return;
    }

    let result = match fence.lang.as_str() {
        "json" => serde_json::from_str::<serde_json::Value>(&content)
            .map(|_| ())
            .map_err(|e| format!("invalid json: {e}")),
        "toml" => toml::from_str::<toml::Table>(&content)
            .map(|_| ())
            .map_err(|e| format!("invalid toml: {}", e.message())),
        _ => Ok(()),
    };
    if let Err(message) = result {
        findings.push(Finding::new(fence.line, FindingKind::Fence, message));
    }
}

fn contains_tbd(line: &str) -> bool {
    line.match_indices("TBD").any(|(pos, _)| {
        let before = line[..pos].chars().next_back();
        let after = line[pos + 3..].chars().next();
        let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
        !is_word(before) && !is_word(after)
    })
}

fn extract_urls(line: &str) -> Vec<String> {
    let mut urls = Vec::new();
    let mut rest = line;
    loop {
        let start = match (rest.find("http://"), rest.find("https://")) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => break,
        };
        let candidate = &rest[start..];
        let end = candidate
            .find(|c: char| c.is_whitespace() || matches!(c, ')' | '>' | ']' | '"' | '\'' | '`'))
            .unwrap_or(candidate.len());
        let url = candidate[..end].trim_end_matches(['.', ',', ';', ':']);
        if !url.is_empty() {
            urls.push(url.to_string());
        }
        rest = &candidate[end..];
    }
    urls
}

fn empty_link_targets(line: &str) -> Vec<String> {
    let mut targets = Vec::new();
    let mut rest = line;
    while let Some(pos) = rest.find("]()") {
        let text = match rest[..pos].rfind('[') {
            Some(open) => &rest[open + 1..pos],
            None => "",
        };
        targets.push(text.to_string());
        rest = &rest[pos + 3..];
    }
    targets
}

fn split_row(row: &str) -> Vec<String> {
    let row = row.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = row.strip_suffix('|').unwrap_or(row);

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut escaped = false;
    for c in row.chars() {
        match c {
            '\\' if !escaped => escaped = true,
            '|' if !escaped => {
                cells.push(cell.trim().to_string());
                cell.clear();
            }
            _ => {
                if escaped && c != '|' {
                    cell.push('\\');
                }
                cell.push(c);
                escaped = false;
            }
        }
    }
    cells.push(cell.trim().to_string());
    cells
}

fn is_delimiter_row(cells: &[String]) -> bool {
    cells.iter().all(|cell| {
        let inner = cell.trim_start_matches(':').trim_end_matches(':');
        !inner.is_empty() && inner.chars().all(|c| c == '-')
    })
}

fn is_permission_marker(cell: &str) -> bool {
    let cell = cell.trim().to_lowercase();
    cell.is_empty()
        || ALLOW_MARKERS.contains(&cell.as_str())
        || DENY_MARKERS.contains(&cell.as_str())
}

/// Checks one table, returns whether it is a permission table.
fn check_table(rows: &[(usize, &str)], findings: &mut Vec<Finding>) -> bool {
    let (header_line, header) = rows[0];
    let header = split_row(header);

    let delimiter = rows.get(1).map(|(_, row)| split_row(row));
    match delimiter {
        Some(ref cells) if is_delimiter_row(cells) => {
            if cells.len() != header.len() {
                findings.push(Finding::new(
                    rows[1].0,
                    FindingKind::Table,
                    format!(
                        "delimiter row has {} columns, header has {}",
                        cells.len(),
                        header.len()
                    ),
                ));
            }
        }
        _ => {
            findings.push(Finding::new(
                header_line,
                FindingKind::Table,
                "table has no delimiter row below its header",
            ));
            return false;
        }
    }

    let is_roles = header
        .first()
        .map(|h| matches!(h.to_lowercase().as_str(), "role" | "roles"))
        .unwrap_or(false);
    let mut roles: HashSet<String> = HashSet::new();

    for (lineno, row) in rows.iter().skip(2) {
        let cells = split_row(row);
        if cells.len() != header.len() {
            findings.push(Finding::new(
                *lineno,
                FindingKind::Table,
                format!("row has {} columns, header has {}", cells.len(), header.len()),
            ));
            continue;
        }
        if !is_roles {
            continue;
        }

        let role = cells[0].to_lowercase();
        if role.is_empty() {
            findings.push(Finding::new(*lineno, FindingKind::Table, "role name is empty"));
        } else if !roles.insert(role) {
            findings.push(Finding::new(
                *lineno,
                FindingKind::Table,
                format!("role '{}' is listed more than once", cells[0]),
            ));
        }

        for (col, cell) in cells.iter().enumerate().skip(1) {
            if !is_permission_marker(cell) {
                findings.push(Finding::new(
                    *lineno,
                    FindingKind::Table,
                    format!(
                        "permission '{cell}' for '{}' in column '{}' is neither allow nor deny",
                        cells[0], header[col]
                    ),
                ));
            }
        }
    }

    is_roles
}

#[cfg(test)]
mod tests {
    use actix_web::{web, App, HttpResponse, HttpServer};

    use super::*;

    const ARTICLE: &str = r#"# Adding authorization

Permissions are managed in [Permit](https://www.permit.io/). See also
https://docs.permit.io/overview/connecting-your-app.

| Role  | get | post | put | delete |
|-------|-----|------|-----|--------|
| admin | ✓   | ✓    | ✓   | ✓      |
| user  | ✓   | ✓    | ✗   | -      |

```json
{"user": {"key": "admin@permit-todo.app"}, "action": "delete"}
```

```toml
[authz]
mode = "pdp"
```

```bash
http DELETE :8000/api/tasks/1 "Authorization: Bearer admin@permit-todo.app"
```
"#;

    fn kinds(report: &Report) -> Vec<(usize, FindingKind)> {
        report.findings.iter().map(|f| (f.line, f.kind)).collect()
    }

    #[test]
    fn test_clean_article() {
        let opts = LintOptions {
            check_links: false,
            require_roles_table: true,
        };
        let report = lint_text(ARTICLE, &opts);
        assert!(report.findings.is_empty(), "{:?}", report.findings);

        let urls: Vec<&str> = report.links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.permit.io/",
                "https://docs.permit.io/overview/connecting-your-app"
            ]
        );
        assert_eq!(report.links[1].line, 4);
    }

    #[test]
    fn test_tbd() {
        let text = "Intro\nThe policy is TBD.\nTBDS and OUTBD are words\n(TBD)\n```\nTBD in code\n```\n";
        let report = lint_text(text, &LintOptions::default());
        assert_eq!(
            kinds(&report),
            vec![(2, FindingKind::Tbd), (4, FindingKind::Tbd)]
        );
    }

    #[test]
    fn test_fence() {
        let text = "```json\n{\"allow\": true,}\n```\n\n```toml\nmode = \n```\n\n```python\n```\n\n~~~json\n[1, 2]\n~~~\n\n````\n```\nnested\n````\n\n```yaml\nkey: value\n";
        let report = lint_text(text, &LintOptions::default());
        assert_eq!(
            kinds(&report),
            vec![
                (1, FindingKind::Fence),
                (5, FindingKind::Fence),
                (9, FindingKind::Fence),
                (21, FindingKind::Fence),
            ]
        );
        assert!(report.findings[3].message.contains("never closed"));
    }

    #[test]
    fn test_links() {
        let text = "[docs](https://docs.permit.io) and [broken]() and http://exa mple.com\n\
                    <https://example.com/a>, https://example.com/b.\n";
        let report = lint_text(text, &LintOptions::default());
        assert_eq!(kinds(&report), vec![(1, FindingKind::Link)]);
        assert!(report.findings[0].message.contains("broken"));

        let urls: Vec<&str> = report.links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://docs.permit.io",
                "http://exa",
                "https://example.com/a",
                "https://example.com/b"
            ]
        );
    }

    #[test]
    fn test_tables() {
        let text = "| Role | get | delete |\n\
                    |------|-----|--------|\n\
                    | admin | yes | ALLOW |\n\
                    | user | ✓ | own tasks |\n\
                    | admin | n | |\n\
                    | guest | no |\n\
                    \n\
                    | Name | Value |\n\
                    | a | b |\n\
                    \n\
                    | Field | Notes |\n\
                    |:------|------:|\n\
                    | id | anything \\| goes |\n";
        let opts = LintOptions {
            check_links: false,
            require_roles_table: true,
        };
        let report = lint_text(text, &opts);
        assert_eq!(
            kinds(&report),
            vec![
                (4, FindingKind::Table),
                (5, FindingKind::Table),
                (6, FindingKind::Table),
                (8, FindingKind::Table),
            ]
        );
        assert!(report.findings[0].message.contains("own tasks"));
        assert!(report.findings[1].message.contains("more than once"));
        assert!(report.findings[3].message.contains("delimiter"));

        let report = lint_text("no tables here\n", &opts);
        assert_eq!(kinds(&report), vec![(1, FindingKind::Table)]);
    }

    #[test]
    fn test_table_cells() {
        let text = "| Role | get |\n\
                    |------|-----|\n\
                    | admin | TBD |\n\
                    \n\
                    | Name | Link |\n\
                    |---|---|\n\
                    | docs TBD | https://docs.permit.io/x |\n";
        let report = lint_text(text, &LintOptions::default());
        assert_eq!(
            kinds(&report),
            vec![
                (3, FindingKind::Tbd),
                (3, FindingKind::Table),
                (7, FindingKind::Tbd),
            ]
        );
        assert_eq!(
            report.links,
            vec![Link {
                line: 7,
                url: "https://docs.permit.io/x".to_string(),
            }]
        );
    }

    #[actix_web::test]
    async fn test_check_links() {
        let srv = HttpServer::new(|| {
            App::new()
                .route("/ok", web::get().to(|| async { HttpResponse::Ok().finish() }))
                .route("/ok", web::head().to(|| async { HttpResponse::Ok().finish() }))
                .route("/get-only", web::get().to(|| async { HttpResponse::Ok().finish() }))
                .route(
                    "/get-only",
                    web::head().to(|| async { HttpResponse::MethodNotAllowed().finish() }),
                )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = srv.addrs()[0];
        let srv = srv.run();
        let handle = srv.handle();
        actix_web::rt::spawn(srv);

        let text = format!(
            "[a](http://{addr}/ok) [b](http://{addr}/get-only)\nhttp://{addr}/missing http://{addr}/ok\n"
        );
        let report = lint_text(&text, &LintOptions::default());
        assert_eq!(report.links.len(), 4);

        let findings = check_links(&report.links, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 2);
        assert!(findings[0].message.contains("404"));

        handle.stop(false).await;
    }
}
