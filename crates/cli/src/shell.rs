//! Interactive shell holding one coordinator for the whole session.

use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

use dbquery_core::ExportFormat;
use dbquery_session::{SessionCoordinator, SessionError};

use crate::commands;
use crate::terminal::Terminal;

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    List,
    Add { name: String, url: String },
    Use(String),
    Remove(String),
    Refresh(Option<String>),
    Tables,
    Describe(String),
    Sql(String),
    Ask(String),
    Models,
    Model(String),
    Annotate { table: String, field: String, name: String },
    Export { format: ExportFormat, sql: String },
    Clear,
    Status,
    Help,
    Exit,
}

/// Split off the first whitespace-delimited word.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

fn required(rest: &str, usage: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("usage: {}", usage))
    } else {
        Ok(rest.to_string())
    }
}

/// Parse one non-empty input line. `Err` carries a usage hint.
pub fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let (word, rest) = split_word(line);
    let command = match word.to_lowercase().as_str() {
        "list" | "ls" => ShellCommand::List,
        "add" => {
            let (name, url) = split_word(rest);
            if name.is_empty() || url.is_empty() {
                return Err("usage: add <name> <url>".into());
            }
            ShellCommand::Add { name: name.into(), url: url.into() }
        }
        "use" => ShellCommand::Use(required(rest, "use <name>")?),
        "remove" | "rm" => ShellCommand::Remove(required(rest, "remove <name>")?),
        "refresh" => ShellCommand::Refresh((!rest.is_empty()).then(|| rest.to_string())),
        "tables" => ShellCommand::Tables,
        "describe" | "desc" => ShellCommand::Describe(required(rest, "describe <table>")?),
        "sql" => ShellCommand::Sql(required(rest, "sql <statement>")?),
        "ask" => ShellCommand::Ask(required(rest, "ask <question>")?),
        "models" => ShellCommand::Models,
        "model" => ShellCommand::Model(required(rest, "model <id>")?),
        "annotate" => {
            let (table, rest) = split_word(rest);
            let (field, name) = split_word(rest);
            if table.is_empty() || field.is_empty() || name.is_empty() {
                return Err("usage: annotate <table> <field> <name>".into());
            }
            ShellCommand::Annotate { table: table.into(), field: field.into(), name: name.into() }
        }
        "export" => {
            let (format, sql) = split_word(rest);
            let format: ExportFormat = format
                .parse()
                .map_err(|_| "usage: export <csv|json> <statement>".to_string())?;
            ShellCommand::Export { format, sql: required(sql, "export <csv|json> <statement>")? }
        }
        "clear" => ShellCommand::Clear,
        "status" => ShellCommand::Status,
        "help" | "?" => ShellCommand::Help,
        "exit" | "quit" => ShellCommand::Exit,
        // bare SELECT ... is treated as SQL
        _ if word.eq_ignore_ascii_case("select") || word.eq_ignore_ascii_case("with") => {
            ShellCommand::Sql(line.trim().to_string())
        }
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };
    Ok(command)
}

/// What happened to one input line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Done,
    Failed(String),
    Exit,
}

pub struct Shell {
    coord: Arc<SessionCoordinator>,
    terminal: Terminal,
}

impl Shell {
    pub fn new(coord: Arc<SessionCoordinator>) -> Self {
        Self { coord, terminal: Terminal::new() }
    }

    pub async fn run(&self, api_url: &str) -> Result<()> {
        self.terminal.print_banner(api_url)?;
        let logger = self.spawn_state_logger();

        let models = {
            let coord = self.coord.clone();
            tokio::spawn(async move { coord.load_llm_models().await })
        };
        match self.coord.list_connections().await {
            Ok(()) => self.terminal.print_connections(&self.coord.state().catalog, None)?,
            Err(e) => self.terminal.print_error(&e.to_string())?,
        }

        loop {
            let state = self.coord.state();
            let line = match self.terminal.read_input(state.active_name())? {
                Some(line) => line,
                None => break,
            };
            if line.is_empty() {
                continue;
            }

            match self.handle_line(&line).await {
                LineOutcome::Done => {}
                LineOutcome::Failed(msg) => self.terminal.print_error(&msg)?,
                LineOutcome::Exit => break,
            }
        }

        models.abort();
        logger.abort();
        self.terminal.print_info("Goodbye.")?;
        Ok(())
    }

    /// Parse and execute one line. Every failure, local or remote, comes
    /// back as a message for the caller to print.
    pub async fn handle_line(&self, line: &str) -> LineOutcome {
        let command = match parse_line(line) {
            Ok(command) => command,
            Err(usage) => return LineOutcome::Failed(usage),
        };
        if command == ShellCommand::Exit {
            return LineOutcome::Exit;
        }
        match self.execute(command).await {
            Ok(()) => LineOutcome::Done,
            Err(e) => LineOutcome::Failed(format!("{:#}", e)),
        }
    }

    /// Trace each published state change.
    fn spawn_state_logger(&self) -> JoinHandle<()> {
        let mut rx = self.coord.subscribe();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let (busy, error) = {
                    let state = rx.borrow_and_update();
                    (state.is_busy, state.last_error.clone())
                };
                debug!(busy, error = ?error, "Session state changed");
            }
        })
    }

    async fn execute(&self, command: ShellCommand) -> Result<()> {
        let coord = &self.coord;
        let terminal = &self.terminal;
        match command {
            ShellCommand::List => {
                coord.list_connections().await?;
                let state = coord.state();
                terminal.print_connections(&state.catalog, state.active_name())?;
            }
            ShellCommand::Add { name, url } => {
                coord.register_connection(&name, &url).await?;
                terminal.print_success(&format!("Registered '{}' and selected it.", name))?;
            }
            ShellCommand::Use(name) => {
                coord.select_connection(&name).await?;
                if let Some(detail) = coord.state().active {
                    terminal.print_schema(&detail)?;
                }
            }
            ShellCommand::Remove(name) => {
                coord.remove_connection(&name).await?;
                terminal.print_success(&format!("Removed '{}'.", name))?;
            }
            ShellCommand::Refresh(name) => {
                let name = match name {
                    Some(name) => name,
                    None => self.active_name()?,
                };
                coord.refresh_connection_metadata(&name).await?;
                terminal.print_success(&format!("Refreshed '{}'.", name))?;
            }
            ShellCommand::Tables => match coord.state().active {
                Some(detail) => terminal.print_schema(&detail)?,
                None => return Err(SessionError::NoActiveConnection.into()),
            },
            ShellCommand::Describe(table) => {
                let state = coord.state();
                let detail = state.active.as_ref().ok_or(SessionError::NoActiveConnection)?;
                match detail.table(&table) {
                    Some(t) => terminal.print_table(t)?,
                    None => terminal.print_error(&format!("no table '{}' in {}", table, detail.name()))?,
                }
            }
            ShellCommand::Sql(sql) => {
                let result = coord.run_query(&sql).await?;
                terminal.print_query_result(&result)?;
            }
            ShellCommand::Ask(prompt) => {
                let translation = coord.translate(&prompt).await?;
                terminal.print_translation(&translation)?;
                terminal.print_info("Run it with: sql <statement>")?;
            }
            ShellCommand::Models => {
                coord.load_llm_models().await;
                let state = coord.state();
                terminal.print_models(&state.models, &state.selected_model_id)?;
            }
            ShellCommand::Model(id) => {
                coord.select_llm_model(&id);
                terminal.print_success(&format!("Using model {}.", id))?;
            }
            ShellCommand::Annotate { table, field, name } => {
                coord.save_field_annotation(&table, &field, &name).await?;
                terminal.print_success(&format!("{}.{} is now labelled '{}'.", table, field, name))?;
            }
            ShellCommand::Export { format, sql } => {
                commands::export(coord, terminal, &sql, format, None).await?;
            }
            ShellCommand::Clear => coord.clear_last_result(),
            ShellCommand::Status => terminal.print_status(&coord.state())?,
            ShellCommand::Help => terminal.print_help()?,
            ShellCommand::Exit => {}
        }
        Ok(())
    }

    fn active_name(&self) -> Result<String> {
        self.coord
            .state()
            .active_name()
            .map(str::to_string)
            .ok_or_else(|| SessionError::NoActiveConnection.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbquery_client::{http_gateways, Transport};
    use std::time::Duration;

    /// A shell whose server refuses every connection.
    fn offline_shell() -> Shell {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let transport =
            Transport::new(&format!("http://{}/api/v1", addr), Duration::from_secs(2)).unwrap();
        Shell::new(Arc::new(SessionCoordinator::new(http_gateways(transport))))
    }

    #[tokio::test]
    async fn test_repeated_remote_failure_reported_each_time() {
        let shell = offline_shell();

        let first = shell.handle_line("use missing").await;
        let second = shell.handle_line("use missing").await;

        let msg = match &first {
            LineOutcome::Failed(msg) => msg.clone(),
            other => panic!("expected a failure, got {:?}", other),
        };
        assert!(!msg.is_empty());
        assert_eq!(second, LineOutcome::Failed(msg.clone()));
        assert_eq!(shell.coord.state().last_error, Some(msg));
    }

    #[tokio::test]
    async fn test_local_failures_and_exit() {
        let shell = offline_shell();

        for _ in 0..2 {
            assert_eq!(
                shell.handle_line("tables").await,
                LineOutcome::Failed("no database selected".into())
            );
        }
        assert_eq!(
            shell.handle_line("use").await,
            LineOutcome::Failed("usage: use <name>".into())
        );
        assert_eq!(shell.handle_line("exit").await, LineOutcome::Exit);
        assert_eq!(shell.handle_line("model kimi-k2").await, LineOutcome::Done);
        assert_eq!(shell.coord.state().selected_model_id, "kimi-k2");
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_line("list"), Ok(ShellCommand::List));
        assert_eq!(parse_line("  STATUS "), Ok(ShellCommand::Status));
        assert_eq!(parse_line("use shop"), Ok(ShellCommand::Use("shop".into())));
        assert_eq!(parse_line("refresh"), Ok(ShellCommand::Refresh(None)));
        assert_eq!(parse_line("refresh shop"), Ok(ShellCommand::Refresh(Some("shop".into()))));
        assert_eq!(parse_line("quit"), Ok(ShellCommand::Exit));
    }

    #[test]
    fn test_parse_add_keeps_url_intact() {
        assert_eq!(
            parse_line("add shop postgres://u:p@localhost:5432/shop"),
            Ok(ShellCommand::Add {
                name: "shop".into(),
                url: "postgres://u:p@localhost:5432/shop".into(),
            })
        );
        assert!(parse_line("add shop").is_err());
    }

    #[test]
    fn test_parse_sql_and_bare_select() {
        assert_eq!(
            parse_line("sql SELECT * FROM orders WHERE id = 1"),
            Ok(ShellCommand::Sql("SELECT * FROM orders WHERE id = 1".into()))
        );
        assert_eq!(
            parse_line("select count(*) from orders"),
            Ok(ShellCommand::Sql("select count(*) from orders".into()))
        );
        assert!(parse_line("sql").is_err());
    }

    #[test]
    fn test_parse_annotate_name_with_spaces() {
        assert_eq!(
            parse_line("annotate orders total 订单 总计"),
            Ok(ShellCommand::Annotate {
                table: "orders".into(),
                field: "total".into(),
                name: "订单 总计".into(),
            })
        );
        assert!(parse_line("annotate orders total").is_err());
    }

    #[test]
    fn test_parse_export() {
        assert_eq!(
            parse_line("export json SELECT 1"),
            Ok(ShellCommand::Export { format: ExportFormat::Json, sql: "SELECT 1".into() })
        );
        assert!(parse_line("export xml SELECT 1").is_err());
        assert!(parse_line("export csv").is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_line("frobnicate now").unwrap_err();
        assert!(err.contains("frobnicate"));
    }
}
