use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use serde_json::Value;
use std::io::{self, Write};

use dbquery_core::{
    ConnectionDetail, ConnectionSummary, LlmModel, NaturalQueryResult, QueryResult, TableMetadata,
};
use dbquery_session::SessionState;

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const PROMPT: Color = Color::Green;
    const SQL: Color = Color::Cyan;
    const SUCCESS: Color = Color::DarkGreen;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;
}

/// Cells wider than this are cut with an ellipsis.
const MAX_CELL_WIDTH: usize = 40;

/// Terminal I/O for one-shot commands and the interactive shell.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    fn colored(&self, color: Color, text: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, SetForegroundColor(color), Print(text), ResetColor)?;
        stdout.flush()?;
        Ok(())
    }

    fn plain(&self, text: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, Print(text))?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_banner(&self, api_url: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("dbquery"),
            ResetColor,
            Print(" - interactive shell\n"),
            SetForegroundColor(Colors::DIM),
            Print(format!("Server: {}\n", api_url)),
            Print("Type 'help' for commands, 'exit' to quit.\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Read one line after a prompt naming the active connection.
    /// Returns None at end of input.
    pub fn read_input(&self, active: Option<&str>) -> Result<Option<String>> {
        let prompt = match active {
            Some(name) => format!("\ndbquery[{}]> ", name),
            None => "\ndbquery> ".to_string(),
        };
        self.colored(Colors::PROMPT, &prompt)?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim().to_string()))
    }

    pub fn print_connections(&self, catalog: &[ConnectionSummary], active: Option<&str>) -> Result<()> {
        if catalog.is_empty() {
            return self.print_info("No connections registered.");
        }
        let rows: Vec<Vec<String>> = catalog
            .iter()
            .map(|c| {
                let marker = if Some(c.name.as_str()) == active { "*" } else { "" };
                vec![
                    marker.to_string(),
                    c.name.clone(),
                    c.kind.to_string(),
                    c.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                ]
            })
            .collect();
        self.print_grid(&["", "NAME", "TYPE", "UPDATED"], &rows)
    }

    /// Table list for a connection.
    pub fn print_schema(&self, detail: &ConnectionDetail) -> Result<()> {
        self.colored(
            Colors::HEADER,
            &format!("{} ({}, {} tables)\n", detail.name(), detail.summary.kind, detail.tables.len()),
        )?;
        let rows: Vec<Vec<String>> = detail
            .tables
            .iter()
            .map(|t| {
                vec![
                    t.table_name.clone(),
                    t.table_type.to_string(),
                    t.chinese_name.clone().unwrap_or_default(),
                    t.fields.len().to_string(),
                ]
            })
            .collect();
        self.print_grid(&["TABLE", "TYPE", "LABEL", "FIELDS"], &rows)
    }

    /// Field list for one table.
    pub fn print_table(&self, table: &TableMetadata) -> Result<()> {
        self.colored(Colors::HEADER, &format!("{} [{}]\n", table.label(), table.table_type))?;
        let rows: Vec<Vec<String>> = table
            .fields
            .iter()
            .map(|f| {
                let data_type = match f.max_length {
                    Some(len) => format!("{}({})", f.data_type, len),
                    None => f.data_type.clone(),
                };
                vec![
                    f.field_name.clone(),
                    data_type,
                    if f.is_nullable { "YES" } else { "NO" }.to_string(),
                    f.column_default.clone().unwrap_or_default(),
                    f.chinese_name.clone().unwrap_or_default(),
                ]
            })
            .collect();
        self.print_grid(&["FIELD", "TYPE", "NULL", "DEFAULT", "LABEL"], &rows)
    }

    pub fn print_query_result(&self, result: &QueryResult) -> Result<()> {
        let headers: Vec<&str> = result.columns.iter().map(|c| c.name.as_str()).collect();
        let rows: Vec<Vec<String>> = result
            .rows
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        self.print_grid(&headers, &rows)?;

        let mut footer = format!("{} rows in {:.1} ms", result.row_count, result.execution_time_ms);
        if result.is_truncated() {
            footer.push_str(&format!(" (showing {})", result.rows.len()));
        }
        self.print_info(&footer)
    }

    pub fn print_translation(&self, result: &NaturalQueryResult) -> Result<()> {
        self.colored(Colors::SQL, &format!("{}\n", result.sql))?;
        if let Some(explanation) = &result.explanation {
            self.print_info(explanation)?;
        }
        self.print_info(&format!("model: {}", result.model_id))
    }

    pub fn print_models(&self, models: &[LlmModel], selected: &str) -> Result<()> {
        if models.is_empty() {
            return self.print_info(&format!("No models reported. Using {}.", selected));
        }
        let rows: Vec<Vec<String>> = models
            .iter()
            .map(|m| {
                let marker = if m.id == selected { "*" } else { "" };
                vec![marker.to_string(), m.id.clone(), m.name.clone(), m.provider.clone()]
            })
            .collect();
        self.print_grid(&["", "ID", "NAME", "PROVIDER"], &rows)
    }

    pub fn print_status(&self, state: &SessionState) -> Result<()> {
        let lines = [
            format!("connections: {}", state.catalog.len()),
            format!("active:      {}", state.active_name().unwrap_or("-")),
            format!("model:       {}", state.selected_model_id),
            format!(
                "last result: {}",
                state
                    .last_result
                    .as_ref()
                    .map(|r| format!("{} rows", r.row_count))
                    .unwrap_or_else(|| "-".to_string())
            ),
            format!("last error:  {}", state.last_error.as_deref().unwrap_or("-")),
        ];
        self.plain(&format!("{}\n", lines.join("\n")))
    }

    pub fn print_help(&self) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("Commands:\n"),
            ResetColor,
            Print(HELP_TEXT),
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_error(&self, msg: &str) -> Result<()> {
        self.colored(Colors::ERROR, &format!("Error: {}\n", msg))
    }

    pub fn print_success(&self, msg: &str) -> Result<()> {
        self.colored(Colors::SUCCESS, &format!("{}\n", msg))
    }

    pub fn print_info(&self, msg: &str) -> Result<()> {
        self.colored(Colors::DIM, &format!("{}\n", msg))
    }

    fn print_grid(&self, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
        let (head, body) = render_grid(headers, rows);
        self.colored(Colors::HEADER, &head)?;
        self.plain(&body)
    }
}

const HELP_TEXT: &str = "  list                            list connections
  add <name> <url>                register a connection and use it
  use <name>                      select a connection
  remove <name>                   delete a connection
  refresh [name]                  re-read a schema (default: active)
  tables                          tables of the active connection
  describe <table>                fields of a table
  sql <statement>                 run SQL on the active connection
  ask <question>                  translate a question into SQL
  models                          list LLM models
  model <id>                      choose the model for 'ask'
  annotate <table> <field> <name> set a field's display name
  export <csv|json> <statement>   save a query result to a file
  clear                           forget the last result
  status                          show session state
  help                            this text
  exit                            leave the shell
";

/// Text shown for a JSON cell.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(text: &str) -> String {
    let text = text.replace('\n', " ");
    if text.chars().count() > MAX_CELL_WIDTH {
        let cut: String = text.chars().take(MAX_CELL_WIDTH - 3).collect();
        format!("{}...", cut)
    } else {
        text
    }
}

fn pad_line(values: &[&str], widths: &[usize]) -> String {
    let padded: Vec<String> = values
        .iter()
        .zip(widths)
        .map(|(v, w)| format!("{}{}", v, " ".repeat(w - v.chars().count())))
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

/// Lay out a header line plus separator, and the body rows, as aligned columns.
pub fn render_grid(headers: &[&str], rows: &[Vec<String>]) -> (String, String) {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|c| truncate(c)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let mut head = pad_line(headers, &widths);
    let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    head.push_str(&format!("{}\n", "-".repeat(total)));

    let body = cells
        .iter()
        .map(|row| {
            let values: Vec<&str> = row.iter().map(String::as_str).collect();
            pad_line(&values, &widths)
        })
        .collect();
    (head, body)
}
