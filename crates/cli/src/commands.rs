//! One-shot subcommands. Each builds on a fresh coordinator and exits.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing::info;

use dbquery_core::ExportFormat;
use dbquery_session::SessionCoordinator;

use crate::cli::Command;
use crate::terminal::Terminal;

pub async fn run(command: Command, coord: &SessionCoordinator, terminal: &Terminal) -> Result<()> {
    match command {
        Command::List => {
            coord.list_connections().await?;
            terminal.print_connections(&coord.state().catalog, None)?;
        }
        Command::Add { name, url } => {
            coord
                .register_connection(&name, &url)
                .await
                .with_context(|| format!("failed to register '{}'", name))?;
            terminal.print_success(&format!("Registered '{}'.", name))?;
            print_active_schema(coord, terminal)?;
        }
        Command::Show { name } => {
            coord.select_connection(&name).await?;
            if let Some(detail) = coord.state().active {
                terminal.print_schema(&detail)?;
                for table in &detail.tables {
                    terminal.print_info("")?;
                    terminal.print_table(table)?;
                }
            }
        }
        Command::Remove { name } => {
            coord.remove_connection(&name).await?;
            terminal.print_success(&format!("Removed '{}'.", name))?;
        }
        Command::Refresh { name } => {
            coord.select_connection(&name).await?;
            coord.refresh_connection_metadata(&name).await?;
            print_active_schema(coord, terminal)?;
        }
        Command::Query { db, sql } => {
            coord.select_connection(&db).await?;
            let result = coord.run_query(&sql).await?;
            terminal.print_query_result(&result)?;
        }
        Command::Ask { db, prompt, model, run } => {
            coord.select_connection(&db).await?;
            if let Some(model) = model {
                coord.select_llm_model(&model);
            }
            let translation = coord.translate(&prompt).await?;
            terminal.print_translation(&translation)?;
            if run {
                let result = coord.run_query(&translation.sql).await?;
                terminal.print_query_result(&result)?;
            }
        }
        Command::Export { db, sql, format, output } => {
            coord.select_connection(&db).await?;
            let path = output.map(PathBuf::from);
            export(coord, terminal, &sql, format, path).await?;
        }
        Command::Models => {
            coord.load_llm_models().await;
            let state = coord.state();
            terminal.print_models(&state.models, &state.selected_model_id)?;
        }
        Command::Annotate { db, table, field, name } => {
            coord.select_connection(&db).await?;
            coord.save_field_annotation(&table, &field, &name).await?;
            if let Some(t) = coord.state().active.as_ref().and_then(|d| d.table(&table)) {
                terminal.print_table(t)?;
            }
        }
        Command::Shell => bail!("the shell cannot run as a one-shot command"),
    }
    Ok(())
}

/// Export through the active connection and write the payload to `path`
/// (default: `query_result.<format>` in the working directory).
pub async fn export(
    coord: &SessionCoordinator,
    terminal: &Terminal,
    sql: &str,
    format: ExportFormat,
    path: Option<PathBuf>,
) -> Result<()> {
    let payload = coord.export_query(sql, format).await?;
    let path = path.unwrap_or_else(|| PathBuf::from(format.file_name()));
    std::fs::write(&path, &payload)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = payload.len(), "Export written");
    terminal.print_success(&format!("Wrote {} bytes to {}", payload.len(), path.display()))
}

fn print_active_schema(coord: &SessionCoordinator, terminal: &Terminal) -> Result<()> {
    match coord.state().active {
        Some(detail) => terminal.print_schema(&detail),
        None => Ok(()),
    }
}
