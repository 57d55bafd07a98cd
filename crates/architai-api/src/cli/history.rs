//! Past sessions (`architai history`, `architai show <id>`).

use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use architai_core::history::{HistoryReconstructor, SessionSummary};
use architai_types::session::short_id;

use super::render::{DesignRenderer, conversation_markdown};
use super::{spinner, truncate};
use crate::state::AppState;

/// List every stored session as a table (or JSON).
pub async fn list_history(state: &AppState, json: bool) -> Result<()> {
    let mut history = HistoryReconstructor::new(Arc::clone(&state.gateway));

    let progress = spinner("Fetching sessions...");
    let listing = history.list_sessions().await;
    progress.finish_and_clear();
    let summaries: Vec<SessionSummary> = listing
        .context("Failed to fetch session history")?
        .collect();

    if json {
        let rows: Vec<_> = summaries
            .iter()
            .map(|s| {
                serde_json::json!({
                    "session_id": s.session_id,
                    "title": s.title,
                    "created_at": s.created_at,
                    "message_count": s.message_count,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!();
        println!(
            "  {} No sessions yet. Start one with: {}",
            style("i").blue().bold(),
            style("architai design").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Title").fg(Color::White),
        Cell::new("Created").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    for summary in &summaries {
        let created = summary
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(truncate(&summary.title, 48)).fg(Color::Cyan),
            Cell::new(created).fg(Color::White),
            Cell::new(summary.message_count.to_string()).fg(Color::White),
            Cell::new(short_id(&summary.session_id)).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} session{}",
        style(summaries.len()).bold(),
        if summaries.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Print the reconstructed conversation of one session.
pub async fn show_session(state: &AppState, id: &str, json: bool) -> Result<()> {
    let mut history = HistoryReconstructor::new(Arc::clone(&state.gateway));

    let progress = spinner("Fetching sessions...");
    let listing = history.list_sessions().await;
    progress.finish_and_clear();
    let summaries: Vec<SessionSummary> = listing
        .context("Failed to fetch session history")?
        .collect();

    let session_id = history
        .resolve_id(id.trim())
        .map(str::to_owned)
        .with_context(|| format!("Session '{id}' not found (or the prefix is ambiguous)"))?;
    let summary = summaries
        .into_iter()
        .find(|s| s.session_id == session_id)
        .with_context(|| format!("Session '{id}' not found"))?;

    let log = history.select_session(&session_id);

    if json {
        let export = serde_json::json!({
            "session_id": session_id,
            "title": summary.title,
            "created_at": summary.created_at,
            "messages": log,
        });
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    let markdown = conversation_markdown(&summary.title, summary.created_at, log);
    println!("{}", DesignRenderer::new().render(&markdown));

    Ok(())
}
