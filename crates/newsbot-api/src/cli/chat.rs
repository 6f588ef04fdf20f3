//! Chat CLI commands: ask, history, sessions, clear.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use serde_json::json;

use newsbot_types::chat::{SessionId, Turn};

use crate::state::AppState;

const PREVIEW_CHARS: usize = 60;

/// Send one message through the pipeline and print the reply.
///
/// # Examples
///
/// ```bash
/// newsbot ask "What did the central bank decide?"
/// newsbot ask --session 6f1c2b1e-8d4a-4c59-9a57-2f0f8c7d9b10 "And why?"
/// ```
pub async fn ask(
    state: &AppState,
    session: Option<SessionId>,
    message: &str,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let session_id = session.unwrap_or_default();
    let reply = state.orchestrator.send_message(&session_id, message).await?;

    if json {
        let out = json!({ "sessionId": session_id, "reply": reply });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {}", reply);
    println!();
    if !quiet {
        println!(
            "  {} session {}",
            style("i").blue().bold(),
            style(&session_id).dim()
        );
        println!();
    }
    Ok(())
}

/// Print every turn of a session, oldest first.
pub async fn show_history(state: &AppState, session_id: &SessionId, json: bool) -> Result<()> {
    let turns = state.orchestrator.history(session_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&turns)?);
        return Ok(());
    }

    if turns.is_empty() {
        println!();
        println!(
            "  {} No history for session {} (unknown or expired).",
            style("i").blue().bold(),
            style(session_id).cyan()
        );
        println!();
        return Ok(());
    }

    println!();
    for turn in &turns {
        println!(
            "  {} {}",
            style(turn.timestamp.format("%Y-%m-%d %H:%M:%S")).dim(),
            style("you").cyan().bold()
        );
        println!("  {}", turn.user);
        println!("  {}", style("newsbot").green().bold());
        println!("  {}", turn.bot);
        println!();
    }
    Ok(())
}

/// List active sessions with their size and most recent question.
pub async fn list_sessions(state: &AppState, json: bool) -> Result<()> {
    let sessions = state.orchestrator.all_sessions().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No active sessions. Start one with: {}",
            style("i").blue().bold(),
            style("newsbot ask \"...\"").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Session").fg(Color::White),
        Cell::new("Turns").fg(Color::White),
        Cell::new("Last activity").fg(Color::White),
        Cell::new("Last question").fg(Color::White),
    ]);

    for session in &sessions {
        let last = session.history.last();
        let last_activity = last
            .map(|t| t.timestamp.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let last_question = last.map(preview).unwrap_or_default();

        table.add_row(vec![
            Cell::new(&session.session_id).fg(Color::Cyan),
            Cell::new(session.history.len()).fg(Color::White),
            Cell::new(last_activity).fg(Color::DarkGrey),
            Cell::new(last_question).fg(Color::White),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} session{}",
        style(sessions.len()).bold(),
        if sessions.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}

/// Remove a session's history. Succeeds for unknown sessions too.
pub async fn clear(state: &AppState, session_id: &SessionId, json: bool) -> Result<()> {
    state.orchestrator.clear_history(session_id).await?;

    if json {
        let out = json!({ "sessionId": session_id, "cleared": true });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Cleared session {}",
        style("✓").green().bold(),
        style(session_id).cyan()
    );
    println!();
    Ok(())
}

/// First line of the user's message, cut to [`PREVIEW_CHARS`] characters.
fn preview(turn: &Turn) -> String {
    let line = turn.user.lines().next().unwrap_or_default();
    if line.chars().count() > PREVIEW_CHARS {
        let cut: String = line.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        line.to_string()
    }
}
