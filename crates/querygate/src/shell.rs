// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `querygate shell` command implementation.
//!
//! Interactive REPL with colored output and readline history. One session
//! per invocation; an expired session is replaced transparently.

use std::time::Instant;

use colored::Colorize;
use querygate_agent::{spawn_sweeper, Gatekeeper};
use querygate_config::QuerygateConfig;
use querygate_core::{ConversationEntry, QuerygateError, SessionId};
use querygate_storage::EXAMPLE_QUESTIONS;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::pipeline::build_gatekeeper;

/// What one line of input asks the shell to do.
#[derive(Debug, PartialEq, Eq)]
enum ShellCommand<'a> {
    Quit,
    Clear,
    History,
    Schema,
    Help,
    Ask(&'a str),
    Empty,
}

fn parse_line(line: &str) -> ShellCommand<'_> {
    let trimmed = line.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "" => ShellCommand::Empty,
        "quit" | "exit" | "bye" | "/quit" | "/exit" => ShellCommand::Quit,
        "/clear" => ShellCommand::Clear,
        "/history" => ShellCommand::History,
        "/schema" => ShellCommand::Schema,
        "/help" => ShellCommand::Help,
        _ => ShellCommand::Ask(trimmed),
    }
}

/// Runs the `querygate shell` interactive REPL.
pub async fn run_shell(config: QuerygateConfig) -> Result<(), QuerygateError> {
    let gatekeeper = build_gatekeeper(&config).await?;

    let cancel = CancellationToken::new();
    let sweeper = spawn_sweeper(
        gatekeeper.registry().clone(),
        config.sweep_interval(),
        cancel.clone(),
    );

    let mut rl = DefaultEditor::new()
        .map_err(|e| QuerygateError::Internal(format!("failed to initialize readline: {e}")))?;

    print_welcome(&gatekeeper, &config);

    let mut session_id = SessionId::generate();
    let prompt = format!("{} ", "You:".cyan().bold());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let command = parse_line(&line);
                if command != ShellCommand::Empty {
                    let _ = rl.add_history_entry(line.trim());
                }
                match command {
                    ShellCommand::Empty => continue,
                    ShellCommand::Quit => break,
                    ShellCommand::Help => print_help(),
                    ShellCommand::Schema => println!("{}\n", gatekeeper.schema().describe()),
                    ShellCommand::Clear => {
                        if let Ok(mut session) = gatekeeper.registry().get_or_create(&session_id).await
                        {
                            session.clear();
                        }
                        println!("{}\n", "Conversation history cleared.".dimmed());
                    }
                    ShellCommand::History => print_history(&gatekeeper, &session_id).await,
                    ShellCommand::Ask(question) => {
                        ask(&gatekeeper, &mut session_id, question).await;
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "Goodbye!".green());
    cancel.cancel();
    let _ = sweeper.await;
    Ok(())
}

async fn ask(gatekeeper: &Gatekeeper, session_id: &mut SessionId, question: &str) {
    let started = Instant::now();
    match gatekeeper.handle(session_id, question).await {
        Ok(entry) => {
            print_entry(&entry);
            println!(
                "{}\n",
                format!("Executed in {:.2} seconds", started.elapsed().as_secs_f64()).dimmed()
            );
        }
        Err(QuerygateError::SessionExpired { .. }) => {
            *session_id = SessionId::generate();
            debug!(session_id = %session_id, "replaced expired shell session");
            println!(
                "{}\n",
                "Your session expired after inactivity; a new one has started. Please ask again."
                    .yellow()
            );
        }
        Err(e) => eprintln!("{}: {e}\n", "error".red()),
    }
}

fn print_entry(entry: &ConversationEntry) {
    if let Some(sql) = &entry.generated_sql {
        println!("{} {}", "SQL:".dimmed(), sql.dimmed());
    }
    if entry.was_policy_denied {
        println!("{} {}", "Assistant:".yellow().bold(), entry.answer_text.yellow());
        return;
    }
    if entry.has_error() {
        println!("{} {}", "Assistant:".red().bold(), entry.answer_text.red());
        return;
    }
    println!("{} {}", "Assistant:".green().bold(), entry.answer_text);
    if let Some(result) = &entry.result {
        if !result.columns.is_empty() && !result.is_empty() {
            println!("{}", result.to_text_table());
        }
        if result.row_count_truncated {
            println!(
                "{}",
                format!(
                    "Only the first {} rows are shown; more were available.",
                    result.row_count_returned
                )
                .yellow()
            );
        }
    }
}

async fn print_history(gatekeeper: &Gatekeeper, session_id: &SessionId) {
    let Ok(session) = gatekeeper.registry().get_or_create(session_id).await else {
        println!("{}\n", "No history: the session has expired.".dimmed());
        return;
    };
    if session.is_empty() {
        println!("{}\n", "No questions asked yet.".dimmed());
        return;
    }
    for (i, entry) in session.history().enumerate() {
        let marker = if entry.was_policy_denied {
            "denied".yellow()
        } else if entry.has_error() {
            "error".red()
        } else {
            "ok".green()
        };
        println!("{:2}. [{marker}] {}", i + 1, entry.question);
        if let Some(sql) = &entry.generated_sql {
            println!("    {}", sql.dimmed());
        }
    }
    println!();
}

fn print_welcome(gatekeeper: &Gatekeeper, config: &QuerygateConfig) {
    println!("{}", "querygate shell".bold().green());
    println!(
        "Database: {}  Agent: {}  Destructive queries: {}",
        config.database.path,
        gatekeeper.agent_name(),
        if config.database.allow_destructive_queries {
            "allowed".red()
        } else {
            "blocked".green()
        }
    );
    println!("\nExample questions you can ask:");
    for question in EXAMPLE_QUESTIONS.iter().take(4) {
        println!("- {question}");
    }
    println!(
        "\nType {} for commands, {} to leave.\n",
        "/help".yellow(),
        "quit".yellow()
    );
}

fn print_help() {
    println!("  /history  show this session's questions");
    println!("  /clear    forget this session's history");
    println!("  /schema   show the database schema");
    println!("  quit      leave (also exit, bye)\n");
}
