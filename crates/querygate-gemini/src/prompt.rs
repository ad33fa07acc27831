// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt construction and reply parsing.

use querygate_core::{AgentProposal, AgentRequest, ConversationEntry, QueryResult};

use crate::types::Content;

/// Rows of a result shown to the model when phrasing an answer.
const ANSWER_PREVIEW_ROWS: usize = 50;

/// System instruction for SQL generation.
pub fn sql_instruction(schema_description: &str) -> String {
    format!(
        "You translate questions about a SQLite database into SQL.\n\
         \n\
         Database schema:\n\
         {schema_description}\n\
         \n\
         Rules:\n\
         - Reply with exactly one SQLite statement inside a ```sql fenced block, \
         followed by one short sentence describing what it returns.\n\
         - Never put more than one statement in the block.\n\
         - Prefer SELECT. Only write INSERT, UPDATE, DELETE or DDL when the user \
         explicitly asks to change data.\n\
         - Use only tables and columns from the schema above.\n\
         - If the question does not need the database, answer it directly \
         without a SQL block."
    )
}

/// Conversation turns for one question: prior exchanges, then the question.
pub fn sql_contents(request: &AgentRequest<'_>) -> Vec<Content> {
    let mut contents = Vec::with_capacity(request.recent_history.len() * 2 + 1);
    for entry in request.recent_history {
        contents.push(Content::user(entry.question.clone()));
        contents.push(Content::model(history_reply(entry)));
    }
    contents.push(Content::user(request.question));
    contents
}

fn history_reply(entry: &ConversationEntry) -> String {
    match &entry.generated_sql {
        Some(sql) => format!("```sql\n{sql}\n```\n{}", entry.answer_text),
        None => entry.answer_text.clone(),
    }
}

/// System instruction for phrasing an answer from a result.
pub const ANSWER_INSTRUCTION: &str = "You explain SQL query results to a non-technical user. \
     Answer the question in one to three sentences using only the rows given. \
     Do not show SQL. If the rows were truncated, say the answer covers only the rows shown.";

/// The user turn asking for a phrased answer.
pub fn answer_prompt(question: &str, sql: &str, result: &QueryResult) -> String {
    let mut preview = result.clone();
    if preview.rows.len() > ANSWER_PREVIEW_ROWS {
        preview.rows.truncate(ANSWER_PREVIEW_ROWS);
        preview.row_count_returned = ANSWER_PREVIEW_ROWS;
        preview.row_count_truncated = true;
    }
    format!(
        "Question: {question}\n\nSQL:\n{sql}\n\nResult:\n{}",
        preview.to_text_table()
    )
}

/// Splits a model reply into SQL and the accompanying text.
///
/// SQL comes from the first ```sql fenced block (a bare ``` fence is accepted
/// too) or, failing that, from a line starting with `SQL:`. A reply without
/// either is a direct answer.
pub fn parse_reply(reply: &str) -> AgentProposal {
    if let Some((sql, rest)) = fenced_sql(reply) {
        return AgentProposal::query(sql, rest);
    }
    if let Some((sql, rest)) = labelled_sql(reply) {
        return AgentProposal::query(sql, rest);
    }
    AgentProposal::answer_only(reply.trim())
}

fn fenced_sql(reply: &str) -> Option<(String, String)> {
    let open = reply.find("```")?;
    let after_ticks = &reply[open + 3..];
    let line_end = after_ticks.find('\n')?;
    let tag = after_ticks[..line_end].trim();
    if !tag.is_empty() && !tag.eq_ignore_ascii_case("sql") && !tag.eq_ignore_ascii_case("sqlite") {
        return None;
    }
    let body_start = open + 3 + line_end + 1;
    let body_len = reply[body_start..].find("```")?;
    let sql = reply[body_start..body_start + body_len].trim();
    if sql.is_empty() {
        return None;
    }
    let rest = format!(
        "{} {}",
        reply[..open].trim(),
        reply[body_start + body_len + 3..].trim()
    );
    Some((sql.to_string(), rest.trim().to_string()))
}

fn labelled_sql(reply: &str) -> Option<(String, String)> {
    let mut sql = None;
    let mut rest = Vec::new();
    for line in reply.lines() {
        let trimmed = line.trim_start();
        match trimmed.get(..4) {
            Some(label) if sql.is_none() && label.eq_ignore_ascii_case("sql:") => {
                let statement = trimmed[4..].trim();
                if !statement.is_empty() {
                    sql = Some(statement.to_string());
                }
            }
            _ => rest.push(line.trim()),
        }
    }
    sql.map(|sql| (sql, rest.join(" ").trim().to_string()))
}
