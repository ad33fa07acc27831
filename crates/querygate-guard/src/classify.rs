// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statement-kind classification.
//!
//! Classifies a SQL submission by its leading keyword after comments and
//! whitespace are stripped, and collects the table names it references.
//! No parsing beyond that: the database remains the authority on whether the
//! statement is valid.

use querygate_core::StatementKind;

use crate::lexer::{split_statements, tokenize, Token};

/// Leading keywords and the kind they map to.
const LEADING_KEYWORDS: &[(&str, StatementKind)] = &[
    ("SELECT", StatementKind::Read),
    ("WITH", StatementKind::Read),
    ("EXPLAIN", StatementKind::Read),
    ("INSERT", StatementKind::Write),
    ("UPDATE", StatementKind::Write),
    ("DELETE", StatementKind::Write),
    ("REPLACE", StatementKind::Write),
    ("CREATE", StatementKind::SchemaChange),
    ("ALTER", StatementKind::SchemaChange),
    ("DROP", StatementKind::SchemaChange),
    ("TRUNCATE", StatementKind::SchemaChange),
];

/// Keywords after which a table name follows.
const TABLE_INTRODUCERS: &[&str] = &["FROM", "JOIN", "INTO", "UPDATE", "TABLE"];

/// Clause keywords that end a FROM list and can never be a table alias.
const CLAUSE_KEYWORDS: &[&str] = &[
    "WHERE", "GROUP", "ORDER", "LIMIT", "HAVING", "WINDOW", "UNION", "EXCEPT", "INTERSECT",
    "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "CROSS", "NATURAL", "OUTER", "ON", "USING",
    "SET", "VALUES", "SELECT", "RETURNING", "DEFAULT", "AS",
];

/// Everything the guard learns from one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Number of non-empty statements in the submission.
    pub statement_count: usize,
    /// Kind of the single statement; `Unknown` for empty or multi-statement input.
    pub kind: StatementKind,
    /// Distinct table names referenced by the statement, in order of appearance.
    /// CTE names declared in the statement are excluded.
    pub table_refs: Vec<String>,
}

/// Classify `sql` by its leading keyword.
pub fn classify(sql: &str) -> StatementKind {
    analyze(sql).kind
}

/// Classify `sql` and collect the tables it references.
pub fn analyze(sql: &str) -> Analysis {
    let tokens = tokenize(sql);
    let statements = split_statements(&tokens);

    let (kind, table_refs) = match statements.as_slice() {
        [single] => (statement_kind(single), table_refs(single)),
        _ => (StatementKind::Unknown, Vec::new()),
    };

    Analysis {
        statement_count: statements.len(),
        kind,
        table_refs,
    }
}

fn statement_kind(tokens: &[Token<'_>]) -> StatementKind {
    let Some(Token::Word(first)) = tokens.first() else {
        return StatementKind::Unknown;
    };
    let kind = LEADING_KEYWORDS
        .iter()
        .find(|(kw, _)| first.eq_ignore_ascii_case(kw))
        .map_or(StatementKind::Unknown, |(_, kind)| *kind);

    // SQLite accepts DML after a common table expression.
    if kind == StatementKind::Read && first.eq_ignore_ascii_case("WITH") && has_top_level_dml(tokens)
    {
        return StatementKind::Write;
    }
    kind
}

/// True if a data-modifying keyword appears outside any parentheses.
fn has_top_level_dml(tokens: &[Token<'_>]) -> bool {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Symbol('(') => depth += 1,
            Token::Symbol(')') => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            t if t.is_keyword("INSERT") || t.is_keyword("UPDATE") || t.is_keyword("DELETE") => {
                return true;
            }
            // `replace(...)` is also a scalar function.
            t if t.is_keyword("REPLACE") => {
                if tokens.get(i + 1).is_some_and(|n| n.is_keyword("INTO")) {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

fn table_refs(tokens: &[Token<'_>]) -> Vec<String> {
    let ctes = cte_names(tokens);
    let mut refs: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        let is_cte = ctes.iter().any(|c| c.eq_ignore_ascii_case(name));
        let seen = refs.iter().any(|r| r.eq_ignore_ascii_case(name));
        if !is_cte && !seen {
            refs.push(name.to_string());
        }
    };

    for (i, token) in tokens.iter().enumerate() {
        let Some(introducer) = TABLE_INTRODUCERS.iter().find(|kw| token.is_keyword(kw)) else {
            continue;
        };
        // `IS [NOT] DISTINCT FROM` compares values.
        if i > 0 && tokens[i - 1].is_keyword("DISTINCT") {
            continue;
        }

        let mut j = skip_modifiers(tokens, i + 1);
        let lists_tables = *introducer == "FROM";
        loop {
            let Some((name, next)) = qualified_name(tokens, j) else {
                break;
            };
            // Table-valued function such as `json_each(...)`.
            let is_function = matches!(tokens.get(next), Some(Token::Symbol('(')))
                && matches!(*introducer, "FROM" | "JOIN");
            if !is_function {
                push(name);
            }
            if !lists_tables {
                break;
            }
            // Comma-separated FROM list, each item with an optional alias.
            let mut k = next;
            if tokens.get(k).is_some_and(|t| t.is_keyword("AS")) {
                k += 1;
            }
            if tokens.get(k).is_some_and(is_alias) {
                k += 1;
            }
            if matches!(tokens.get(k), Some(Token::Symbol(','))) {
                j = k + 1;
            } else {
                break;
            }
        }
    }
    refs
}

/// Skips `IF [NOT] EXISTS` and `OR <conflict-clause>` between a keyword and its table.
fn skip_modifiers(tokens: &[Token<'_>], mut j: usize) -> usize {
    loop {
        match tokens.get(j) {
            Some(t) if t.is_keyword("IF") || t.is_keyword("NOT") || t.is_keyword("EXISTS") => {
                j += 1
            }
            Some(t) if t.is_keyword("OR") => j += 2,
            _ => return j,
        }
    }
}

/// Reads `name` or `schema.name` at `j`, returning the table name and the next index.
fn qualified_name<'a>(tokens: &[Token<'a>], j: usize) -> Option<(&'a str, usize)> {
    let first = tokens.get(j).and_then(name_of)?;
    if matches!(tokens.get(j + 1), Some(Token::Symbol('.'))) {
        if let Some(table) = tokens.get(j + 2).and_then(name_of) {
            return Some((table, j + 3));
        }
    }
    Some((first, j + 1))
}

fn name_of<'a>(token: &Token<'a>) -> Option<&'a str> {
    match *token {
        Token::Word(w) if is_clause_keyword(w) => None,
        Token::Word(w) | Token::QuotedIdent(w) => Some(w),
        _ => None,
    }
}

fn is_alias(token: &Token<'_>) -> bool {
    match token {
        Token::Word(w) => !is_clause_keyword(w),
        Token::QuotedIdent(_) => true,
        _ => false,
    }
}

fn is_clause_keyword(word: &str) -> bool {
    CLAUSE_KEYWORDS.iter().any(|kw| word.eq_ignore_ascii_case(kw))
}

/// Names declared by a leading `WITH [RECURSIVE] name [(cols)] AS [NOT] [MATERIALIZED] (...)` list.
fn cte_names<'a>(tokens: &[Token<'a>]) -> Vec<&'a str> {
    let mut names = Vec::new();
    if !tokens.first().is_some_and(|t| t.is_keyword("WITH")) {
        return names;
    }
    let mut i = 1;
    if tokens.get(i).is_some_and(|t| t.is_keyword("RECURSIVE")) {
        i += 1;
    }

    loop {
        let Some(name) = tokens.get(i).and_then(Token::ident) else {
            break;
        };
        names.push(name);
        i += 1;
        if matches!(tokens.get(i), Some(Token::Symbol('('))) {
            i = skip_parenthesized(tokens, i);
        }
        if !tokens.get(i).is_some_and(|t| t.is_keyword("AS")) {
            break;
        }
        i += 1;
        while tokens
            .get(i)
            .is_some_and(|t| t.is_keyword("NOT") || t.is_keyword("MATERIALIZED"))
        {
            i += 1;
        }
        if !matches!(tokens.get(i), Some(Token::Symbol('('))) {
            break;
        }
        i = skip_parenthesized(tokens, i);
        if matches!(tokens.get(i), Some(Token::Symbol(','))) {
            i += 1;
        } else {
            break;
        }
    }
    names
}

/// Given the index of an opening parenthesis, returns the index just past its match.
fn skip_parenthesized(tokens: &[Token<'_>], open: usize) -> usize {
    let mut depth = 0usize;
    for (offset, token) in tokens[open..].iter().enumerate() {
        match token {
            Token::Symbol('(') => depth += 1,
            Token::Symbol(')') => {
                depth -= 1;
                if depth == 0 {
                    return open + offset + 1;
                }
            }
            _ => {}
        }
    }
    tokens.len()
}
