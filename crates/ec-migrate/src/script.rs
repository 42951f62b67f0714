//! Plain SQL migrations.
//!
//! An SQL migration file holds an up section and an optional down section,
//! each introduced by a marker comment on its own line:
//!
//! ```sql
//! -- database: logs
//! -- up
//! CREATE TABLE events (id INTEGER);
//! -- down
//! DROP TABLE events;
//! ```
//!
//! Markers are case-insensitive and may carry a trailing colon. A
//! `-- database: <name>` line before the first marker routes the statements
//! to that database instead of the project default. Each section is split
//! into statements with the sqlparser tokenizer, so semicolons inside string
//! literals and comments do not end a statement.

use crate::code::{Db, MigrationCode};
use crate::error::{BoxError, MigrateError, MigrateResult};
use sqlparser::dialect::GenericDialect;
use sqlparser::tokenizer::{Location, Token, TokenWithSpan, Tokenizer};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Up,
    Down,
}

/// A parsed `.sql` migration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlScript {
    database: Option<String>,
    up: Vec<String>,
    down: Vec<String>,
}

impl SqlScript {
    /// Read and parse a script file.
    pub fn load(path: &Path) -> MigrateResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MigrateError::CodeLoad {
            migration: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse script text. `origin` names the script in error messages.
    pub fn parse(content: &str, origin: &str) -> MigrateResult<Self> {
        let invalid = |reason: String| MigrateError::InvalidScript {
            path: origin.to_string(),
            reason,
        };

        let mut section = Section::Header;
        let mut seen_up = false;
        let mut database = None;
        let mut up_sql = String::new();
        let mut down_sql = String::new();

        for line in content.lines() {
            match marker(line) {
                Some(Section::Up) => {
                    if seen_up {
                        return Err(invalid("more than one '-- up' marker".to_string()));
                    }
                    seen_up = true;
                    section = Section::Up;
                    continue;
                }
                Some(Section::Down) => {
                    if !seen_up {
                        return Err(invalid("'-- down' appears before '-- up'".to_string()));
                    }
                    if section == Section::Down {
                        return Err(invalid("more than one '-- down' marker".to_string()));
                    }
                    section = Section::Down;
                    continue;
                }
                _ => {}
            }

            match section {
                Section::Header => {
                    if let Some(name) = database_directive(line) {
                        if name.is_empty() {
                            return Err(invalid("empty '-- database:' directive".to_string()));
                        }
                        database = Some(name.to_string());
                    }
                }
                Section::Up => {
                    up_sql.push_str(line);
                    up_sql.push('\n');
                }
                Section::Down => {
                    down_sql.push_str(line);
                    down_sql.push('\n');
                }
            }
        }

        if !seen_up {
            return Err(invalid("missing '-- up' section".to_string()));
        }

        Ok(Self {
            database,
            up: split_statements(&up_sql).map_err(&invalid)?,
            down: split_statements(&down_sql).map_err(&invalid)?,
        })
    }

    /// Database named by the `-- database:` directive, if any.
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn up_statements(&self) -> &[String] {
        &self.up
    }

    pub fn down_statements(&self) -> &[String] {
        &self.down
    }

    fn run(&self, db: &Db<'_>, statements: &[String]) -> Result<(), BoxError> {
        let database = self.database.as_deref().unwrap_or(db.default_database());
        for statement in statements {
            db.execute_on(database, statement, &[])?;
        }
        Ok(())
    }
}

impl MigrationCode for SqlScript {
    fn up(&self, db: &Db<'_>) -> Result<(), BoxError> {
        self.run(db, &self.up)
    }

    fn down(&self, db: &Db<'_>) -> Result<(), BoxError> {
        self.run(db, &self.down)
    }
}

fn marker(line: &str) -> Option<Section> {
    let rest = line.trim().strip_prefix("--")?.trim();
    let rest = rest.strip_suffix(':').unwrap_or(rest).trim_end();
    if rest.eq_ignore_ascii_case("up") {
        Some(Section::Up)
    } else if rest.eq_ignore_ascii_case("down") {
        Some(Section::Down)
    } else {
        None
    }
}

fn database_directive(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("--")?.trim_start();
    let (key, value) = rest.split_once(':')?;
    key.trim()
        .eq_ignore_ascii_case("database")
        .then(|| value.trim())
}

/// Split SQL text into statements on top-level semicolons.
///
/// Each statement is sliced out of `sql` unchanged. Statements that hold
/// only whitespace and comments are dropped.
pub fn split_statements(sql: &str) -> Result<Vec<String>, String> {
    let dialect = GenericDialect {};
    let tokens = Tokenizer::new(&dialect, sql)
        .with_unescape(false)
        .tokenize_with_location()
        .map_err(|e| e.to_string())?;

    let offsets = SourceOffsets::new(sql);
    let mut statements = Vec::new();
    let mut start = 0;
    let mut has_code = false;

    for TokenWithSpan { token, span } in tokens {
        match token {
            Token::SemiColon => {
                let end = offsets.byte_offset(span.start);
                if has_code {
                    statements.push(sql[start..end].trim().to_string());
                }
                start = offsets.byte_offset(span.end);
                has_code = false;
            }
            Token::EOF | Token::Whitespace(_) => {}
            _ => has_code = true,
        }
    }
    if has_code {
        statements.push(sql[start..].trim().to_string());
    }

    Ok(statements)
}

/// Maps tokenizer locations (1-based line and char column) to byte offsets.
struct SourceOffsets<'a> {
    sql: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> SourceOffsets<'a> {
    fn new(sql: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(sql.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self { sql, line_starts }
    }

    fn byte_offset(&self, location: Location) -> usize {
        let line = usize::try_from(location.line.saturating_sub(1)).unwrap_or(usize::MAX);
        let Some(&line_start) = self.line_starts.get(line) else {
            return self.sql.len();
        };
        let column = usize::try_from(location.column.saturating_sub(1)).unwrap_or(usize::MAX);
        self.sql[line_start..]
            .char_indices()
            .nth(column)
            .map_or(self.sql.len(), |(idx, _)| line_start + idx)
    }
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;
