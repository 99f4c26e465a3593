//! Statement parsing
//!
//! The engine's external collaborator: turns one line of input into a
//! validated request. Lexical validation lives here — a negative id is
//! rejected before any unsigned conversion, and field lengths are checked at
//! row construction — so the engine only ever sees well-formed rows.

use crate::error::{OrionError, Result};
use crate::row::Row;

/// A parsed statement
#[derive(Debug, Clone)]
pub enum Statement {
    /// Insert one row
    Insert(Row),

    /// Scan every row in key order
    Select,
}

impl Statement {
    /// Parse a single input line.
    ///
    /// `insert <id> <username> <email>` and `select` are the only statement
    /// forms; meta-commands are the shell's business, not the parser's.
    pub fn parse(input: &str) -> Result<Statement> {
        let mut fields = input.split_whitespace();
        match fields.next() {
            Some("insert") => {
                let id_text = fields.next().ok_or_else(missing_insert_field)?;
                let username = fields.next().ok_or_else(missing_insert_field)?;
                let email = fields.next().ok_or_else(missing_insert_field)?;

                if id_text.starts_with('-') {
                    return Err(OrionError::Parse("id must be non-negative".to_string()));
                }
                let id: u32 = id_text
                    .parse()
                    .map_err(|_| OrionError::Parse(format!("cannot parse id: {}", id_text)))?;

                Ok(Statement::Insert(Row::new(id, username, email)?))
            }
            Some("select") => Ok(Statement::Select),
            Some(other) => Err(OrionError::Parse(format!(
                "unrecognized statement: {}",
                other
            ))),
            None => Err(OrionError::Parse("empty statement".to_string())),
        }
    }
}

fn missing_insert_field() -> OrionError {
    OrionError::Parse("insert needs: insert <id> <username> <email>".to_string())
}
