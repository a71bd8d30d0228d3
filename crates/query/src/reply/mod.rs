mod detail;
mod list;
mod record;
mod server_log;
mod sql;
mod table;

pub use detail::{Detail, DetailExport, LeadingPart, parse_detail};
pub use list::parse_list;
pub use record::{Record, Schema};
pub use server_log::{LogEntry, parse_log, parse_log_line};
pub use sql::{parse_sql_row, parse_sql_table};
pub use table::parse_table;

use crate::error::{ParseError, QueryError};
use crate::net::protocol::Status;

/// Raw lines of one reply; the last line is always the terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    lines: Vec<String>,
}

impl Reply {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn from_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self::new(lines.into_iter().map(Into::into).collect())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn terminator(&self) -> &str {
        self.lines.last().map(String::as_str).unwrap_or("")
    }

    pub fn status(&self) -> Status {
        let terminator = self.terminator();
        Status::classify(terminator).unwrap_or_else(|| Status::Error(terminator.to_string()))
    }

    /// Single-line replies carry nothing but a status.
    pub fn is_scalar(&self) -> bool {
        self.lines.len() <= 1
    }

    pub fn is_bare_ok(&self) -> bool {
        self.is_scalar() && self.status().is_ok()
    }

    pub fn payload(&self) -> &[String] {
        match self.lines.split_last() {
            Some((_, payload)) => payload,
            None => &[],
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self.status() {
            Status::Ok => Outcome::Ok,
            other => Outcome::ServerError(other.as_str().to_string()),
        }
    }

    pub fn table(&self) -> Result<Vec<Record>, ParseError> {
        parse_table(&self.lines)
    }

    pub fn list(&self) -> Result<Record, ParseError> {
        parse_list(&self.lines)
    }

    pub fn sql_table(&self) -> Result<Vec<Record>, ParseError> {
        parse_sql_table(self)
    }

    pub fn sql_row(&self) -> Result<Record, ParseError> {
        parse_sql_row(&self.lines)
    }
}

/// What a call amounted to, decided once at the dispatcher boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    ServerError(String),
    ConnectionFailure,
    ParseFailure,
}

impl Outcome {
    pub fn of(result: &Result<Reply, QueryError>) -> Self {
        match result {
            Ok(reply) => reply.outcome(),
            Err(err) => Outcome::from(err),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }
}

impl From<&QueryError> for Outcome {
    fn from(err: &QueryError) -> Self {
        match err {
            QueryError::Parse(_) => Outcome::ParseFailure,
            QueryError::ServerReported(text) | QueryError::Authentication(text) => {
                Outcome::ServerError(text.clone())
            }
            QueryError::NoServerSelected | QueryError::MissingServerId => {
                Outcome::ServerError(err.to_string())
            }
            QueryError::Connection(_)
            | QueryError::NotConnected
            | QueryError::ProtocolMismatch(_)
            | QueryError::IncompatibleServer(_) => Outcome::ConnectionFailure,
        }
    }
}
