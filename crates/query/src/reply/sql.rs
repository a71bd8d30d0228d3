use std::sync::Arc;

use super::Reply;
use super::record::{Record, Schema};
use crate::error::ParseError;
use crate::net::protocol::Status;

/// Parses rows of tab-separated `name=<d>value<d>` cells.
pub fn parse_sql_table(reply: &Reply) -> Result<Vec<Record>, ParseError> {
    if reply.is_scalar() {
        return match reply.status() {
            Status::Ok => Ok(Vec::new()),
            other => Err(ParseError::Status(other.as_str().to_string())),
        };
    }

    let mut schema: Option<Arc<Schema>> = None;
    let mut rows = Vec::with_capacity(reply.payload().len());
    for line in reply.payload() {
        let (names, values) = split_cells(line)?;
        let shared = match schema.take() {
            Some(existing) if same_names(&existing, &names) => existing,
            _ => Arc::new(Schema::named(names)),
        };
        rows.push(Record::new(Arc::clone(&shared), values));
        schema = Some(shared);
    }
    Ok(rows)
}

/// Parses a single-row SQL reply.
pub fn parse_sql_row(lines: &[String]) -> Result<Record, ParseError> {
    if lines.len() != 2 {
        return Err(ParseError::NotScalar { found: lines.len() });
    }
    let (names, values) = split_cells(&lines[0])?;
    Ok(Record::new(Arc::new(Schema::named(names)), values))
}

fn split_cells(line: &str) -> Result<(Vec<String>, Vec<String>), ParseError> {
    let mut names = Vec::new();
    let mut values = Vec::new();
    for cell in line.split('\t') {
        let (name, value) = cell
            .split_once('=')
            .ok_or_else(|| ParseError::MalformedCell(cell.to_string()))?;
        names.push(name.to_string());
        values.push(strip_delimiters(value).to_string());
    }
    Ok((names, values))
}

fn strip_delimiters(value: &str) -> &str {
    let mut chars = value.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

fn same_names(schema: &Schema, names: &[String]) -> bool {
    schema.len() == names.len()
        && names
            .iter()
            .enumerate()
            .all(|(position, name)| schema.name(position) == Some(name.as_str()))
}
