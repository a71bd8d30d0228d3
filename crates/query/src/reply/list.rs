use std::sync::Arc;

use super::record::{Record, Schema};
use crate::error::ParseError;

/// Parses `key=value` lines into one flat record. Lines without `=` keep
/// their position but get no name.
pub fn parse_list(lines: &[String]) -> Result<Record, ParseError> {
    let data = match lines.split_last() {
        Some((_, data)) if !data.is_empty() => data,
        _ => return Err(ParseError::NoData),
    };

    let mut names = Vec::with_capacity(data.len());
    let mut values = Vec::with_capacity(data.len());
    for line in data {
        match line.split_once('=') {
            Some((name, value)) => {
                names.push(Some(name.to_string()));
                values.push(value.to_string());
            }
            None => {
                names.push(None);
                values.push(line.clone());
            }
        }
    }

    Ok(Record::new(Arc::new(Schema::new(names)), values))
}
