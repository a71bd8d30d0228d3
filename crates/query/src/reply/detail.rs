use std::sync::Arc;

use serde::Serialize;

use super::Reply;
use super::record::{Record, unquote};
use super::table::{parse_table, table_schema};
use crate::error::ParseError;
use crate::net::protocol::{KnownError, STATUS_OK, Status};

/// How the part before the child table is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadingPart {
    /// Header plus one record whose cells may span several lines.
    Record,
    /// An ordinary table.
    Table,
}

/// A two-part export: a leading record followed by a child table that
/// starts at a fixed header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailExport {
    pub command: &'static str,
    pub marker: &'static str,
    pub leading: LeadingPart,
}

impl DetailExport {
    pub const CHANNEL: DetailExport = DetailExport {
        command: "ci",
        marker: "p_id\tp_nick\tsa\tca\to\tao\tv\tav\tcst\treg",
        leading: LeadingPart::Record,
    };

    pub const PLAYER: DetailExport = DetailExport {
        command: "pi",
        marker: "c_id\tname\tca\to\tao\tv\tav",
        leading: LeadingPart::Table,
    };

    pub const DB_CHANNEL: DetailExport = DetailExport {
        command: "dbci",
        marker: "p_dbid\tloginname\tca\tao\tav",
        leading: LeadingPart::Record,
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Detail {
    pub head: Option<Record>,
    pub children: Vec<Record>,
}

pub fn parse_detail(reply: &Reply, export: &DetailExport) -> Result<Detail, ParseError> {
    if reply.is_scalar() {
        return Err(ParseError::Status(reply.terminator().to_string()));
    }

    let payload = reply.payload();
    let (leading, children) = match reply.status() {
        Status::Ok => split_at_marker(payload, export.marker),
        status if status.known_error() == Some(KnownError::NoData) => (payload, &[][..]),
        status => return Err(ParseError::Status(status.as_str().to_string())),
    };

    let head = match export.leading {
        LeadingPart::Record => leading_record(leading),
        LeadingPart::Table => parse_table(&with_status(leading))?.into_iter().next(),
    };

    let children = if children.is_empty() {
        Vec::new()
    } else {
        parse_table(&with_status(children))?
    };

    Ok(Detail { head, children })
}

fn split_at_marker<'a>(payload: &'a [String], marker: &str) -> (&'a [String], &'a [String]) {
    let Some(split) = payload.iter().rposition(|line| line == marker) else {
        return (payload, &[][..]);
    };
    let (leading, children) = payload.split_at(split);
    // the parts are separated by a blank line
    let leading = match leading.split_last() {
        Some((last, rest)) if last.trim().is_empty() => rest,
        _ => leading,
    };
    (leading, children)
}

fn leading_record(lines: &[String]) -> Option<Record> {
    let (header, data) = lines.split_first()?;
    if data.is_empty() {
        return None;
    }
    let joined = data.join("\n");
    let text = joined.trim();
    let values = std::iter::once(text.to_string())
        .chain(text.split('\t').map(|cell| unquote(cell).to_string()))
        .collect();
    Some(Record::new(Arc::new(table_schema(header)), values))
}

fn with_status(lines: &[String]) -> Vec<String> {
    let mut owned = lines.to_vec();
    owned.push(STATUS_OK.to_string());
    owned
}
