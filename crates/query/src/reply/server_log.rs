use chrono::NaiveDateTime;
use serde::Serialize;

use super::Reply;
use crate::datetime::parse_log_timestamp;
use crate::error::ParseError;
use crate::net::protocol::Status;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub unparsed: String,
    pub timestamp: NaiveDateTime,
    pub kind: String,
    pub level: String,
    pub category: String,
    /// Virtual server the event belongs to, 0 for host-wide events.
    pub server_id: u32,
    pub event: String,
}

/// Parses the reply of `log`/`logfind`. Lines that do not start with a
/// timestamp are skipped.
pub fn parse_log(reply: &Reply) -> Result<Vec<LogEntry>, ParseError> {
    match reply.status() {
        Status::Ok => {}
        other => return Err(ParseError::Status(other.as_str().to_string())),
    }
    Ok(reply
        .payload()
        .iter()
        .filter_map(|line| parse_log_line(line))
        .collect())
}

pub fn parse_log_line(line: &str) -> Option<LogEntry> {
    let mut parts = line.splitn(5, ',');
    let timestamp = parse_log_timestamp(parts.next()?)?;
    let kind = capitalize(&parts.next()?.to_lowercase());
    let level = capitalize(&parts.next()?.to_lowercase());
    let category = capitalize(parts.next()?);
    let raw_event = parts.next().unwrap_or("");
    let (server_id, event) = split_server_event(raw_event)
        .unwrap_or_else(|| (0, raw_event.trim().to_string()));

    Some(LogEntry {
        unparsed: line.to_string(),
        timestamp,
        kind,
        level,
        category,
        server_id,
        event,
    })
}

/// Splits `\tSID: <n> <text>`.
fn split_server_event(raw: &str) -> Option<(u32, String)> {
    let rest = raw.strip_prefix("\tSID:")?;
    let mut chars = rest.chars();
    if !chars.next()?.is_whitespace() {
        return None;
    }
    let rest = chars.as_str();
    let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let server_id = rest[..digits_end].parse().ok()?;
    let tail = &rest[digits_end..];
    if !tail.starts_with(char::is_whitespace) {
        return None;
    }
    let text = tail.trim();
    if text.is_empty() {
        return None;
    }
    Some((server_id, text.to_string()))
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_event_line() {
        let entry =
            parse_log_line("11-09-09 08:15:42,ALL,INFO,server,\tSID: 3 client connected").unwrap();
        assert_eq!(entry.kind, "All");
        assert_eq!(entry.level, "Info");
        assert_eq!(entry.category, "Server");
        assert_eq!(entry.server_id, 3);
        assert_eq!(entry.event, "client connected");
    }

    #[test]
    fn test_host_event_line() {
        let entry = parse_log_line("11-09-09 08:15:42,ALL,ERROR,sql, database locked ").unwrap();
        assert_eq!(entry.level, "Error");
        assert_eq!(entry.server_id, 0);
        assert_eq!(entry.event, "database locked");
    }

    #[test]
    fn test_lines_without_timestamp_are_skipped() {
        let reply = Reply::from_lines([
            "garbage line",
            "11-09-09 08:15:42,ALL,INFO,server,\tSID: 1 started",
            "OK",
        ]);
        let entries = parse_log(&reply).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "started");
    }

    #[test]
    fn test_bare_ok_is_empty_log() {
        assert_eq!(parse_log(&Reply::from_lines(["OK"])), Ok(Vec::new()));
    }

    #[test]
    fn test_error_status_fails() {
        assert!(parse_log(&Reply::from_lines(["ERROR, invalid permissions"])).is_err());
    }
}
