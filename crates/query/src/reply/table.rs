use std::sync::Arc;

use super::record::{Record, Schema, unquote};
use crate::error::ParseError;

pub(crate) const UNPARSED: &str = "unparsed";

/// Parses a tab-separated table: header line, data rows, terminator.
pub fn parse_table(lines: &[String]) -> Result<Vec<Record>, ParseError> {
    if lines.len() < 2 {
        return Err(ParseError::TooFewLines {
            expected: 2,
            found: lines.len(),
        });
    }

    let (header, rest) = lines.split_at(1);
    let rows = &rest[..rest.len() - 1];
    let schema = Arc::new(table_schema(&header[0]));

    Ok(rows
        .iter()
        .map(|row| Record::new(Arc::clone(&schema), split_row(row)))
        .collect())
}

pub(crate) fn table_schema(header: &str) -> Schema {
    Schema::named(std::iter::once(UNPARSED).chain(header.split('\t')))
}

pub(crate) fn split_row(row: &str) -> Vec<String> {
    std::iter::once(row.to_string())
        .chain(row.split('\t').map(|cell| unquote(cell).to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn test_rows_are_addressable_by_name_and_position() {
        let reply = lines(&[
            "p_id\tc_id\tnick",
            "1\t2\t\"Alice\"",
            "3\t4\t\"Bob\"",
            "OK",
        ]);
        let rows = parse_table(&reply).unwrap();
        assert_eq!(rows.len(), 2);
        for (row, raw) in rows.iter().zip(&reply[1..3]) {
            assert_eq!(row.unparsed(), raw);
            assert_eq!(row.field("unparsed"), Some(raw.as_str()));
            assert_eq!(row.field("p_id"), row.get(1));
            assert_eq!(row.field("c_id"), row.get(2));
            assert_eq!(row.field("nick"), row.get(3));
        }
        assert_eq!(rows[0].field("nick"), Some("Alice"));
        assert_eq!(rows[1].field("p_id"), Some("3"));
    }

    #[test]
    fn test_header_only_table_is_empty() {
        let rows = parse_table(&lines(&["id\tname", "OK"])).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_too_short_reply_fails() {
        assert_eq!(
            parse_table(&lines(&["OK"])),
            Err(ParseError::TooFewLines {
                expected: 2,
                found: 1
            })
        );
        assert!(parse_table(&[]).is_err());
    }

    #[test]
    fn test_empty_trailing_cell_is_kept() {
        let rows = parse_table(&lines(&["id\tname\ttopic", "1\tLobby\t", "OK"])).unwrap();
        assert_eq!(rows[0].field("topic"), Some(""));
        assert_eq!(rows[0].len(), 4);
    }

    #[test]
    fn test_rows_share_one_schema() {
        let rows = parse_table(&lines(&["id", "1", "2", "OK"])).unwrap();
        assert!(Arc::ptr_eq(rows[0].schema(), rows[1].schema()));
    }
}
