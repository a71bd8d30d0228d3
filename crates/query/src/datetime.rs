use chrono::{NaiveDate, NaiveDateTime};

/// Decodes the store's `ddmmyyyyhhmmss` timestamps.
pub fn parse_db_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.len() != 14 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number = |range: std::ops::Range<usize>| value[range].parse::<u32>().ok();
    let day = number(0..2)?;
    let month = number(2..4)?;
    let year = i32::try_from(number(4..8)?).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(number(8..10)?, number(10..12)?, number(12..14)?)
}

/// Decodes the `dd-mm-yy hh:mm:ss` stamp that opens each server log line.
pub fn parse_log_timestamp(value: &str) -> Option<NaiveDateTime> {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 17
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            2 | 5 => *byte == b'-',
            8 => byte.is_ascii_whitespace(),
            11 | 14 => *byte == b':',
            _ => byte.is_ascii_digit(),
        });
    if !shape_ok {
        return None;
    }
    let number = |range: std::ops::Range<usize>| value[range].parse::<u32>().ok();
    let year = 2000 + i32::try_from(number(6..8)?).ok()?;
    NaiveDate::from_ymd_opt(year, number(3..5)?, number(0..2)?)?.and_hms_opt(
        number(9..11)?,
        number(12..14)?,
        number(15..17)?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_db_date() {
        let parsed = parse_db_date("24122008173005").unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2008, 12, 24));
        assert_eq!((parsed.hour(), parsed.minute(), parsed.second()), (17, 30, 5));
    }

    #[test]
    fn test_db_date_rejects_garbage() {
        assert_eq!(parse_db_date(""), None);
        assert_eq!(parse_db_date("2412200817300"), None);
        assert_eq!(parse_db_date("2412x008173005"), None);
        assert_eq!(parse_db_date("32122008173005"), None);
    }

    #[test]
    fn test_log_timestamp() {
        let parsed = parse_log_timestamp("11-09-09 08:15:42").unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2009, 9, 11));
        assert_eq!((parsed.hour(), parsed.minute(), parsed.second()), (8, 15, 42));
        assert_eq!(parse_log_timestamp("11/09/09 08:15:42"), None);
        assert_eq!(parse_log_timestamp("11-09-09"), None);
    }
}
