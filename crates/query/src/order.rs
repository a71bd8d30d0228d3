use std::cmp::Ordering;

use crate::flags::PlayerPrivileges;
use crate::reply::Record;

/// Server admins first, then channel-privileged players by ascending level,
/// unprivileged players last, then nickname.
pub fn compare_players(a: &Record, b: &Record) -> Ordering {
    let admin = |record: &Record| {
        PlayerPrivileges::from_bits_truncate(record.parse::<u32>("pprivs").unwrap_or(0))
            .contains(PlayerPrivileges::SERVER_ADMIN)
    };
    let (a_admin, b_admin) = (admin(a), admin(b));
    if a_admin != b_admin {
        return if a_admin { Ordering::Less } else { Ordering::Greater };
    }

    let (a_privs, b_privs) = (a.int("cprivs"), b.int("cprivs"));
    if a_privs != b_privs {
        return match (a_privs, b_privs) {
            (0, _) => Ordering::Greater,
            (_, 0) => Ordering::Less,
            _ => a_privs.cmp(&b_privs),
        };
    }

    caseless_cmp(a.field("nick").unwrap_or(""), b.field("nick").unwrap_or(""))
}

pub fn compare_channels(a: &Record, b: &Record) -> Ordering {
    let (a_order, b_order) = (a.field("order").unwrap_or(""), b.field("order").unwrap_or(""));
    if a_order != b_order {
        let ordering = natural_cmp(a_order, b_order);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    caseless_cmp(a.field("name").unwrap_or(""), b.field("name").unwrap_or(""))
}

pub fn sort_players(players: &mut [Record]) {
    players.sort_by(compare_players);
}

pub fn sort_channels(channels: &mut [Record]) {
    channels.sort_by(compare_channels);
}

fn caseless_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Compares digit runs by value and everything else bytewise, so `"2"`
/// sorts before `"10"`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.trim_start().as_bytes(), b.trim_start().as_bytes());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let a_end = digit_run_end(a, i);
            let b_end = digit_run_end(b, j);
            let ordering = compare_digit_runs(&a[i..a_end], &b[j..b_end]);
            if ordering != Ordering::Equal {
                return ordering;
            }
            i = a_end;
            j = b_end;
        } else {
            let ordering = a[i].cmp(&b[j]);
            if ordering != Ordering::Equal {
                return ordering;
            }
            i += 1;
            j += 1;
        }
    }

    (a.len() - i).cmp(&(b.len() - j))
}

fn digit_run_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|byte| !byte.is_ascii_digit())
        .map_or(bytes.len(), |offset| start + offset)
}

fn compare_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let strip = |run: &[u8]| -> usize { run.iter().take_while(|digit| **digit == b'0').count() };
    let (a, b) = (&a[strip(a)..], &b[strip(b)..]);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::parse_table;

    fn table(raw: &[&str]) -> Vec<Record> {
        let lines: Vec<String> = raw.iter().map(|line| line.to_string()).collect();
        parse_table(&lines).unwrap()
    }

    fn nicks(players: &[Record]) -> Vec<&str> {
        players.iter().map(|p| p.field("nick").unwrap()).collect()
    }

    #[test]
    fn test_natural_cmp() {
        assert_eq!(natural_cmp("2", "10"), Ordering::Less);
        assert_eq!(natural_cmp("10", "2"), Ordering::Greater);
        assert_eq!(natural_cmp("a2b", "a10b"), Ordering::Less);
        assert_eq!(natural_cmp("007", "7"), Ordering::Equal);
        assert_eq!(natural_cmp("abc", "abd"), Ordering::Less);
        assert_eq!(natural_cmp("abc", "ab"), Ordering::Greater);
        assert_eq!(natural_cmp("", ""), Ordering::Equal);
    }

    #[test]
    fn test_player_ordering() {
        let mut players = table(&[
            "p_id\tcprivs\tpprivs\tnick",
            "1\t0\t0\t\"zed\"",
            "2\t0\t1\t\"admin\"",
            "3\t2\t0\t\"Oscar\"",
            "4\t1\t0\t\"carl\"",
            "5\t0\t0\t\"Bob\"",
            "6\t1\t0\t\"Anna\"",
            "OK",
        ]);
        sort_players(&mut players);
        assert_eq!(nicks(&players), ["admin", "Anna", "carl", "Oscar", "Bob", "zed"]);
    }

    #[test]
    fn test_out_of_range_privileges_are_not_admin() {
        let mut players = table(&[
            "p_id\tcprivs\tpprivs\tnick",
            "1\t0\t-1\t\"minus\"",
            "2\t0\t4294967297\t\"huge\"",
            "3\t0\t1\t\"admin\"",
            "OK",
        ]);
        sort_players(&mut players);
        assert_eq!(nicks(&players), ["admin", "huge", "minus"]);
    }

    #[test]
    fn test_player_ordering_is_consistent() {
        let players = table(&[
            "p_id\tcprivs\tpprivs\tnick",
            "1\t0\t0\t\"a\"",
            "2\t3\t1\t\"b\"",
            "3\t1\t0\t\"c\"",
            "OK",
        ]);
        for a in &players {
            assert_eq!(compare_players(a, a), Ordering::Equal);
            for b in &players {
                assert_eq!(compare_players(a, b), compare_players(b, a).reverse());
            }
        }
    }

    #[test]
    fn test_channel_ordering() {
        let mut channels = table(&[
            "id\torder\tname",
            "1\t10\t\"Lobby\"",
            "2\t2\t\"beta\"",
            "3\t2\t\"Alpha\"",
            "4\t0\t\"Root\"",
            "OK",
        ]);
        sort_channels(&mut channels);
        let names: Vec<&str> = channels.iter().map(|c| c.field("name").unwrap()).collect();
        assert_eq!(names, ["Root", "Alpha", "beta", "Lobby"]);
    }
}
