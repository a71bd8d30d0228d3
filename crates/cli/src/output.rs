use anyhow::Result;
use serde::Serialize;
use tsquery::flags::{render_channel_badges, render_player_badges};
use tsquery::{
    ChannelFlags, ChannelPrivileges, Detail, LogEntry, PlayerPrivileges, Record, Reply,
    ServerVersion, VoiceCodec,
};

pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn emit_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    pub fn version(&self, version: &ServerVersion) -> Result<()> {
        if self.json {
            return self.emit_json(version);
        }
        println!("version   {}", version.total);
        println!("platform  {}", version.platform.as_deref().unwrap_or("-"));
        println!("license   {}", version.license.as_deref().unwrap_or("-"));
        Ok(())
    }

    /// Named fields one per line, positional-only entries by index.
    pub fn record(&self, record: &Record) -> Result<()> {
        if self.json {
            return self.emit_json(record);
        }
        let width = record
            .iter()
            .filter_map(|(name, _)| name.map(str::len))
            .max()
            .unwrap_or(0);
        for (position, (name, value)) in record.iter().enumerate() {
            let label = name.map(str::to_string).unwrap_or_else(|| position.to_string());
            println!("{label:<width$}  {value}");
        }
        Ok(())
    }

    pub fn players(&self, players: &[Record]) -> Result<()> {
        if self.json {
            return self.emit_json(players);
        }
        let rows = players
            .iter()
            .map(|player| {
                let channel = ChannelPrivileges::from_bits_truncate(mask(player, "cprivs"));
                let global = PlayerPrivileges::from_bits_truncate(mask(player, "pprivs"));
                vec![
                    text(player, "p_id"),
                    text(player, "c_id"),
                    text(player, "nick"),
                    render_player_badges(channel, global),
                    text(player, "ping"),
                    text(player, "ip"),
                ]
            })
            .collect::<Vec<_>>();
        print_table(&["ID", "CHANNEL", "NICK", "FLAGS", "PING", "ADDRESS"], &rows);
        Ok(())
    }

    pub fn channels(&self, channels: &[Record]) -> Result<()> {
        if self.json {
            return self.emit_json(channels);
        }
        let rows = channels
            .iter()
            .map(|channel| {
                let flags = ChannelFlags::from_bits_truncate(mask(channel, "flags"));
                vec![
                    text(channel, "id"),
                    text(channel, "parent"),
                    text(channel, "name"),
                    render_channel_badges(flags),
                    channel
                        .parse::<u32>("codec")
                        .map_or_else(|| text(channel, "codec"), |id| VoiceCodec::from_id(id).to_string()),
                    text(channel, "maxusers"),
                ]
            })
            .collect::<Vec<_>>();
        print_table(&["ID", "PARENT", "NAME", "FLAGS", "CODEC", "SLOTS"], &rows);
        Ok(())
    }

    pub fn ports(&self, ports: &[u16]) -> Result<()> {
        if self.json {
            return self.emit_json(ports);
        }
        for port in ports {
            println!("{port}");
        }
        Ok(())
    }

    pub fn detail(&self, detail: &Detail) -> Result<()> {
        if self.json {
            return self.emit_json(detail);
        }
        if let Some(head) = &detail.head {
            self.record(head)?;
        }
        if !detail.children.is_empty() {
            println!();
            self.rows(&detail.children)?;
        }
        Ok(())
    }

    /// Any table with the columns its schema declares.
    pub fn rows(&self, rows: &[Record]) -> Result<()> {
        if self.json {
            return self.emit_json(rows);
        }
        let Some(first) = rows.first() else {
            return Ok(());
        };
        // tabular rows lead with the raw line
        let skip = usize::from(first.schema().name(0) == Some("unparsed"));
        let headers: Vec<String> = first
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(position, (name, _))| name.map(str::to_string).unwrap_or_else(|| position.to_string()))
            .collect();
        let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
        let cells = rows
            .iter()
            .map(|row| row.values().iter().skip(skip).cloned().collect())
            .collect::<Vec<Vec<String>>>();
        print_table(&headers, &cells);
        Ok(())
    }

    pub fn log(&self, entries: &[LogEntry]) -> Result<()> {
        if self.json {
            return self.emit_json(entries);
        }
        for entry in entries {
            println!(
                "{} {:<5} {:<8} sid={} {}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.level,
                entry.category,
                entry.server_id,
                entry.event
            );
        }
        Ok(())
    }

    pub fn reply(&self, reply: &Reply) -> Result<()> {
        if self.json {
            return self.emit_json(reply.lines());
        }
        for line in reply.lines() {
            println!("{line}");
        }
        Ok(())
    }
}

fn mask(record: &Record, name: &str) -> u32 {
    record.parse(name).unwrap_or(0)
}

fn text(record: &Record, name: &str) -> String {
    record.field(name).unwrap_or("").to_string()
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", line(headers.to_vec()));
    for row in rows {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
}
