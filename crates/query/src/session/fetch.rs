use std::io::{Read, Write};

use super::{ServerVersion, Session};
use crate::error::{ParseError, QueryError, Result};
use crate::flags::{ChannelFlags, PlayerFlags, PlayerIcon};
use crate::order::{sort_channels, sort_players};
use crate::reply::{Detail, DetailExport, LogEntry, Record, Reply, parse_detail, parse_log};

// dbuserlist: id, sa, created, lastonline, name
const DB_USER_ID: usize = 1;
const DB_USER_SA: usize = 2;
const DB_USER_NAME: usize = 5;
// dbsuserlist: id, created, lastonline, name
const DB_SUPER_USER_ID: usize = 1;
const DB_SUPER_USER_NAME: usize = 4;
// dbserverlist: id, port, ...
const DB_SERVER_ID: usize = 1;
const DB_SERVER_PORT: usize = 2;

/// Malformed or empty replies read as "nothing there".
fn absent<T>(command: &str, parsed: std::result::Result<T, ParseError>) -> Option<T> {
    match parsed {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("{} reply not usable: {}", command, e);
            None
        }
    }
}

fn matches_id<T: PartialEq + std::str::FromStr>(record: &Record, position: usize, id: T) -> bool {
    record.parse_at::<T>(position).is_some_and(|value| value == id)
}

impl<S: Read + Write> Session<S> {
    fn table(&mut self, command: &str) -> Result<Option<Vec<Record>>> {
        let reply = self.fast_call(command)?;
        Ok(absent(command, reply.table()))
    }

    fn list(&mut self, command: &str) -> Result<Option<Record>> {
        let reply = self.fast_call(command)?;
        Ok(absent(command, reply.list()))
    }

    /// Players on the selected server, admins first.
    pub fn players(&mut self, force: bool) -> Result<Option<&[Record]>> {
        self.require_selected()?;
        if force || self.cache.players.is_none() {
            let mut players = self.table("pl")?;
            if let Some(players) = players.as_mut() {
                sort_players(players);
            }
            self.cache.players = players;
        }
        Ok(self.cache.players.as_deref())
    }

    pub fn channels(&mut self, force: bool) -> Result<Option<&[Record]>> {
        self.require_selected()?;
        if force || self.cache.channels.is_none() {
            let mut channels = self.table("cl")?;
            if let Some(channels) = channels.as_mut() {
                sort_channels(channels);
            }
            self.cache.channels = channels;
        }
        Ok(self.cache.channels.as_deref())
    }

    /// UDP ports of the running virtual servers, ascending.
    pub fn servers(&mut self, force: bool) -> Result<Option<&[u16]>> {
        if force || self.cache.servers.is_none() {
            let ports = self.list("sl")?.map(|list| {
                let mut ports: Vec<u16> = list
                    .values()
                    .iter()
                    .filter_map(|value| value.trim().parse().ok())
                    .collect();
                ports.sort_unstable();
                ports
            });
            self.cache.servers = ports;
        }
        Ok(self.cache.servers.as_deref())
    }

    pub fn server_info(&mut self, force: bool) -> Result<Option<&Record>> {
        self.require_selected()?;
        self.load_server_info(force)
    }

    /// `si` merged with `gapl`; both must parse.
    pub(super) fn load_server_info(&mut self, force: bool) -> Result<Option<&Record>> {
        if force || self.cache.server_info.is_none() {
            let info = self.list("si")?;
            let permissions = self.list("gapl")?;
            self.cache.server_info = info.zip(permissions).map(|(info, permissions)| info.merge(permissions));
        }
        Ok(self.cache.server_info.as_ref())
    }

    pub fn server_version(&mut self, force: bool) -> Result<Option<&ServerVersion>> {
        if force || self.cache.server_version.is_none() {
            let reply = self.fast_call("ver")?;
            self.cache.server_version = absent("ver", parse_version(&reply));
        }
        Ok(self.cache.server_version.as_ref())
    }

    pub fn db_users(&mut self, force: bool) -> Result<Option<&[Record]>> {
        if force || self.cache.db_users.is_none() {
            self.cache.db_users = self.table("dbuserlist")?;
        }
        Ok(self.cache.db_users.as_deref())
    }

    pub fn db_super_users(&mut self, force: bool) -> Result<Option<&[Record]>> {
        if force || self.cache.db_super_users.is_none() {
            self.cache.db_super_users = self.table("dbsuserlist")?;
        }
        Ok(self.cache.db_super_users.as_deref())
    }

    pub fn db_servers(&mut self, force: bool) -> Result<Option<&[Record]>> {
        if force || self.cache.db_servers.is_none() {
            self.cache.db_servers = self.table("dbserverlist")?;
        }
        Ok(self.cache.db_servers.as_deref())
    }

    pub fn server_description(&mut self, force: bool) -> Result<Option<&str>> {
        let server_id = self.require_selected()?;
        if force || self.cache.server_description.is_none() {
            let reply = self.sql_call(&format!(
                "SELECT s_server_description FROM ts2_servers WHERE i_server_id = {server_id}"
            ))?;
            self.cache.server_description = absent("sql", reply.sql_row())
                .and_then(|row| row.field("s_server_description").map(str::to_string));
        }
        Ok(self.cache.server_description.as_deref())
    }

    pub fn player_names(&mut self, force: bool) -> Result<Vec<(u32, String)>> {
        Ok(self
            .players(force)?
            .unwrap_or_default()
            .iter()
            .filter_map(|player| {
                let id = player.parse("p_id")?;
                Some((id, player.field("nick")?.to_string()))
            })
            .collect())
    }

    pub fn player_by_name(&mut self, nick: &str, force: bool) -> Result<Option<u32>> {
        Ok(self
            .players(force)?
            .unwrap_or_default()
            .iter()
            .find(|player| player.field("nick") == Some(nick))
            .and_then(|player| player.parse("p_id")))
    }

    pub fn player_info(&mut self, player_id: u32, force: bool) -> Result<Option<Record>> {
        Ok(self
            .players(force)?
            .unwrap_or_default()
            .iter()
            .find(|player| player.parse::<u32>("p_id") == Some(player_id))
            .cloned())
    }

    pub fn player_icon(&mut self, player_id: u32, force: bool) -> Result<Option<PlayerIcon>> {
        Ok(self.player_info(player_id, force)?.map(|player| {
            let flags = player.parse::<u32>("pflags").unwrap_or(0);
            PlayerIcon::from_flags(PlayerFlags::from_bits_truncate(flags))
        }))
    }

    pub fn channel_names(&mut self, force: bool) -> Result<Vec<(u32, String)>> {
        Ok(self
            .channels(force)?
            .unwrap_or_default()
            .iter()
            .filter_map(|channel| {
                let id = channel.parse("id")?;
                Some((id, channel.field("name")?.to_string()))
            })
            .collect())
    }

    pub fn channel_by_name(&mut self, name: &str, force: bool) -> Result<Option<u32>> {
        Ok(self
            .channels(force)?
            .unwrap_or_default()
            .iter()
            .find(|channel| channel.field("name") == Some(name))
            .and_then(|channel| channel.parse("id")))
    }

    pub fn channel_info(&mut self, channel_id: u32, force: bool) -> Result<Option<Record>> {
        Ok(self
            .channels(force)?
            .unwrap_or_default()
            .iter()
            .find(|channel| channel.parse::<u32>("id") == Some(channel_id))
            .cloned())
    }

    pub fn channel_players(&mut self, channel_id: u32, force: bool) -> Result<Vec<Record>> {
        Ok(self
            .players(force)?
            .unwrap_or_default()
            .iter()
            .filter(|player| player.parse::<u32>("c_id") == Some(channel_id))
            .cloned()
            .collect())
    }

    pub fn subchannels(&mut self, channel_id: u32, force: bool) -> Result<Vec<Record>> {
        Ok(self
            .channels(force)?
            .unwrap_or_default()
            .iter()
            .filter(|channel| channel.parse::<i64>("parent") == Some(i64::from(channel_id)))
            .cloned()
            .collect())
    }

    /// First channel carrying the default flag.
    pub fn default_channel(&mut self, force: bool) -> Result<Option<u32>> {
        Ok(self
            .channels(force)?
            .unwrap_or_default()
            .iter()
            .find(|channel| {
                ChannelFlags::from_bits_truncate(channel.parse::<u32>("flags").unwrap_or(0))
                    .contains(ChannelFlags::DEFAULT)
            })
            .and_then(|channel| channel.parse("id")))
    }

    pub fn server_current_users(&mut self, force: bool) -> Result<Option<u32>> {
        Ok(self
            .server_info(force)?
            .and_then(|info| info.parse("server_currentusers")))
    }

    /// Accounts with the server admin bit.
    pub fn db_admins(&mut self, force: bool) -> Result<Vec<Record>> {
        Ok(self
            .db_users(force)?
            .unwrap_or_default()
            .iter()
            .filter(|account| account.parse_at::<i64>(DB_USER_SA).is_some_and(|sa| sa != 0))
            .cloned()
            .collect())
    }

    pub fn db_user_by_name(&mut self, name: &str, force: bool) -> Result<Option<u32>> {
        Ok(self
            .db_users(force)?
            .unwrap_or_default()
            .iter()
            .find(|account| account.get(DB_USER_NAME) == Some(name))
            .and_then(|account| account.parse_at(DB_USER_ID)))
    }

    pub fn db_user_info(&mut self, account_id: u32, force: bool) -> Result<Option<Record>> {
        Ok(self
            .db_users(force)?
            .unwrap_or_default()
            .iter()
            .find(|account| matches_id(account, DB_USER_ID, account_id))
            .cloned())
    }

    pub fn db_super_user_by_name(&mut self, name: &str, force: bool) -> Result<Option<u32>> {
        Ok(self
            .db_super_users(force)?
            .unwrap_or_default()
            .iter()
            .find(|account| account.get(DB_SUPER_USER_NAME) == Some(name))
            .and_then(|account| account.parse_at(DB_SUPER_USER_ID)))
    }

    pub fn db_super_user_info(&mut self, account_id: u32, force: bool) -> Result<Option<Record>> {
        Ok(self
            .db_super_users(force)?
            .unwrap_or_default()
            .iter()
            .find(|account| matches_id(account, DB_SUPER_USER_ID, account_id))
            .cloned())
    }

    /// Ports of every virtual server known to the store, ascending.
    pub fn db_server_ports(&mut self, force: bool) -> Result<Vec<u16>> {
        let mut ports: Vec<u16> = self
            .db_servers(force)?
            .unwrap_or_default()
            .iter()
            .filter_map(|server| server.parse_at(DB_SERVER_PORT))
            .collect();
        ports.sort_unstable();
        Ok(ports)
    }

    /// Store row of `server_id`, or of the selected server.
    pub fn db_server_info(&mut self, server_id: Option<u32>, force: bool) -> Result<Option<Record>> {
        let server_id = server_id.or(self.server_id).ok_or(QueryError::MissingServerId)?;
        Ok(self
            .db_servers(force)?
            .unwrap_or_default()
            .iter()
            .find(|server| matches_id(server, DB_SERVER_ID, server_id))
            .cloned())
    }

    pub fn db_server_by_port(&mut self, udp_port: Option<u16>, force: bool) -> Result<Option<Record>> {
        let udp_port = udp_port.or(self.udp_port).ok_or(QueryError::NoServerSelected)?;
        Ok(self
            .db_servers(force)?
            .unwrap_or_default()
            .iter()
            .find(|server| matches_id(server, DB_SERVER_PORT, udp_port))
            .cloned())
    }

    /// Status column of the store row; 0 for unknown servers.
    pub fn server_status(&mut self, server_id: Option<u32>, force: bool) -> Result<i64> {
        match self.db_server_info(server_id, force)? {
            Some(server) => Ok(server.int("status")),
            None => {
                log::error!("Invalid virtual server ID ({:?})", server_id.or(self.server_id));
                Ok(0)
            }
        }
    }

    pub fn global_info(&mut self) -> Result<Option<Record>> {
        self.list("gi")
    }

    pub fn find_channel(&mut self, query: &str) -> Result<Option<Vec<Record>>> {
        self.table(&format!("fc {query}"))
    }

    pub fn find_player(&mut self, query: &str) -> Result<Option<Vec<Record>>> {
        self.table(&format!("fp {query}"))
    }

    pub fn db_find_player(&mut self, query: &str) -> Result<Option<Vec<Record>>> {
        self.table(&format!("dbfp {query}"))
    }

    pub fn channel_detail(&mut self, channel_id: u32) -> Result<Option<Detail>> {
        self.detail(&DetailExport::CHANNEL, channel_id)
    }

    pub fn player_detail(&mut self, player_id: u32) -> Result<Option<Detail>> {
        self.detail(&DetailExport::PLAYER, player_id)
    }

    pub fn db_channel_detail(&mut self, channel_id: u32) -> Result<Option<Detail>> {
        self.detail(&DetailExport::DB_CHANNEL, channel_id)
    }

    fn detail(&mut self, export: &DetailExport, id: u32) -> Result<Option<Detail>> {
        self.require_selected()?;
        let reply = self.fast_call(&format!("{} {id}", export.command))?;
        Ok(absent(export.command, parse_detail(&reply, export)))
    }

    /// Last `lines` entries of the server log.
    pub fn read_log(&mut self, lines: u32) -> Result<Option<Vec<LogEntry>>> {
        let reply = self.fast_call(&format!("log {lines}"))?;
        Ok(absent("log", parse_log(&reply)))
    }

    pub fn find_log(&mut self, query: &str) -> Result<Option<Vec<LogEntry>>> {
        let reply = self.fast_call(&format!("logfind {query}"))?;
        Ok(absent("logfind", parse_log(&reply)))
    }

    pub fn sql_table(&mut self, sql: &str) -> Result<Option<Vec<Record>>> {
        let reply = self.sql_call(sql)?;
        Ok(absent("sql", reply.sql_table()))
    }

    pub fn sql_row(&mut self, sql: &str) -> Result<Option<Record>> {
        let reply = self.sql_call(sql)?;
        Ok(absent("sql", reply.sql_row()))
    }

    pub fn extended_server_info(&mut self, force: bool) -> Result<Vec<(u16, Record)>> {
        self.for_each_server(force, |session| Ok(session.server_info(false)?.cloned()))
    }

    pub fn extended_server_players(&mut self, force: bool) -> Result<Vec<(u16, Vec<Record>)>> {
        self.for_each_server(force, |session| Ok(session.players(false)?.map(<[Record]>::to_vec)))
    }

    pub fn extended_server_channels(&mut self, force: bool) -> Result<Vec<(u16, Vec<Record>)>> {
        self.for_each_server(force, |session| Ok(session.channels(false)?.map(<[Record]>::to_vec)))
    }

    /// Selects each running virtual server in turn, then restores the
    /// previous selection. Servers that refuse selection are skipped.
    fn for_each_server<T, F>(&mut self, force: bool, mut read: F) -> Result<Vec<(u16, T)>>
    where
        F: FnMut(&mut Self) -> Result<Option<T>>,
    {
        let ports = self.servers(force)?.map(<[u16]>::to_vec).unwrap_or_default();
        let previous = self.udp_port;
        let mut collected = Vec::with_capacity(ports.len());

        for port in ports {
            match self.select(port) {
                Ok(_) => {
                    if let Some(value) = read(self)? {
                        collected.push((port, value));
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => log::warn!("Skipping virtual server {}: {}", port, e),
            }
        }

        if let Some(port) = previous {
            self.select(port)?;
        }
        Ok(collected)
    }
}

fn parse_version(reply: &Reply) -> std::result::Result<ServerVersion, ParseError> {
    if !reply.status().is_ok() {
        return Err(ParseError::Status(reply.terminator().to_string()));
    }
    let line = reply.payload().first().ok_or(ParseError::NoData)?;
    ServerVersion::parse(line)
}
