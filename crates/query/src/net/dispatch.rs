use std::io::{Read, Write};

use super::connection::Connection;
use super::protocol::{KnownError, masked_command, verb};
use crate::cache::Cache;
use crate::error::Result;
use crate::reply::Reply;

pub const SQL_COMMAND: &str = "sql";
pub const HEALTH_CHECK_COMMAND: &str = "checkserverok";

/// Read-only statements go through a fast call, everything else mutates.
pub fn is_read_only_sql(sql: &str) -> bool {
    verb(sql) == "SELECT"
}

/// Sends commands and reads their replies, one at a time.
#[derive(Debug)]
pub struct Dispatcher<S: Read + Write> {
    connection: Connection<S>,
}

impl<S: Read + Write> Dispatcher<S> {
    pub fn new(connection: Connection<S>) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &Connection<S> {
        &self.connection
    }

    pub fn into_connection(self) -> Connection<S> {
        self.connection
    }

    /// Writes a command without waiting for a reply.
    pub fn send(&mut self, command: &str) -> Result<()> {
        log::debug!("-> {}", masked_command(command));
        self.connection.write_line(command)?;
        Ok(())
    }

    pub fn read_line(&mut self) -> Result<String> {
        Ok(self.connection.read_line()?)
    }

    pub fn fast_call(&mut self, command: &str) -> Result<Reply> {
        self.send(command)?;
        let reply = self.connection.read_reply()?;
        log::debug!(
            "<- {} ({} lines)",
            reply.terminator(),
            reply.lines().len()
        );
        Ok(reply)
    }

    /// Runs each command in order; a transport failure stops the batch.
    pub fn fast_calls<I, C>(&mut self, commands: I) -> Result<Vec<Reply>>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        commands
            .into_iter()
            .map(|command| self.fast_call(command.as_ref()))
            .collect()
    }

    /// Fast call for commands with side effects. Every list snapshot is
    /// dropped unless the server rejected the command outright.
    pub fn extend_call(&mut self, command: &str, cache: &mut Cache) -> Result<Reply> {
        let reply = self.fast_call(command)?;
        if reply.is_scalar() && !reply.status().is_ok() {
            return Ok(reply);
        }
        cache.invalidate();
        log::warn!(
            "List cache has been cleared during query ({})",
            verb(command)
        );
        Ok(reply)
    }

    pub fn extend_calls<I, C>(&mut self, commands: I, cache: &mut Cache) -> Result<Vec<Reply>>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        commands
            .into_iter()
            .map(|command| self.extend_call(command.as_ref(), cache))
            .collect()
    }

    /// Tunnels a statement to the server's store. A failed statement comes
    /// back as the bare generic error sentinel.
    pub fn sql_call(&mut self, sql: &str, cache: &mut Cache) -> Result<Reply> {
        let command = format!("{SQL_COMMAND} {}", sql.trim());
        let read_only = is_read_only_sql(sql);
        let reply = if read_only {
            self.fast_call(&command)?
        } else {
            self.extend_call(&command, cache)?
        };

        if reply.status().known_error() == Some(KnownError::Generic) {
            log::error!(
                "SQL statement failed: {}",
                reply.lines().first().map(String::as_str).unwrap_or("")
            );
            return Ok(Reply::from_lines([KnownError::Generic.as_str()]));
        }

        let rejected = reply.is_scalar() && !reply.status().is_ok();
        if !read_only && !rejected {
            let health = self.fast_call(HEALTH_CHECK_COMMAND)?;
            if !health.status().is_ok() {
                log::warn!("Health check after SQL reported {}", health.terminator());
            }
        }
        Ok(reply)
    }
}
