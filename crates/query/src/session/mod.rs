mod config;
mod fetch;
mod version;

pub use config::SessionConfig;
pub use version::ServerVersion;

use std::fmt;
use std::io::{Read, Write};
use std::net::TcpStream;

use crate::cache::Cache;
use crate::error::{QueryError, Result};
use crate::net::protocol::BANNER;
use crate::net::{Connection, ConnectionStats, Dispatcher};
use crate::reply::Reply;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum AuthLevel {
    #[default]
    Anonymous,
    ServerAdmin,
    SuperServerAdmin,
}

impl AuthLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthLevel::Anonymous => "anonymous",
            AuthLevel::ServerAdmin => "SA",
            AuthLevel::SuperServerAdmin => "SSA",
        }
    }
}

impl fmt::Display for AuthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Login last accepted by the server, kept for layers that authenticate
/// elsewhere with the same account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"*******")
            .finish()
    }
}

/// One authenticated conversation with a query server.
///
/// Commands are strictly request/response; a session must not be shared
/// between threads without external locking.
#[derive(Debug)]
pub struct Session<S: Read + Write = TcpStream> {
    dispatcher: Option<Dispatcher<S>>,
    host: String,
    tcp_port: u16,
    udp_port: Option<u16>,
    server_id: Option<u32>,
    auth: AuthLevel,
    credentials: Option<Credentials>,
    cache: Cache,
}

impl Session<TcpStream> {
    pub fn connect(config: &SessionConfig) -> Result<Self> {
        let connection = Connection::open(
            &config.host,
            config.tcp_port,
            config.connect_timeout,
            config.read_timeout,
        )
        .map_err(|e| {
            log::error!(
                "TCP query connection to {}:{} failed: {}",
                config.host,
                config.tcp_port,
                e
            );
            QueryError::Connection(e)
        })?;
        Self::handshake(connection, &config.host, config.tcp_port, config.udp_port)
    }
}

impl<S: Read + Write> Session<S> {
    /// Checks the banner and server version on a fresh connection and
    /// optionally selects a virtual server. Any failure closes the session.
    pub fn handshake(
        connection: Connection<S>,
        host: &str,
        tcp_port: u16,
        udp_port: Option<u16>,
    ) -> Result<Self> {
        let mut session = Self {
            dispatcher: Some(Dispatcher::new(connection)),
            host: host.to_string(),
            tcp_port,
            udp_port: None,
            server_id: None,
            auth: AuthLevel::Anonymous,
            credentials: None,
            cache: Cache::new(),
        };

        if let Err(e) = session.negotiate(udp_port) {
            session.disconnect();
            return Err(e);
        }

        log::info!(
            "Connected to query server {}:{}",
            session.host,
            session.tcp_port
        );
        Ok(session)
    }

    fn negotiate(&mut self, udp_port: Option<u16>) -> Result<()> {
        let banner = self.dispatcher_mut()?.read_line()?;
        if banner != BANNER {
            log::error!("Host {} is not a query server", self.host);
            return Err(QueryError::ProtocolMismatch(banner));
        }

        let version = self.server_version(false)?.cloned().ok_or_else(|| {
            log::error!("Server version could not be read");
            QueryError::IncompatibleServer("unknown".to_string())
        })?;
        if !version.is_supported() {
            log::error!("Incompatible server version ({})", version.total);
            return Err(QueryError::IncompatibleServer(version.total));
        }

        if let Some(port) = udp_port {
            self.select(port)?;
        }
        Ok(())
    }

    /// Sends `quit` and releases the stream. Safe to call repeatedly.
    pub fn disconnect(&mut self) {
        let Some(mut dispatcher) = self.dispatcher.take() else {
            return;
        };
        if let Err(e) = dispatcher.send("quit") {
            log::debug!("quit was not delivered: {}", e);
        }
        self.udp_port = None;
        self.server_id = None;
        self.cache.clear_all();
        log::info!("Disconnected from {}:{}", self.host, self.tcp_port);
    }

    pub fn login(&mut self, user: &str, password: &str) -> Result<()> {
        self.authenticate("login", AuthLevel::ServerAdmin, user, password)
    }

    pub fn login_super(&mut self, user: &str, password: &str) -> Result<()> {
        self.authenticate("slogin", AuthLevel::SuperServerAdmin, user, password)
    }

    fn authenticate(
        &mut self,
        verb: &str,
        level: AuthLevel,
        user: &str,
        password: &str,
    ) -> Result<()> {
        let reply = self.extend_call(&format!("{verb} {user} {password}"))?;
        if !reply.is_bare_ok() {
            log::warn!("Invalid username or password for {}", user);
            return Err(QueryError::Authentication(reply.terminator().to_string()));
        }

        self.credentials = Some(Credentials {
            user: user.to_string(),
            password: password.to_string(),
        });
        if level > self.auth {
            self.auth = level;
            log::warn!("Permission level changed to {}", self.auth);
        }
        Ok(())
    }

    /// Selects the virtual server on `udp_port` and learns its id.
    pub fn select(&mut self, udp_port: u16) -> Result<u32> {
        let reply = self.extend_call(&format!("sel {udp_port}"))?;
        if !reply.is_bare_ok() {
            log::error!("Invalid virtual server port ({})", udp_port);
            return Err(QueryError::ServerReported(reply.terminator().to_string()));
        }

        // The server has switched already; the old pair no longer holds.
        self.udp_port = None;
        self.server_id = None;
        let server_id = self
            .load_server_info(true)?
            .and_then(|info| info.parse::<u32>("server_id"))
            .ok_or_else(|| {
                log::error!("Virtual server on port {} reported no id", udp_port);
                QueryError::MissingServerId
            })?;

        self.udp_port = Some(udp_port);
        self.server_id = Some(server_id);
        log::info!(
            "Virtual server port {} (ID {}) selected",
            udp_port,
            server_id
        );
        Ok(server_id)
    }

    pub fn is_connected(&self) -> bool {
        self.dispatcher.is_some()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn tcp_port(&self) -> u16 {
        self.tcp_port
    }

    pub fn udp_port(&self) -> Option<u16> {
        self.udp_port
    }

    pub fn server_id(&self) -> Option<u32> {
        self.server_id
    }

    pub fn auth_level(&self) -> AuthLevel {
        self.auth
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn connection_stats(&self) -> Option<&ConnectionStats> {
        self.dispatcher
            .as_ref()
            .map(|dispatcher| dispatcher.connection().stats())
    }

    pub fn require_selected(&self) -> Result<u32> {
        match (self.udp_port, self.server_id) {
            (Some(_), Some(server_id)) => Ok(server_id),
            _ => Err(QueryError::NoServerSelected),
        }
    }

    pub fn fast_call(&mut self, command: &str) -> Result<Reply> {
        let result = self.dispatcher_mut()?.fast_call(command);
        self.track(result)
    }

    pub fn fast_calls<I, C>(&mut self, commands: I) -> Result<Vec<Reply>>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let result = self.dispatcher_mut()?.fast_calls(commands);
        self.track(result)
    }

    pub fn extend_call(&mut self, command: &str) -> Result<Reply> {
        let dispatcher = self.dispatcher.as_mut().ok_or(QueryError::NotConnected)?;
        let result = dispatcher.extend_call(command, &mut self.cache);
        self.track(result)
    }

    pub fn extend_calls<I, C>(&mut self, commands: I) -> Result<Vec<Reply>>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let dispatcher = self.dispatcher.as_mut().ok_or(QueryError::NotConnected)?;
        let result = dispatcher.extend_calls(commands, &mut self.cache);
        self.track(result)
    }

    pub fn sql_call(&mut self, sql: &str) -> Result<Reply> {
        let dispatcher = self.dispatcher.as_mut().ok_or(QueryError::NotConnected)?;
        let result = dispatcher.sql_call(sql, &mut self.cache);
        self.track(result)
    }

    fn dispatcher_mut(&mut self) -> Result<&mut Dispatcher<S>> {
        self.dispatcher.as_mut().ok_or(QueryError::NotConnected)
    }

    /// A transport failure leaves the stream mid-reply; drop it.
    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_fatal() && self.dispatcher.take().is_some() {
                log::error!("Query connection to {} lost: {}", self.host, e);
                self.udp_port = None;
                self.server_id = None;
                self.cache.clear_all();
            }
        }
        result
    }
}

impl<S: Read + Write> Drop for Session<S> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
