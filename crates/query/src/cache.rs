use crate::reply::Record;
use crate::session::ServerVersion;

/// Last fetched snapshot of each list the session hands out.
#[derive(Debug, Clone, Default)]
pub struct Cache {
    pub players: Option<Vec<Record>>,
    pub channels: Option<Vec<Record>>,
    pub servers: Option<Vec<u16>>,
    pub db_users: Option<Vec<Record>>,
    pub db_super_users: Option<Vec<Record>>,
    pub db_servers: Option<Vec<Record>>,
    pub server_info: Option<Record>,
    pub server_description: Option<String>,
    /// Fixed for the lifetime of a connection.
    pub server_version: Option<ServerVersion>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every snapshot except the server version.
    pub fn invalidate(&mut self) {
        let server_version = self.server_version.take();
        *self = Cache {
            server_version,
            ..Cache::default()
        };
    }

    pub fn clear_all(&mut self) {
        *self = Cache::default();
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_none()
            && self.channels.is_none()
            && self.servers.is_none()
            && self.db_users.is_none()
            && self.db_super_users.is_none()
            && self.db_servers.is_none()
            && self.server_info.is_none()
            && self.server_description.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> Cache {
        Cache {
            players: Some(Vec::new()),
            channels: Some(Vec::new()),
            servers: Some(vec![8767]),
            db_users: Some(Vec::new()),
            db_super_users: Some(Vec::new()),
            db_servers: Some(Vec::new()),
            server_info: None,
            server_description: Some("welcome".to_string()),
            server_version: ServerVersion::parse("2.0.32.60 Win32 Freeware").ok(),
        }
    }

    #[test]
    fn test_invalidate_keeps_version() {
        let mut cache = filled();
        assert!(!cache.is_empty());
        cache.invalidate();
        assert!(cache.is_empty());
        assert!(cache.server_version.is_some());
    }

    #[test]
    fn test_clear_all() {
        let mut cache = filled();
        cache.clear_all();
        assert!(cache.is_empty());
        assert!(cache.server_version.is_none());
    }
}
