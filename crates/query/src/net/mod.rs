mod connection;
mod dispatch;
pub mod protocol;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::{Connection, ConnectionStats};
pub use dispatch::{Dispatcher, HEALTH_CHECK_COMMAND, SQL_COMMAND, is_read_only_sql};
pub use protocol::{
    BANNER, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_QUERY_PORT, KnownError, STATUS_OK, Status,
};
