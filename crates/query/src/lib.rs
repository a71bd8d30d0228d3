pub mod cache;
pub mod datetime;
pub mod error;
pub mod flags;
pub mod net;
pub mod order;
pub mod reply;
pub mod session;
pub mod voice;

pub use cache::Cache;
pub use datetime::{parse_db_date, parse_log_timestamp};
pub use error::{ParseError, QueryError, Result};
pub use flags::{
    ChannelFlags, ChannelPrivileges, FlagFamily, FlagSet, IdleTargets, PlayerFlags, PlayerIcon,
    PlayerPrivileges,
};
pub use net::{
    Connection, ConnectionStats, DEFAULT_QUERY_PORT, Dispatcher, KnownError, Status,
    is_read_only_sql,
};
pub use order::{compare_channels, compare_players, natural_cmp};
pub use reply::{Detail, DetailExport, LogEntry, Outcome, Record, Reply, Schema};
pub use session::{AuthLevel, Credentials, ServerVersion, Session, SessionConfig};
pub use voice::VoiceCodec;
