use std::io;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("connection failed: {0}")]
    Connection(#[from] io::Error),
    #[error("not connected")]
    NotConnected,
    #[error("host is not a query server (banner {0:?})")]
    ProtocolMismatch(String),
    #[error("incompatible server version {0}")]
    IncompatibleServer(String),
    #[error("authentication rejected: {0}")]
    Authentication(String),
    #[error("no virtual server selected")]
    NoServerSelected,
    #[error("virtual server id unavailable")]
    MissingServerId,
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("server reported: {0}")]
    ServerReported(String),
}

impl QueryError {
    /// Transport and handshake failures leave the session unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            QueryError::Connection(_)
                | QueryError::NotConnected
                | QueryError::ProtocolMismatch(_)
                | QueryError::IncompatibleServer(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("reply has {found} lines, expected at least {expected}")]
    TooFewLines { expected: usize, found: usize },
    #[error("reply carries no data lines")]
    NoData,
    #[error("scalar reply has {found} lines, expected exactly 2")]
    NotScalar { found: usize },
    #[error("reply ended with {0:?}")]
    Status(String),
    #[error("malformed cell {0:?}")]
    MalformedCell(String),
    #[error("malformed version line {0:?}")]
    MalformedVersion(String),
    #[error("missing field {0:?}")]
    MissingField(&'static str),
}
