pub const DEFAULT_QUERY_PORT: u16 = 51234;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 3;

pub const STATUS_OK: &str = "OK";
pub const BANNER: &str = "[TS]";
pub const ERROR_PREFIX: &str = "error";

/// Oldest release/build pair the query engine understands.
pub const MIN_RELEASE: u32 = 23;
pub const MIN_BUILD: u32 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownError {
    InvalidId,
    PlayerNotFound,
    ChannelNotFound,
    NotLoggedIn,
    NoData,
    PortInUse,
    AlreadyInChannel,
    InitFailed,
    Generic,
    ParamCount,
    Permissions,
    InvalidLogin,
    ServerRunning,
    NoServerSelected,
    NumberFormat,
    PasswordMismatch,
    LoginLocked,
    Banned,
}

impl KnownError {
    pub const ALL: [KnownError; 18] = [
        KnownError::InvalidId,
        KnownError::PlayerNotFound,
        KnownError::ChannelNotFound,
        KnownError::NotLoggedIn,
        KnownError::NoData,
        KnownError::PortInUse,
        KnownError::AlreadyInChannel,
        KnownError::InitFailed,
        KnownError::Generic,
        KnownError::ParamCount,
        KnownError::Permissions,
        KnownError::InvalidLogin,
        KnownError::ServerRunning,
        KnownError::NoServerSelected,
        KnownError::NumberFormat,
        KnownError::PasswordMismatch,
        KnownError::LoginLocked,
        KnownError::Banned,
    ];

    /// Exact wire text. Typos are the server's and must stay.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownError::InvalidId => "ERROR, invalid id",
            KnownError::PlayerNotFound => "ERROR, Playerid does not exist",
            KnownError::ChannelNotFound => "ERROR, Channelid does not exist",
            KnownError::NotLoggedIn => "ERROR, not logged in",
            KnownError::NoData => "ERROR, no data available",
            KnownError::PortInUse => "ERROR, port already in use",
            KnownError::AlreadyInChannel => "ERROR, Allready member of channel",
            KnownError::InitFailed => "ERROR, unable to initialize server",
            KnownError::Generic => "ERROR, error",
            KnownError::ParamCount => "ERROR, invalid paramcount",
            KnownError::Permissions => "ERROR, invalid permissions",
            KnownError::InvalidLogin => "ERROR, invalid login",
            KnownError::ServerRunning => "ERROR, server is running",
            KnownError::NoServerSelected => "ERROR, no server selected",
            KnownError::NumberFormat => "ERROR, invalid number format",
            KnownError::PasswordMismatch => "ERROR, passwort dont match",
            KnownError::LoginLocked => {
                "Your password failed 3 consecutive times, please wait 10 minutes before trying again!"
            }
            KnownError::Banned => {
                "You are still banned or a failed password try caused a 30 second delay!"
            }
        }
    }

    pub fn from_line(line: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|known| known.as_str() == line)
    }
}

/// Classification of a reply's terminal line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ok,
    Banner,
    Error(String),
}

impl Status {
    pub fn classify(line: &str) -> Option<Self> {
        if line == STATUS_OK {
            Some(Status::Ok)
        } else if line == BANNER {
            Some(Status::Banner)
        } else if is_error_line(line) {
            Some(Status::Error(line.to_string()))
        } else {
            None
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }

    pub fn known_error(&self) -> Option<KnownError> {
        match self {
            Status::Error(text) => KnownError::from_line(text),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Ok => STATUS_OK,
            Status::Banner => BANNER,
            Status::Error(text) => text,
        }
    }
}

fn is_error_line(line: &str) -> bool {
    line.get(..ERROR_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(ERROR_PREFIX))
}

pub fn is_terminator(line: &str) -> bool {
    Status::classify(line).is_some()
}

pub fn encode_command(command: &str) -> String {
    let mut line = command.trim().to_string();
    line.push('\n');
    line
}

/// Strips line endings and padding but keeps tabs, which delimit empty
/// trailing cells.
pub fn clean_line(raw: &str) -> &str {
    raw.trim_matches(|c: char| matches!(c, ' ' | '\r' | '\n' | '\0'))
}

/// First whitespace-delimited token of a command.
pub fn verb(command: &str) -> &str {
    command.split_whitespace().next().unwrap_or("")
}

/// Command text safe to write to logs.
pub fn masked_command(command: &str) -> String {
    match verb(command) {
        "login" => "login ******* *******".to_string(),
        "slogin" => "slogin ******* *******".to_string(),
        _ => command.trim().to_string(),
    }
}
