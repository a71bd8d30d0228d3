use std::fmt;

use serde::Serialize;

use crate::error::ParseError;
use crate::net::protocol::{MIN_BUILD, MIN_RELEASE};

/// Decoded `ver` reply, e.g. `2.0.32.60 Win32 Freeware`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerVersion {
    pub unparsed: String,
    pub total: String,
    pub major: u32,
    pub minor: u32,
    pub release: u32,
    pub build: Option<u32>,
    pub platform: Option<String>,
    pub license: Option<String>,
}

impl ServerVersion {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let malformed = || ParseError::MalformedVersion(line.to_string());
        let mut words = line.split_whitespace();
        let total = words.next().ok_or_else(malformed)?;

        let mut numbers = total.split('.');
        let mut next_number = || -> Result<Option<u32>, ParseError> {
            numbers
                .next()
                .map(|part| part.parse().map_err(|_| malformed()))
                .transpose()
        };
        let major = next_number()?.ok_or_else(malformed)?;
        let minor = next_number()?.ok_or_else(malformed)?;
        let release = next_number()?.ok_or_else(malformed)?;
        let build = next_number()?;

        Ok(Self {
            unparsed: line.to_string(),
            total: total.to_string(),
            major,
            minor,
            release,
            build,
            platform: words.next().map(str::to_string),
            license: words.next().map(str::to_string),
        })
    }

    /// Rejects only servers older on both axes; an unknown build passes.
    pub fn is_supported(&self) -> bool {
        let too_old = self.release < MIN_RELEASE && self.build.is_some_and(|build| build < MIN_BUILD);
        !too_old
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.total)
    }
}
