use std::time::Duration;

use clap::{Parser, Subcommand};
use tsquery::SessionConfig;

#[derive(Parser)]
#[command(name = "tsquery")]
#[command(about = "Query and administer voice chat server hosts")]
pub struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(short, long, default_value_t = tsquery::DEFAULT_QUERY_PORT)]
    pub port: u16,

    #[arg(short, long, help = "Virtual server UDP port to select")]
    pub udp: Option<u16>,

    #[arg(long, default_value_t = 3, help = "Connect timeout in seconds")]
    pub timeout: u64,

    #[arg(long)]
    pub user: Option<String>,

    #[arg(long, env = "TSQUERY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, help = "Log in as super server admin")]
    pub super_admin: bool,

    #[arg(long, help = "Print JSON instead of tables")]
    pub json: bool,

    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Server version
    Version,
    /// Selected virtual server settings and counters
    Info,
    /// Players on the selected server
    Players,
    /// Channels on the selected server
    Channels,
    /// Running virtual server ports
    Servers,
    /// Host-wide totals
    Global,
    /// Channel detail with its players
    Channel { id: u32 },
    /// Player detail with channel privileges
    Player { id: u32 },
    /// Tail of the server log
    Log {
        #[arg(default_value_t = 30)]
        lines: u32,
    },
    /// Send a read-only command and print the reply
    Raw {
        #[arg(required = true, trailing_var_arg = true)]
        line: Vec<String>,
    },
    /// Send a mutating command and print the reply
    Exec {
        #[arg(required = true, trailing_var_arg = true)]
        line: Vec<String>,
    },
    /// Run a statement against the server's store
    Sql {
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
}

impl Args {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            host: self.host.clone(),
            tcp_port: self.port,
            udp_port: self.udp,
            connect_timeout: Duration::from_secs(self.timeout),
            ..Default::default()
        }
    }

    pub fn log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "warn" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["tsquery", "players"]).unwrap();
        let config = args.session_config();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.tcp_port, 51234);
        assert_eq!(config.udp_port, None);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(args.log_filter(), "warn");
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "tsquery", "--host", "voice.example.net", "-p", "4000", "-u", "8767", "--timeout", "10",
            "-v", "raw", "pi", "3",
        ])
        .unwrap();
        let config = args.session_config();
        assert_eq!(config.host, "voice.example.net");
        assert_eq!(config.tcp_port, 4000);
        assert_eq!(config.udp_port, Some(8767));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(args.log_filter(), "debug");
        assert!(matches!(args.command, Command::Raw { ref line } if line == &["pi", "3"]));
    }
}
