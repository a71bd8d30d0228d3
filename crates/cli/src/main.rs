mod config;
mod output;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tsquery::{Outcome, Reply, Session, is_read_only_sql};

use config::{Args, Command};
use output::Output;

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();

    let config = args.session_config();
    let mut session = Session::connect(&config)
        .with_context(|| format!("Failed to connect to {}:{}", config.host, config.tcp_port))?;

    if let Some(user) = &args.user {
        let password = args.password.as_deref().unwrap_or_default();
        let login = if args.super_admin {
            session.login_super(user, password)
        } else {
            session.login(user, password)
        };
        login.with_context(|| format!("Login as {} failed", user))?;
        log::info!("Logged in as {} ({})", user, session.auth_level());
    }

    let output = Output::new(args.json);
    run(&mut session, &args.command, &output)?;

    session.disconnect();
    Ok(())
}

fn run(session: &mut Session, command: &Command, output: &Output) -> Result<()> {
    match command {
        Command::Version => match session.server_version(false)? {
            Some(version) => output.version(version),
            None => bail!("Server version unavailable"),
        },
        Command::Info => match session.server_info(false)? {
            Some(info) => output.record(info),
            None => bail!("Server info unavailable"),
        },
        Command::Players => {
            let players = session.players(false)?.unwrap_or_default();
            output.players(players)
        }
        Command::Channels => {
            let channels = session.channels(false)?.unwrap_or_default();
            output.channels(channels)
        }
        Command::Servers => {
            let ports = session.servers(false)?.unwrap_or_default();
            output.ports(ports)
        }
        Command::Global => match session.global_info()? {
            Some(info) => output.record(&info),
            None => bail!("Global info unavailable"),
        },
        Command::Channel { id } => match session.channel_detail(*id)? {
            Some(detail) => output.detail(&detail),
            None => bail!("Channel {} not found", id),
        },
        Command::Player { id } => match session.player_detail(*id)? {
            Some(detail) => output.detail(&detail),
            None => bail!("Player {} not found", id),
        },
        Command::Log { lines } => {
            let entries = session
                .read_log(*lines)?
                .context("Server log unavailable")?;
            output.log(&entries)
        }
        Command::Raw { line } => finish(output, session.fast_call(&line.join(" "))),
        Command::Exec { line } => finish(output, session.extend_call(&line.join(" "))),
        Command::Sql { text } => {
            let sql = text.join(" ");
            if is_read_only_sql(&sql) {
                match session.sql_table(&sql)? {
                    Some(rows) => output.rows(&rows),
                    None => bail!("Statement failed"),
                }
            } else {
                finish(output, session.sql_call(&sql))
            }
        }
    }
}

/// Prints whatever the server answered; a server error still fails the run.
fn finish(output: &Output, result: tsquery::Result<Reply>) -> Result<()> {
    let outcome = Outcome::of(&result);
    output.reply(&result?)?;
    match outcome {
        Outcome::ServerError(text) => bail!("Server replied {}", text),
        _ => Ok(()),
    }
}
