//! Console front end for the Holocron tip manager.
//!
//! Reads commands such as `!conquest s3b1` from stdin and prints replies.
//! Prompts are answered with `/select <message> <choice>`.

mod config;
mod console;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use orchestrator::{
    Orchestrator, RequestContext, SelectionEvent, SelectionOutcome, Settings, StaticPermissions,
};
use tip_storage::SqlitePersistence;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::console::ConsoleTransport;

/// Scope id used for every console request.
const CONSOLE_SCOPE: &str = "console";

#[derive(Debug, Parser)]
#[command(name = "holocron-bot")]
#[command(about = "Read and manage game tips from the terminal")]
struct Args {
    /// SQLite database URL. Falls back to HOLOCRON_DATABASE_URL.
    #[arg(long)]
    database_url: Option<String>,

    /// Directory holding the label catalogs and map images. Falls back to HOLOCRON_DATA_DIR.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Id of the console user. Falls back to HOLOCRON_USER_ID.
    #[arg(long)]
    user_id: Option<String>,

    /// Display name of the console user. Falls back to HOLOCRON_USER_NAME.
    #[arg(long)]
    user_name: Option<String>,

    /// Grant the console user the elevated role.
    #[arg(long)]
    admin: bool,
}

/// One line typed at the console.
#[derive(Debug, PartialEq, Eq)]
enum ConsoleInput<'a> {
    Quit,
    Sweep,
    Select { message_id: &'a str, selector: &'a str },
    As { user_id: &'a str, user_name: &'a str },
    Text(&'a str),
}

impl<'a> ConsoleInput<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let mut words = line.split_whitespace();
        match words.next() {
            Some("/quit") | Some("/exit") => Some(Self::Quit),
            Some("/sweep") => Some(Self::Sweep),
            Some("/select") => Some(Self::Select {
                message_id: words.next()?,
                selector: words.next()?,
            }),
            Some("/as") => {
                let user_id = words.next()?;
                Some(Self::As {
                    user_id,
                    user_name: words.next().unwrap_or(user_id),
                })
            }
            Some(_) => Some(Self::Text(line)),
            None => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(url) = args.database_url {
        config.database_url = url;
    }
    if let Some(user_id) = args.user_id {
        config.user_id = user_id;
    }
    if let Some(user_name) = args.user_name {
        config.user_name = user_name;
    }
    if args.admin {
        config.admins.push(config.user_id.clone());
    }

    let mut settings = Settings::from_env()?;
    if let Some(data_dir) = args.data_dir {
        settings = settings.with_data_dir(data_dir);
    }
    let prefix = settings.prefix.clone();

    info!(database_url = %config.database_url, "Connecting to database");
    let persistence = SqlitePersistence::connect(&config.database_url).await?;
    persistence.migrate().await?;

    let mut permissions = StaticPermissions::new();
    for admin in &config.admins {
        permissions = permissions.with_admin(admin.as_str());
    }
    for (name, id) in &config.members {
        permissions = permissions.with_member(name, id.as_str());
    }

    let orchestrator = Arc::new(
        Orchestrator::load(
            settings,
            ConsoleTransport::new(),
            permissions,
            Arc::new(persistence),
        )
        .await?,
    );
    let _sweeper = orchestrator.clone().spawn_expiry_sweep();

    let mut context = RequestContext::new(
        &config.user_id,
        &config.user_name,
        &config.channel_id,
        CONSOLE_SCOPE,
    );
    println!(
        "Holocron ready. Try `{}conquest help`, `/select <message> <choice>`, `/as <id> [name]` or `/quit`.\n",
        prefix
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(input) = ConsoleInput::parse(line.trim()) else {
            continue;
        };

        match input {
            ConsoleInput::Quit => break,
            ConsoleInput::Sweep => {
                let swept = orchestrator.sweep_expired(Utc::now()).await;
                println!("Swept {} expired prompts.\n", swept);
            }
            ConsoleInput::As { user_id, user_name } => {
                context = RequestContext::new(user_id, user_name, &config.channel_id, CONSOLE_SCOPE);
                println!("Now speaking as {} ({}).\n", user_name, user_id);
            }
            ConsoleInput::Select {
                message_id,
                selector,
            } => {
                let event = SelectionEvent::new(message_id, &context.requester_id, selector);
                match orchestrator.handle_selection(&event).await {
                    Ok(SelectionOutcome::Ignored) => println!("(selection ignored)\n"),
                    Ok(SelectionOutcome::Cancelled) => println!("(prompt cancelled)\n"),
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "Failed to handle selection"),
                }
            }
            ConsoleInput::Text(text) => match orchestrator.handle_message(&context, text).await {
                Ok(Some(_)) => {}
                Ok(None) => println!("(not a command, try `{}conquest help`)\n", prefix),
                Err(e) => error!(error = %e, "Failed to handle message"),
            },
        }
    }

    info!("Console closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_input() {
        assert_eq!(ConsoleInput::parse("/quit"), Some(ConsoleInput::Quit));
        assert_eq!(
            ConsoleInput::parse("/select c3 next"),
            Some(ConsoleInput::Select {
                message_id: "c3",
                selector: "next"
            })
        );
        assert_eq!(ConsoleInput::parse("/select c3"), None);
        assert_eq!(
            ConsoleInput::parse("/as u-han"),
            Some(ConsoleInput::As {
                user_id: "u-han",
                user_name: "u-han"
            })
        );
        assert_eq!(
            ConsoleInput::parse("!conquest g1"),
            Some(ConsoleInput::Text("!conquest g1"))
        );
        assert_eq!(ConsoleInput::parse(""), None);
    }
}
