//! chatwire — terminal front-end for the line chat service.
//!
//! Reads lines from stdin and prints the reconciled chat view to stdout.
//! Logging goes to stderr (`RUST_LOG=chatwire_client=debug` for detail), so
//! it can be redirected without disturbing the conversation.
//!
//! Local commands: `/theme`, `/users`, `/quit`. Anything else, including
//! `/nick <name>` and `/who`, is sent to the server.

mod config;
mod input;
mod theme;
mod view;

use chatwire_client::{ChatClient, ClientConfig, PageOrigin};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use input::Input;
use view::TermView;

#[derive(Debug, Parser)]
#[command(name = "chatwire", version, about = "Terminal client for a line-oriented chat server")]
struct Args {
    /// Server host
    #[arg(long, env = "CHATWIRE_HOST")]
    host: Option<String>,

    /// Server port (ports outside the allowed set fall back to 9101)
    #[arg(long, short, env = "CHATWIRE_PORT")]
    port: Option<u16>,

    /// Use wss://
    #[arg(long)]
    secure: bool,

    /// Nickname to claim once connected
    #[arg(long, short, env = "CHATWIRE_NICK")]
    nick: Option<String>,

    /// Config file (default: ~/.config/chatwire/config.toml)
    #[arg(long, env = "CHATWIRE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(config::config_file);
    let file = config::load(&config_path);

    let origin = PageOrigin::new(
        args.host.unwrap_or(file.connection.host),
        args.port.or(file.connection.port),
        args.secure || file.connection.secure,
    );
    let client_config = ClientConfig::default()
        .with_reconnect_delay(Duration::from_millis(file.connection.reconnect_delay_ms));

    let mut client = ChatClient::websocket(&origin, client_config);
    info!("Starting chatwire against {}", client.url());
    let mut updates = client
        .take_update_rx()
        .ok_or("update receiver already taken")?;
    let handle = client.handle();
    let task = client.spawn();

    if let Some(nick) = args.nick {
        // Held offline and asserted as soon as the connection opens.
        handle.set_nickname(nick)?;
    }

    let mut view = TermView::new(file.preferences.theme);
    let mut stdout = std::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(update) => view.apply(&update, &mut stdout)?,
                None => break,
            },
            line = lines.next_line(), if stdin_open => {
                let input = match line? {
                    Some(line) => Input::parse(&line),
                    None => {
                        stdin_open = false;
                        Input::Quit
                    }
                };
                let sent = match input {
                    Input::Quit => handle.shutdown(),
                    Input::Theme => {
                        let theme = view.toggle_theme();
                        if let Err(e) = config::save_theme(&config_path, theme) {
                            log::warn!("Could not persist theme: {e}");
                        }
                        handle.note(format!("* theme set to {theme} *"))
                    }
                    Input::Users => {
                        view.write_roster(&mut stdout)?;
                        Ok(())
                    }
                    Input::Message(text) => handle.send_message(text),
                };
                if sent.is_err() {
                    // Client loop already gone.
                    break;
                }
            }
        }
    }

    task.await?;
    info!("chatwire exited");
    Ok(())
}
