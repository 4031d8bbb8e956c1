//! Terminal front-end for the spare-parts chat widget.
//!
//! Reads lines from stdin and drives a [`ChatWidget`] against the configured
//! endpoint, printing each new log fragment as plain text.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use parts_chat_widget::client::HttpTransport;
use parts_chat_widget::config::{Cli, WidgetConfig};
use parts_chat_widget::telemetry;
use parts_chat_widget::widget::{ChatWidget, SendOutcome};

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Send(String),
    /// Click the chip at this 1-based position of the latest row.
    Chip(usize),
    Open,
    Close,
    Maximize,
    Html(PathBuf),
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if let Some(n) = line.strip_prefix('#').and_then(|n| n.trim().parse().ok()) {
            return Some(Self::Chip(n));
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Some(Self::Send(line.to_string()));
        };
        let (name, arg) = rest.split_once(' ').unwrap_or((rest, ""));
        let command = match name {
            "open" => Self::Open,
            "close" => Self::Close,
            "max" => Self::Maximize,
            "html" if !arg.trim().is_empty() => Self::Html(PathBuf::from(arg.trim())),
            "help" | "html" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Send(line.to_string()),
        };
        Some(command)
    }
}

const HELP: &str = "\
Type a message and press enter to send it.
  #N          click suggestion N of the latest row
  /open       open the chat panel
  /close      close the chat panel
  /max        toggle the maximized panel
  /html PATH  write the widget page to PATH
  /quit       leave";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    telemetry::init_tracing();
    telemetry::install_panic_logging();

    let cli = Cli::parse();
    let config = WidgetConfig::from_cli(&cli).context("Failed to load configuration")?;

    if cli.health {
        return check_health(&config).await;
    }

    let widget = ChatWidget::from_config(&config).context("Failed to create chat widget")?;
    widget.open();

    info!(
        name: "widget.started",
        session_id = %widget.session_id(),
        "Chat widget ready"
    );
    println!("{} (type /help for commands)", config.page.title);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = Command::parse(&line) else {
            continue;
        };
        match command {
            Command::Send(text) => {
                let mark = LogMark::take(&widget);
                widget.set_input(text);
                let outcome = widget.submit().await;
                mark.print_new(&widget, outcome);
            }
            Command::Chip(position) => {
                let label = widget
                    .latest_suggestions()
                    .and_then(|row| row.chip(position).map(|chip| chip.label.clone()));
                match label {
                    Some(label) => {
                        let mark = LogMark::take(&widget);
                        let outcome = widget.click_suggestion(&label).await;
                        mark.print_new(&widget, outcome);
                    }
                    None => println!("No suggestion #{position}."),
                }
            }
            Command::Open => widget.open(),
            Command::Close => widget.close(),
            Command::Maximize => widget.toggle_maximized(),
            Command::Html(path) => {
                match tokio::fs::write(&path, widget.render_page(&config.page.title)).await {
                    Ok(()) => println!("Wrote {}", path.display()),
                    Err(e) => {
                        error!(name: "page.write_failed", path = %path.display(), error = %e, "Could not write page");
                        println!("Could not write {}.", path.display());
                    }
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
    }

    Ok(())
}

/// Position in the log and clock before an exchange.
struct LogMark {
    first_new: usize,
    started: Instant,
}

impl LogMark {
    fn take(widget: &ChatWidget) -> Self {
        Self {
            first_new: widget.log_len(),
            started: Instant::now(),
        }
    }

    /// Print what the exchange appended, minus the echoed user message, and
    /// any notification it raised.
    fn print_new(&self, widget: &ChatWidget, outcome: SendOutcome) {
        if matches!(outcome, SendOutcome::Ignored(_)) {
            return;
        }
        for fragment in widget.fragments_since(self.first_new).iter().skip(1) {
            println!("{}", fragment.to_plain_text());
        }
        for note in widget
            .notifications()
            .iter()
            .filter(|n| n.raised_at >= self.started)
        {
            println!("! {}", note.text);
        }
    }
}

async fn check_health(config: &WidgetConfig) -> anyhow::Result<()> {
    let transport = HttpTransport::new(config.chat_url()?.as_str())?.health_url(config.health_url()?);
    let health = transport.health().await.context("Health check failed")?;

    println!(
        "status: {}  database: {}  timestamp: {}",
        health.status,
        health.database.as_deref().unwrap_or("-"),
        health.timestamp.as_deref().unwrap_or("-"),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("   "), None);
        assert_eq!(
            Command::parse("  brake pads "),
            Some(Command::Send("brake pads".to_string()))
        );
        assert_eq!(Command::parse("#2"), Some(Command::Chip(2)));
        assert_eq!(Command::parse("/open"), Some(Command::Open));
        assert_eq!(Command::parse("/max"), Some(Command::Maximize));
        assert_eq!(
            Command::parse("/html out/page.html"),
            Some(Command::Html(PathBuf::from("out/page.html")))
        );
        assert_eq!(Command::parse("/html"), Some(Command::Help));
        assert_eq!(Command::parse("/quit"), Some(Command::Quit));
    }

    #[test]
    fn test_unknown_slash_text_is_sent() {
        assert_eq!(
            Command::parse("/5 wheels"),
            Some(Command::Send("/5 wheels".to_string()))
        );
        assert_eq!(Command::parse("#abc"), Some(Command::Send("#abc".to_string())));
    }
}
