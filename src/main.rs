mod app;
mod config;
mod input;
mod theme;
mod ui;
mod verify;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Options};
use config::{AppConfig, MAX_CODE_LENGTH};
use verify::Verifier;

#[derive(Parser, Debug)]
#[command(name = "kodo")]
#[command(version = "0.1.0")]
#[command(about = "A terminal-friendly one-time-passcode entry prompt")]
struct Args {
    /// Number of code cells
    #[arg(short, long)]
    length: Option<usize>,

    /// Title shown above the code box
    #[arg(short, long, default_value = "Enter code")]
    prompt: String,

    /// Verify the entered code against this value
    #[arg(short, long, conflicts_with = "check")]
    expect: Option<String>,

    /// Verify by running a command (the code is passed as $1 and $KODO_CODE)
    #[arg(short, long)]
    check: Option<String>,

    /// Print the result as JSON on stdout
    #[arg(short, long)]
    json: bool,

    /// Send a desktop notification with the outcome
    #[arg(short, long)]
    notify: bool,

    /// Render entered digits as a mask character
    #[arg(short, long)]
    mask: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = AppConfig::load().unwrap_or_default();
    ui::init_theme(config.colors.as_ref());

    let verifier = if let Some(code) = args.expect.clone() {
        Some(Verifier::Expected(code))
    } else {
        args.check.clone().map(Verifier::Command)
    };

    let options = Options {
        length: args
            .length
            .unwrap_or(config.default_length)
            .clamp(1, MAX_CODE_LENGTH),
        prompt: args.prompt.clone(),
        verifier,
        mask: args.mask || config.mask,
        max_attempts: config.max_attempts,
        check_timeout: Duration::from_secs(config.check_timeout_secs),
    };

    let mut app = App::new(options);
    run_tui(&mut app).await?;

    finish(app, args.json, args.notify || config.notifications)
}

async fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if app.should_quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('c')
                        if key.modifiers.contains(event::KeyModifiers::CONTROL) =>
                    {
                        return Ok(())
                    }
                    _ => {
                        // Handle key and catch any errors to prevent crashes
                        if let Err(e) = app.handle_key(key) {
                            app.status_message = Some(format!("Error: {}", e));
                        }
                    }
                },
                Event::Paste(text) => app.handle_paste(&text),
                _ => {}
            }
        }

        // Pending verification and status-message expiry
        let _ = app.tick().await;
    }
}

/// Report the session outcome after the terminal is restored.
fn finish(app: App, json: bool, notify_outcome: bool) -> Result<()> {
    match app.result {
        Some(result) if result.accepted => {
            if notify_outcome {
                let _ = notify("kodo", "Code accepted");
            }
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "code": result.code,
                        "accepted": true,
                        "attempts": result.attempts,
                    })
                );
            } else {
                println!("{}", result.code);
            }
            Ok(())
        }
        Some(result) => {
            if notify_outcome {
                let _ = notify("kodo", "Verification failed");
            }
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "code": null,
                        "accepted": false,
                        "attempts": result.attempts,
                    })
                );
            }
            std::process::exit(2);
        }
        None => {
            // Aborted with Esc or Ctrl+C
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "code": null,
                        "accepted": false,
                        "attempts": app.attempts,
                    })
                );
            }
            std::process::exit(1);
        }
    }
}

fn notify(summary: &str, body: &str) -> Result<()> {
    notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .icon("dialog-password")
        .show()?;
    Ok(())
}
