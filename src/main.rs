// memscope: live struct inspector and entity table over in-process memory

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use memscope::config::InspectorConfig;
use memscope::ui::App;

struct Args {
    config: Option<PathBuf>,
    log: Option<PathBuf>,
}

fn usage(program_name: &str) -> ! {
    eprintln!("Usage: {} [--config <memscope.toml>] [--log <file>]", program_name);
    eprintln!();
    eprintln!("Keys: tab focus, enter expand, s sort, c copy, d docs, r reload,");
    eprintln!("      l language, m raw/rich, p follow pointers, q quit");
    std::process::exit(1);
}

fn parse_args() -> Args {
    let mut args = std::env::args();
    let program_name = args.next().unwrap_or_else(|| String::from("memscope"));
    let mut parsed = Args {
        config: None,
        log: None,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => match args.next() {
                Some(path) => parsed.config = Some(PathBuf::from(path)),
                None => usage(&program_name),
            },
            "--log" => match args.next() {
                Some(path) => parsed.log = Some(PathBuf::from(path)),
                None => usage(&program_name),
            },
            "-h" | "--help" => usage(&program_name),
            other => {
                eprintln!("Error: unexpected argument '{}'", other);
                usage(&program_name);
            }
        }
    }
    parsed
}

fn main() -> anyhow::Result<()> {
    let args = parse_args();

    // The terminal belongs to the UI, so logs only go to a file
    if let Some(log) = &args.log {
        let file = File::create(log)
            .with_context(|| format!("could not create log file {}", log.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }

    let config = match &args.config {
        Some(path) => InspectorConfig::load(path)?,
        None => InspectorConfig::default(),
    };
    tracing::info!(?config, "starting memscope");

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(config);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "ui loop failed");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
