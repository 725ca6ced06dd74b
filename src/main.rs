mod config;
mod notes;
mod tui;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Command, CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::{Generator, Shell, generate};
use config::{Config, ConfigError, KEYS};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{LevelFilter, info};
use notes::models::{NewNote, NoteEdit, NoteId};
use notes::seed::{DEFAULT_SEED_COUNT, seed_notes, slugify};
use notes::store::NoteStore;
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use simplelog::{Config as LogConfig, WriteLogger};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::time::Instant;
use tui::app::{App, AppSettings};
use tui::gesture::Feedback;
use tui::loader::Loader;
use tui::ui;

#[derive(Parser)]
#[command(name = "edgenote")]
#[command(about = "Browse, search and bulk-select notes in the terminal")]
struct Cli {
    #[arg(short, long, help = "Log debug output to the log file")]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Configuration management")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    #[command(about = "Add a note")]
    Add {
        #[arg(short, long, help = "Note title")]
        title: Option<String>,
        #[arg(short, long, help = "Public slug (defaults to one derived from the title)")]
        slug: Option<String>,
        #[arg(short, long, help = "Publish the note at /p/<slug>")]
        public: bool,
        #[arg(help = "Note content")]
        content: String,
    },
    #[command(about = "Change an existing note")]
    Edit {
        #[arg(help = "Id of the note to change")]
        id: NoteId,
        #[arg(short, long, help = "New title")]
        title: Option<String>,
        #[arg(short, long, help = "New slug (empty to remove it)")]
        slug: Option<String>,
        #[arg(short, long, help = "New content")]
        content: Option<String>,
        #[arg(long, help = "Publish (true) or unpublish (false) the note")]
        public: Option<bool>,
    },
    #[command(about = "Fill the notes file with generated notes")]
    Seed {
        #[arg(short, long, default_value_t = DEFAULT_SEED_COUNT, help = "Number of notes to generate")]
        count: usize,
    },
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    #[command(about = "Set a configuration value")]
    Set {
        #[arg(help = "Configuration key (notes_path, page_size, long_press_ms, move_threshold, log_file)")]
        key: String,
        #[arg(help = "Configuration value", value_hint = ValueHint::AnyPath)]
        value: String,
    },
    #[command(about = "Get a configuration value")]
    Get {
        #[arg(help = "Configuration key")]
        key: String,
    },
    #[command(about = "List all configuration values")]
    List,
}

/// Rings the terminal bell when a long-press lands.
struct TerminalBell;

impl Feedback for TerminalBell {
    fn long_press(&mut self) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(b"\x07").and_then(|_| stdout.flush());
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { action }) => {
            if let Err(e) = handle_config_command(action) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            print_completions(shell, &mut cmd);
        }
        Some(Commands::Add { title, slug, public, content }) => {
            if let Err(e) = add_note(title, slug, public, content) {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Edit { id, title, slug, content, public }) => {
            let edit = NoteEdit {
                title,
                content,
                slug,
                is_public: public,
            };
            if let Err(e) = edit_note(id, edit) {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Seed { count }) => {
            if let Err(e) = seed(count) {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            if let Err(e) = run_main_app(cli.verbose) {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

fn handle_config_command(action: ConfigAction) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("Configuration saved successfully.");
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for key in KEYS {
                println!("{} = {}", key, config.get(key)?);
            }
        }
    }
    Ok(())
}

fn open_store(config: &Config) -> Result<NoteStore> {
    NoteStore::open(&config.notes_path).with_context(|| format!("Failed to open notes at {}", config.notes_path))
}

fn add_note(title: Option<String>, slug: Option<String>, public: bool, content: String) -> Result<()> {
    let config = Config::load()?;
    let mut store = open_store(&config)?;

    let slug = match slug {
        Some(slug) => Some(slug),
        None if public => title.as_deref().map(slugify).filter(|s| !s.is_empty()),
        None => None,
    };
    let id = store.add(
        NewNote {
            title,
            content,
            slug,
            is_public: public,
        },
        Utc::now(),
    )?;
    store.save()?;

    match store.get(id).and_then(|note| note.public_path()) {
        Some(path) => println!("Added note {} (public at {})", id, path),
        None => println!("Added note {}", id),
    }
    Ok(())
}

fn edit_note(id: NoteId, edit: NoteEdit) -> Result<()> {
    let config = Config::load()?;
    let mut store = open_store(&config)?;

    store.update(id, edit, Utc::now())?;
    store.save()?;
    println!("Updated note {}", id);
    Ok(())
}

fn seed(count: usize) -> Result<()> {
    let config = Config::load()?;
    let mut store = open_store(&config)?;

    let inserted = seed_notes(&mut store, count, Utc::now(), &mut rand::thread_rng())?;
    store.save()?;
    println!("Seeded {} notes into {}", inserted, store.path().display());
    Ok(())
}

fn init_logging(config: &Config, verbose: bool) -> Result<()> {
    let path = config.log_file_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    WriteLogger::init(level, LogConfig::default(), log_file)?;
    Ok(())
}

fn run_main_app(verbose: bool) -> Result<()> {
    let config = Config::load().map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    init_logging(&config, verbose)?;

    let store = open_store(&config)?;
    info!("opened {} notes from {}", store.count(), store.path().display());

    let loader = Loader::spawn(store)?;
    let mut app = App::new(loader, AppSettings::from(&config)).with_feedback(Box::new(TerminalBell));
    app.start();

    run_tui(&mut app)?;

    Ok(())
}

fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(app.poll_timeout(Instant::now()))? {
            app.handle_event(event::read()?, Instant::now())?;
            if app.should_quit {
                break;
            }
        }
        app.tick(Instant::now());
    }
    Ok(())
}

fn print_completions<G: Generator>(generator: G, cmd: &mut Command) {
    generate(generator, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_arguments_parse() {
        let cli = Cli::try_parse_from(["edgenote", "edit", "3", "--title", "New", "--slug", "", "--public", "false"]).unwrap();
        match cli.command {
            Some(Commands::Edit { id, title, slug, content, public }) => {
                assert_eq!(id, 3);
                assert_eq!(title.as_deref(), Some("New"));
                assert_eq!(slug.as_deref(), Some(""));
                assert_eq!(content, None);
                assert_eq!(public, Some(false));
            }
            _ => panic!("expected the edit subcommand"),
        }

        assert!(Cli::try_parse_from(["edgenote", "edit", "abc"]).is_err());
    }
}
