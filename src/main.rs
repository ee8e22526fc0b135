use clap::Parser;
use color_eyre::Result;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use taskdeck::cli::{self, Cli, CliError, Commands, EditArgs};
use taskdeck::{Config, FilterSpec, Profile, StoreError, StoreOptions, SystemClock, TaskStore, logging, storage, utils};

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from_path(&utils::expand_path(path), profile)?,
        None => Config::load_with_profile(profile)?,
    };

    // The UI owns the terminal, so logs only ever go to the file
    if let Err(e) = logging::init(&config.get_log_path(), &config.log_filter) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let storage_path: PathBuf = config.get_storage_path();
    let storage = storage::open_or_memory(&storage_path);
    let mut store = TaskStore::open(
        storage,
        Box::new(SystemClock),
        StoreOptions {
            seed_demo_tasks: config.seed_demo_tasks,
        },
    );
    info!(profile = ?profile, storage = %storage_path.display(), "starting");

    let command = cli.command.unwrap_or(Commands::Tui);
    if let Commands::Tui = command {
        let app = taskdeck::tui::App::new(config, store);
        taskdeck::tui::run_event_loop(app)?;
        return Ok(ExitCode::SUCCESS);
    }

    match run_command(command, &config, &mut store) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(CliError::StoreError(StoreError::Validation(errors))) => {
            for (field, message) in errors.iter() {
                eprintln!("{}: {}", field, message);
            }
            Ok(ExitCode::FAILURE)
        }
        Err(CliError::StoreError(e @ StoreError::NotFound(_))) => {
            eprintln!("{}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn run_command(command: Commands, config: &Config, store: &mut TaskStore) -> Result<(), CliError> {
    let mut out = io::stdout().lock();
    match command {
        Commands::Tui => Ok(()),
        Commands::Add {
            title,
            description,
            priority,
            due,
        } => cli::handle_add(store, title, description, priority, due, &mut out),
        Commands::List {
            status,
            priority,
            query,
            json,
        } => cli::handle_list(store, &FilterSpec::new(status, priority, query), json, &mut out),
        Commands::Edit {
            id,
            title,
            description,
            priority,
            due,
            clear_due,
            completed,
        } => {
            let args = EditArgs {
                title,
                description,
                priority,
                due,
                clear_due,
                completed,
            };
            cli::handle_edit(store, &id, args, &mut out)
        }
        Commands::Toggle { id } => cli::handle_toggle(store, &id, &mut out),
        Commands::Delete { id } => cli::handle_delete(store, &id, &mut out),
        Commands::Theme { mode } => cli::handle_theme(store.storage(), config.default_theme, mode, &mut out),
    }
}
