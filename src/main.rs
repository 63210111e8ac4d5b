use std::fs;
use std::io::{self, Write};
use std::path::Path;

use clap::Parser;
use serde::Serialize;

use wordy::{
    cli::{Cli, Commands, FavoritesAction, OutputFormat},
    decoder::CommandDecoder,
    error::{ExitCode, Result, WordyError},
    health::{self, StoreHealth},
    manager::DictionaryManager,
    scanner::{ScanRecord, ScanStatus},
    search::{self, SearchConfig},
};

type Manager = DictionaryManager<CommandDecoder>;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Initialize structured logging (respects RUST_LOG env var)
    // Default: WARN level (only errors and warnings)
    // Quiet flag (-q/--quiet) disables all logging output
    if !cli.quiet {
        tracing_subscriber::fmt()
            .with_target(false)
            .with_level(true)
            .with_writer(std::io::stderr) // stdout carries command output
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    }

    let db_path = match cli.db_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::error!(error = %e, "Failed to resolve store path");
            return ExitCode::NoInput.into();
        }
    };

    // Status is read-only and must not create a store
    if !cli.writes_store() {
        return run_status(&db_path, cli.format).unwrap_or_else(|e| report(&e)).into();
    }

    let manager = match open_manager(&cli, &db_path) {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, db_path = %db_path.display(), "Failed to open store");
            return ExitCode::from(&e).into();
        }
    };

    let result = match &cli.command {
        Commands::Import { file } => run_import(&manager, file, cli.format),
        Commands::Scan { directory } => run_scan(&manager, directory, cli.format),
        Commands::List => run_list(&manager, cli.format),
        Commands::Delete { dictionary } => run_delete(&manager, dictionary, cli.format),
        Commands::Search { dictionary, query, limit, no_history } => {
            run_search(&manager, dictionary, &query.join(" "), *limit, !*no_history)
        }
        Commands::Suggest { dictionary, prefix, limit } => run_suggest(&manager, dictionary, prefix, *limit),
        Commands::History { limit, clear } => run_history(&manager, *limit, *clear, cli.format),
        Commands::Favorites { action } => run_favorites(&manager, action, cli.format),
        Commands::Status => Ok(ExitCode::Ok),
    };

    result.unwrap_or_else(|e| report(&e)).into()
}

/// Log a failed command and map it to an exit code.
fn report(error: &WordyError) -> ExitCode {
    tracing::error!(error = %error, "Command failed");
    ExitCode::from(error)
}

fn open_manager(cli: &Cli, db_path: &Path) -> Result<Manager> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let decoder = cli.command_decoder()?;
    let manager = DictionaryManager::open(db_path, cli.pragma_config(), decoder)?;
    Ok(manager.with_search_config(SearchConfig { format: cli.format, ..SearchConfig::default() }))
}

fn write_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    let json = serde_json::to_string_pretty(value)?;
    writeln!(out, "{json}")?;
    Ok(())
}

/// Resolve a `<DICT>` argument and make it the active dictionary.
fn activate(manager: &Manager, reference: &str) -> Result<i64> {
    let id = manager
        .resolve(reference)?
        .ok_or_else(|| WordyError::UnknownDictionary { reference: reference.to_string() })?;
    manager.set_active(id)?;
    Ok(id)
}

fn run_import(manager: &Manager, file: &Path, format: OutputFormat) -> Result<ExitCode> {
    let outcome = manager.import(file)?;
    match format {
        OutputFormat::Plain => writeln!(io::stdout().lock(), "{}", outcome.message)?,
        OutputFormat::Json => write_json(&outcome)?,
    }
    Ok(ExitCode::Ok)
}

fn run_scan(manager: &Manager, directory: &Path, format: OutputFormat) -> Result<ExitCode> {
    let records = manager.scan_and_import(directory)?;
    match format {
        OutputFormat::Plain => {
            let mut out = io::stdout().lock();
            for record in &records {
                let file = record.file.as_deref().unwrap_or("-");
                writeln!(out, "{}\t{}\t{}", record.status, file, record.message)?;
            }
        }
        OutputFormat::Json => write_json(&records)?,
    }

    let count = |status: ScanStatus| records.iter().filter(|r| r.status == status).count();
    tracing::info!(
        imported = count(ScanStatus::Success),
        skipped = count(ScanStatus::Skip),
        failed = count(ScanStatus::Error),
        "Scan complete"
    );
    Ok(scan_exit_code(&records))
}

/// Missing directory is an I/O error; any failed file is a data error.
fn scan_exit_code(records: &[ScanRecord]) -> ExitCode {
    let directory_failed = records.iter().any(|r| r.status == ScanStatus::Error && r.file.is_none());
    if directory_failed {
        ExitCode::IoErr
    } else if records.iter().any(|r| r.status == ScanStatus::Error) {
        ExitCode::DataErr
    } else {
        ExitCode::Ok
    }
}

fn run_list(manager: &Manager, format: OutputFormat) -> Result<ExitCode> {
    let dictionaries = manager.list_dictionaries()?;
    match format {
        OutputFormat::Plain => {
            let mut out = io::stdout().lock();
            for dictionary in &dictionaries {
                writeln!(out, "{}\t{}\t{}", dictionary.id, dictionary.name, dictionary.word_count)?;
            }
        }
        OutputFormat::Json => write_json(&dictionaries)?,
    }
    Ok(ExitCode::Ok)
}

fn run_delete(manager: &Manager, reference: &str, format: OutputFormat) -> Result<ExitCode> {
    let id = manager
        .resolve(reference)?
        .ok_or_else(|| WordyError::UnknownDictionary { reference: reference.to_string() })?;
    let info = manager.dictionary_info(id)?;
    let deleted = manager.delete_dictionary(id)?;
    let name = info.map(|i| i.name).unwrap_or_else(|| id.to_string());

    match format {
        OutputFormat::Plain => {
            if deleted {
                writeln!(io::stdout().lock(), "Deleted '{name}'")?;
            }
        }
        OutputFormat::Json => {
            write_json(&serde_json::json!({ "id": id, "name": name, "deleted": deleted }))?;
        }
    }
    Ok(if deleted { ExitCode::Ok } else { ExitCode::DataErr })
}

fn run_search(manager: &Manager, reference: &str, query: &str, limit: u32, record: bool) -> Result<ExitCode> {
    activate(manager, reference)?;
    let results = manager.search_limited(query, limit)?;
    if record {
        manager.record_search(query)?;
    }
    search::format_results(manager.search_config().format, query, &results, &mut io::stdout().lock())?;
    Ok(ExitCode::Ok)
}

fn run_suggest(manager: &Manager, reference: &str, prefix: &str, limit: u32) -> Result<ExitCode> {
    activate(manager, reference)?;
    let words = manager.suggest_limited(prefix, limit)?;
    search::format_suggestions(manager.search_config().format, prefix, &words, &mut io::stdout().lock())?;
    Ok(ExitCode::Ok)
}

fn run_history(manager: &Manager, limit: u32, clear: bool, format: OutputFormat) -> Result<ExitCode> {
    if clear {
        let removed = manager.clear_history()?;
        match format {
            OutputFormat::Plain => writeln!(io::stdout().lock(), "Cleared {removed} history records")?,
            OutputFormat::Json => write_json(&serde_json::json!({ "cleared": removed }))?,
        }
        return Ok(ExitCode::Ok);
    }

    let history = manager.recent_searches(limit)?;
    match format {
        OutputFormat::Plain => {
            let mut out = io::stdout().lock();
            for entry in &history {
                writeln!(out, "{}\t{}", entry.searched_at, entry.query)?;
            }
        }
        OutputFormat::Json => write_json(&history)?,
    }
    Ok(ExitCode::Ok)
}

fn run_favorites(manager: &Manager, action: &FavoritesAction, format: OutputFormat) -> Result<ExitCode> {
    match action {
        FavoritesAction::List { limit } => {
            let favorites = manager.favorites(*limit)?;
            match format {
                OutputFormat::Plain => {
                    let mut out = io::stdout().lock();
                    for favorite in &favorites {
                        let definition = favorite.definition.replace(['\r', '\n'], " ");
                        writeln!(out, "{}\t{}\t{}", favorite.added_at, favorite.word, definition)?;
                    }
                }
                OutputFormat::Json => write_json(&favorites)?,
            }
        }
        FavoritesAction::Add { dictionary, word, definition } => {
            activate(manager, dictionary)?;
            let definition = match definition {
                Some(definition) => definition.clone(),
                None => manager.definition_of(word)?.ok_or_else(|| WordyError::UnknownWord {
                    word: word.clone(),
                    dictionary: dictionary.clone(),
                })?,
            };
            let added = manager.add_favorite(word, &definition)?;
            match format {
                OutputFormat::Plain => {
                    let message =
                        if added { format!("Added '{word}'") } else { format!("'{word}' is already a favorite") };
                    writeln!(io::stdout().lock(), "{message}")?;
                }
                OutputFormat::Json => write_json(&serde_json::json!({ "word": word, "added": added }))?,
            }
        }
        FavoritesAction::Remove { dictionary, word } => {
            activate(manager, dictionary)?;
            let removed = manager.remove_favorite(word)?;
            match format {
                OutputFormat::Plain => {
                    let message =
                        if removed { format!("Removed '{word}'") } else { format!("'{word}' is not a favorite") };
                    writeln!(io::stdout().lock(), "{message}")?;
                }
                OutputFormat::Json => write_json(&serde_json::json!({ "word": word, "removed": removed }))?,
            }
        }
        FavoritesAction::Check { dictionary, word } => {
            activate(manager, dictionary)?;
            let favorite = manager.is_favorite(word)?;
            match format {
                OutputFormat::Plain => writeln!(io::stdout().lock(), "{favorite}")?,
                OutputFormat::Json => write_json(&serde_json::json!({ "word": word, "favorite": favorite }))?,
            }
        }
    }
    Ok(ExitCode::Ok)
}

fn run_status(db_path: &Path, format: OutputFormat) -> Result<ExitCode> {
    let report = health::inspect(db_path);
    match format {
        OutputFormat::Plain => {
            let mut out = io::stdout().lock();
            writeln!(out, "store:        {}", report.path)?;
            writeln!(out, "health:       {:?}", report.health)?;
            writeln!(out, "dictionaries: {}", report.dictionaries)?;
            writeln!(out, "entries:      {}", report.entries)?;
            writeln!(out, "history:      {}", report.history)?;
            writeln!(out, "favorites:    {}", report.favorites)?;
            if let Some(mode) = &report.journal_mode {
                writeln!(out, "journal mode: {mode}")?;
            }
            for missing in &report.missing_objects {
                writeln!(out, "missing:      {missing}")?;
            }
        }
        OutputFormat::Json => write_json(&report)?,
    }

    Ok(match report.health {
        StoreHealth::WrongApplicationId | StoreHealth::SchemaInvalid => ExitCode::DataErr,
        StoreHealth::Unreadable => ExitCode::NoPerm,
        _ => ExitCode::Ok,
    })
}
