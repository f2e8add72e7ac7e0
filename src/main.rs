use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use thiserror::Error;

use refgen::core::config::{self, CliOverrides, DEFAULT_LOG_LEVEL, ResolvedConfig};
use refgen::core::model::{ModelError, RecordModel};
use refgen::core::state::App;
use refgen::export::{Exporter, JinjaRenderer, OpenWithCommand};
use refgen::store::{SqliteStore, StoreError};
use refgen::tui;

const LOG_FILE: &str = "refgen.log";

#[derive(Parser)]
#[command(name = "refgen", about = "Keep reference letters and render them from a template")]
struct Args {
    /// SQLite database holding the references
    #[arg(long)]
    db: Option<PathBuf>,

    /// Letter template (Jinja syntax)
    #[arg(long)]
    template: Option<PathBuf>,

    /// Directory generated letters are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum StartupError {
    #[error("couldn't open record store at {}: {source}", path.display())]
    Store { path: PathBuf, source: StoreError },

    #[error("couldn't load references: {0}")]
    Load(#[from] ModelError),
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Logging starts before config so first-run messages are kept; the
    // configured level is applied once config is resolved.
    init_logging(Path::new(LOG_FILE));

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("refgen: {e}");
            return ExitCode::FAILURE;
        }
    };
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            database: args.db,
            template: args.template,
            output_dir: args.output_dir,
        },
    );

    log::set_max_level(resolved.log_level);
    log::info!("refgen starting up with database {}", resolved.database.display());

    let app = match build_app(&resolved) {
        Ok(app) => app,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("refgen: {e}");
            return ExitCode::FAILURE;
        }
    };

    match tui::run(app) {
        Ok(()) => {
            log::info!("refgen shut down cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Terminal error: {}", e);
            eprintln!("refgen: terminal error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize file logger - writes to `path`, at the default level until
/// config is resolved.
fn init_logging(path: &Path) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(path) {
        // The logger itself passes everything; `log::set_max_level` does the filtering
        if WriteLogger::init(LevelFilter::Trace, log_config, log_file).is_ok() {
            log::set_max_level(DEFAULT_LOG_LEVEL);
        }
    }
}

/// Open the store and wire the exporter. Any failure here stops startup.
fn build_app(config: &ResolvedConfig) -> Result<App, StartupError> {
    let store = SqliteStore::open(&config.database).map_err(|source| StartupError::Store {
        path: config.database.clone(),
        source,
    })?;
    let model = RecordModel::new(Box::new(store));

    let mut exporter = Exporter::new(config.export.clone(), Box::new(JinjaRenderer::new()));
    if let Some(program) = &config.post_export_command {
        exporter = exporter.with_post_export(Box::new(OpenWithCommand::new(program.clone())));
    }

    Ok(App::new(model, exporter)?)
}
