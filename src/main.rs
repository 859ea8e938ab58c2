/// Headless session bootstrap.
///
/// Usage: `via-loader [config.json] [page]`
#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    match run_cli() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("via-loader: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

/// Parsed command line.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, PartialEq, Eq)]
struct CliArgs {
    /// Configuration file to load
    config_path: std::path::PathBuf,
    /// 1-based page of images, or the whole list
    page: Option<usize>,
}

/// Parse `[config.json] [page]`, falling back to `default_path` for the config.
#[cfg(not(target_arch = "wasm32"))]
fn parse_args<I>(
    args: I,
    default_path: Option<std::path::PathBuf>,
) -> Result<CliArgs, via_loader::config::ConfigError>
where
    I: IntoIterator<Item = String>,
{
    use via_loader::config::ConfigError;

    let mut args = args.into_iter();

    let config_path = match args.next() {
        Some(path) => std::path::PathBuf::from(path),
        None => default_path.ok_or(ConfigError::NoPath)?,
    };
    let page = match args.next() {
        Some(raw) => Some(
            raw.parse::<usize>()
                .map_err(|e| ConfigError::invalid_value("page", e.to_string()))?,
        ),
        None => None,
    };

    Ok(CliArgs { config_path, page })
}

/// Level in effect before the configuration is read.
#[cfg(not(target_arch = "wasm32"))]
const STARTUP_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;

/// Install the logger. Returns true when `RUST_LOG` controls the level.
#[cfg(not(target_arch = "wasm32"))]
fn init_logging() -> bool {
    let env_override = std::env::var_os("RUST_LOG").is_some();
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Trace)
        .parse_default_env()
        .init();
    if !env_override {
        log::set_max_level(STARTUP_LOG_LEVEL);
    }
    env_override
}

#[cfg(not(target_arch = "wasm32"))]
fn run_cli() -> Result<(), via_loader::LoaderError> {
    use via_loader::catalog::{self, Roster};
    use via_loader::{LoggingEditor, SessionConfig, bootstrap};

    let env_override = init_logging();

    let cli = parse_args(std::env::args().skip(1), SessionConfig::default_path())?;
    let config = SessionConfig::load_from_file(&cli.config_path)?;

    // RUST_LOG overrides the configured level
    if !env_override {
        log::set_max_level(config.log_level.to_level_filter());
    }
    log::info!(
        "Session for {:?} against {} (config {:?})",
        config.annotator,
        config.server.base_url(),
        cli.config_path
    );

    let roster = Roster::new(config.annotators.iter().cloned());
    catalog::ensure_annotator_folders(&config.images_root, &roster)?;

    let mut editor = LoggingEditor;
    let session = bootstrap::run(&config, cli.config_path.parent(), cli.page, &mut editor)?;

    println!(
        "{}: {} image(s) registered, {} in navigation order, showing {}",
        config.annotator,
        session.images().len(),
        session.order().len(),
        session
            .current_image()
            .map_or("nothing", |record| record.filename.as_str())
    );

    Ok(())
}

// WASM builds use the library directly
#[cfg(target_arch = "wasm32")]
fn main() {}
