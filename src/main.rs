//! repos-publish: commit every pending change of a working tree and push it

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use repos_publish::core::PUBLISHING_MESSAGE;
use repos_publish::publish::{publish, publish_with_deadline, PublishConfig, PublishResult};

const DEFAULT_LOG_FILTER: &str = "repos_publish=info";
const SPINNER_TEMPLATE: &str = "{spinner} {wide_msg}";
const SPINNER_TICK_MS: u64 = 100;

// Exit codes
const EXIT_CLIENT_ERROR: u8 = 2;
const EXIT_SERVER_ERROR: u8 = 1;

#[derive(Parser, Debug)]
#[command(
    name = "repos-publish",
    version,
    about = "Commit all pending changes and push them to the publish branch"
)]
struct Cli {
    /// Working tree to publish [env: REPO_DIR, default: current directory]
    #[arg(long, value_name = "PATH")]
    repo_dir: Option<PathBuf>,

    /// Commit message
    #[arg(short, long, value_name = "MSG")]
    message: Option<String>,

    /// Branch to push [env: PUBLISH_BRANCH, default: dev]
    #[arg(long, value_name = "NAME")]
    branch: Option<String>,

    /// Remote to push through [env: REMOTE_NAME, default: origin]
    #[arg(long, value_name = "NAME")]
    remote: Option<String>,

    /// Abort the whole publish after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Load environment variables from this file instead of ./.env
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let env_loaded = match &cli.env_file {
        Some(path) => dotenvy::from_path(path).map_err(|e| format!("{}: {e}", path.display())),
        None => {
            // A missing ./.env is fine
            let _ = dotenvy::dotenv();
            Ok(())
        }
    };

    init_logging();

    if let Err(e) = env_loaded {
        eprintln!("🔴 cannot load env file {e}");
        return ExitCode::from(EXIT_CLIENT_ERROR);
    }

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("🔴 cannot determine the working tree: {e}");
            return ExitCode::from(EXIT_CLIENT_ERROR);
        }
    };

    let spinner = (!cli.json).then(create_spinner);

    let result = match cli.timeout {
        Some(secs) => publish_with_deadline(config, Duration::from_secs(secs)).await,
        None => publish(config).await,
    };

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("🔴 cannot serialize result: {e}");
                return ExitCode::from(EXIT_SERVER_ERROR);
            }
        }
    } else {
        print_human(&result);
    }

    exit_code(&result)
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Environment first, flags on top; the repository defaults to the current directory
fn build_config(cli: &Cli) -> std::io::Result<PublishConfig> {
    let mut config = PublishConfig::from_env();

    if let Some(repo_dir) = &cli.repo_dir {
        config.repo_dir = Some(repo_dir.clone());
    }
    let repo_dir = match config.repo_dir.take() {
        Some(dir) if dir.is_absolute() => dir,
        Some(dir) => std::env::current_dir()?.join(dir),
        None => std::env::current_dir()?,
    };
    config.repo_dir = Some(repo_dir);

    if cli.branch.is_some() {
        config.branch = cli.branch.clone();
    }
    if cli.remote.is_some() {
        config.remote = cli.remote.clone();
    }
    config.message = cli.message.clone();

    Ok(config)
}

fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
        spinner.set_style(style);
    }
    spinner.set_message(PUBLISHING_MESSAGE);
    spinner.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    spinner
}

fn print_human(result: &PublishResult) {
    let status = result.status();
    println!("{} {} {}", status.symbol(), status.text(), result.message);

    for (i, path) in result.changes.iter().enumerate() {
        let tree_char = if i == result.changes.len() - 1 { "└─" } else { "├─" };
        println!("   {tree_char} {path}");
    }
    for warning in &result.warnings {
        println!("⚠️  {warning}");
    }
}

fn exit_code(result: &PublishResult) -> ExitCode {
    match result.status_code() {
        200 => ExitCode::SUCCESS,
        400..=499 => ExitCode::from(EXIT_CLIENT_ERROR),
        _ => ExitCode::from(EXIT_SERVER_ERROR),
    }
}
