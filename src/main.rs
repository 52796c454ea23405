use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use filmlog_server::catalog::SqliteCatalogStore;
use filmlog_server::server::{run_server, RequestsLoggingLevel};
use filmlog_server::user::SqliteUserStore;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite movie catalog database file.
    #[clap(value_parser = parse_path)]
    pub catalog_db: PathBuf,

    /// Path to the SQLite database file to use for user storage.
    #[clap(value_parser = parse_path)]
    pub user_db: PathBuf,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Directory of poster images to be statically served.
    #[clap(long)]
    pub poster_dir_path: Option<String>,

    /// Secret used to sign identity tokens. Falls back to the JWT_SECRET
    /// environment variable.
    #[clap(long)]
    pub jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let jwt_secret = match cli_args.jwt_secret.or_else(|| std::env::var("JWT_SECRET").ok()) {
        Some(secret) if !secret.is_empty() => secret,
        _ => bail!("No token secret configured, pass --jwt-secret or set JWT_SECRET"),
    };

    info!(
        "Opening SQLite catalog database at {:?}...",
        cli_args.catalog_db
    );
    let catalog_store = Arc::new(SqliteCatalogStore::new(&cli_args.catalog_db)?);

    info!("Opening SQLite user database at {:?}...", cli_args.user_db);
    let user_store = Arc::new(SqliteUserStore::new(&cli_args.user_db)?);

    info!("Ready to serve at port {}!", cli_args.port);
    run_server(
        catalog_store,
        user_store,
        cli_args.logging_level,
        cli_args.port,
        cli_args.poster_dir_path,
        jwt_secret,
    )
    .await
}
