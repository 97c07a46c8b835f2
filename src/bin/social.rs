use anyhow::Context;
use chrono::Local;
use clap::Parser;
use std::io;
use std::path::{Path, PathBuf};
use todo::db::Store;
use todo::menu::Menu;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "social")]
#[command(about = "Interactive menu over a small SQLite social network")]
#[command(version)]
struct Args {
    /// Database file
    #[arg(long, default_value = "twitter.db")]
    db: PathBuf,

    /// Delete the database file before starting
    #[arg(long)]
    fresh: bool,

    /// Directory for the dated `out_<YYYY.MM.DD>.log` file
    #[arg(long = "log-dir", default_value = ".")]
    log_dir: PathBuf,
}

/// Log to stderr (filtered by `RUST_LOG`) and to today's log file at info.
/// Events still buffered are flushed when the returned guard is dropped.
fn init_tracing(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    let file_name = format!("out_{}.log", Local::now().format("%Y.%m.%d"));
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(log_dir)
        .with_context(|| format!("opening log file in {}", log_dir.display()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_filter(EnvFilter::from_default_env()),
        )
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(LevelFilter::INFO),
        )
        .init();
    Ok(guard)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _log_guard = init_tracing(&args.log_dir)?;

    let store = Store::new(&args.db);
    if args.fresh {
        store
            .destroy()
            .with_context(|| format!("removing {}", args.db.display()))?;
        info!(path = %args.db.display(), "starting from an empty database");
    }
    store
        .create_social_schema()
        .with_context(|| format!("creating tables in {}", args.db.display()))?;

    let stdin = io::stdin();
    let mut menu = Menu::new(store, stdin.lock(), io::stdout());
    menu.run()?;
    Ok(())
}
