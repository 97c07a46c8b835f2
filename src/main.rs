use clap::Parser;
use colored::Colorize;
use std::process;
use todo::cli::{Cli, Commands};
use todo::cli_handlers;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = cli_handlers::config_file(cli.config).and_then(|config| match cli.command {
        Commands::Init { db_path } => cli_handlers::handle_init(&config, db_path),
        Commands::Add {
            name,
            description,
            start_date,
            due_date,
            priority,
            complete,
            deleted,
        } => cli_handlers::handle_add(
            &config,
            &name,
            &description,
            start_date.as_deref(),
            due_date.as_deref(),
            priority,
            complete,
            deleted,
        ),
        Commands::List {
            method,
            start,
            end,
            json,
        } => cli_handlers::handle_list(&config, &method, start.as_deref(), end.as_deref(), json),
        Commands::Complete { id } => cli_handlers::handle_complete(&config, id),
        Commands::Rename { id, name } => cli_handlers::handle_rename(&config, id, &name),
        Commands::Redescribe { id, description } => {
            cli_handlers::handle_redescribe(&config, id, &description)
        }
        Commands::Remove { id, force } => cli_handlers::handle_remove(&config, id, force),
        Commands::Purge { id, force } => cli_handlers::handle_purge(&config, id, force),
        Commands::Clear { force } => cli_handlers::handle_clear(&config, force),
    });

    if let Err(e) = result {
        eprintln!("{}", format!("Error: {e}").red());
        process::exit(1);
    }
}
