use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "To-do list manager backed by SQLite")]
#[command(version)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "TODO_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the to-do database
    Init {
        /// Where to create the database (defaults to ~/.<user>_todo.db)
        #[arg(long = "db-path")]
        db_path: Option<PathBuf>,
    },

    /// Add a new to-do
    Add {
        /// Short name
        name: String,
        /// Longer description
        description: String,
        /// Start date, YYYY-MM-DD (defaults to today)
        #[arg(long = "startdate", short = 's')]
        start_date: Option<String>,
        /// Due date, YYYY-MM-DD (defaults to today)
        #[arg(long = "duedate")]
        due_date: Option<String>,
        /// Priority from 1 (low) to 3 (high)
        #[arg(long, short = 'p', default_value_t = 2)]
        priority: i64,
        /// Create already completed (0 or 1)
        #[arg(long, short = 'c', default_value_t = 0)]
        complete: i64,
        /// Create already flagged deleted (0 or 1)
        #[arg(long, short = 'd', default_value_t = 0)]
        deleted: i64,
    },

    /// List to-dos: task_number, priority, due_date, closed_range or overdue
    List {
        /// Selection method
        method: String,
        /// First due date of a closed_range, YYYY-MM-DD
        #[arg(long, short = 's')]
        start: Option<String>,
        /// Last due date of a closed_range, YYYY-MM-DD
        #[arg(long, short = 'e')]
        end: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Mark a to-do as done
    Complete {
        /// To-do ID
        id: i64,
    },

    /// Give a to-do a new name
    Rename {
        /// To-do ID
        id: i64,
        /// New name
        name: String,
    },

    /// Give a to-do a new description
    Redescribe {
        /// To-do ID
        id: i64,
        /// New description
        description: String,
    },

    /// Flag a to-do as deleted, keeping its row
    Remove {
        /// To-do ID
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Delete a to-do row permanently
    Purge {
        /// To-do ID
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Delete every to-do
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_add_defaults() {
        let cli = Cli::try_parse_from(["todo", "add", "Buy milk", "2%"]).unwrap();
        match cli.command {
            Commands::Add {
                name,
                description,
                start_date,
                due_date,
                priority,
                complete,
                deleted,
            } => {
                assert_eq!(name, "Buy milk");
                assert_eq!(description, "2%");
                assert!(start_date.is_none());
                assert!(due_date.is_none());
                assert_eq!(priority, 2);
                assert_eq!(complete, 0);
                assert_eq!(deleted, 0);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_add_short_d_flags_deleted() {
        let cli = Cli::try_parse_from([
            "todo", "add", "a", "b", "-d", "1", "--duedate", "2024-02-01",
        ])
        .unwrap();
        match cli.command {
            Commands::Add {
                deleted, due_date, ..
            } => {
                assert_eq!(deleted, 1);
                assert_eq!(due_date.as_deref(), Some("2024-02-01"));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_list_with_range() {
        let cli = Cli::try_parse_from([
            "todo",
            "--config",
            "/tmp/c.ini",
            "list",
            "closed_range",
            "--start",
            "2024-01-01",
            "-e",
            "2024-01-31",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.ini")));
        match cli.command {
            Commands::List {
                method, start, end, ..
            } => {
                assert_eq!(method, "closed_range");
                assert_eq!(start.as_deref(), Some("2024-01-01"));
                assert_eq!(end.as_deref(), Some("2024-01-31"));
            }
            _ => panic!("expected list"),
        }
    }
}
