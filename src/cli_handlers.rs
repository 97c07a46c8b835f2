use crate::config::{ConfigFile, default_database_path};
use crate::db::Store;
use crate::error::{Error, Result};
use crate::models::{NewTask, Task};
use crate::selection::Selection;
use crate::todo::Todoer;
use chrono::{Local, NaiveDate};
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const COLUMNS: [&str; 8] = [
    "ID.  ",
    "| Name         ",
    "| Description                ",
    "| Start Date   ",
    "| Due Date   ",
    "| Priority  ",
    "| Done  ",
    "| Deleted  ",
];

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Resolve the config file from `--config`/`TODO_CONFIG` or the default location
pub fn config_file(path: Option<PathBuf>) -> Result<ConfigFile> {
    match path {
        Some(p) => Ok(ConfigFile::new(p)),
        None => ConfigFile::default_location(),
    }
}

fn open_todoer(config: &ConfigFile) -> Result<Todoer> {
    if !config.exists() {
        return Err(Error::Config(
            "Config file not found. Please, run \"todo init\"".to_string(),
        ));
    }
    let store = Store::new(config.database_path()?);
    if !store.exists() {
        return Err(Error::Config(
            "Database not found. Please, run \"todo init\"".to_string(),
        ));
    }
    Ok(Todoer::new(store))
}

/// Ask a yes/no question on `output`, reading the answer from `input`
pub fn confirm_with<R: BufRead, W: Write>(prompt: &str, input: &mut R, output: &mut W) -> Result<bool> {
    write!(output, "{prompt} [y/N]: ")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn confirm(prompt: &str) -> Result<bool> {
    confirm_with(prompt, &mut io::stdin().lock(), &mut io::stdout())
}

/// Handle the init command
pub fn handle_init(config: &ConfigFile, db_path: Option<PathBuf>) -> Result<()> {
    let db_path = match db_path {
        Some(p) => p,
        None => default_database_path()?,
    };

    config.init(&db_path)?;

    let store = Store::new(&db_path);
    if store.exists() && store.has_table("TASKS")? {
        println!(
            "{}",
            format!("Using existing to-do database {}", db_path.display()).green()
        );
        return Ok(());
    }
    store.create_todo_schema()?;

    println!(
        "{}",
        format!("The to-do database is {}", db_path.display()).green()
    );
    Ok(())
}

/// Handle the add command
#[allow(clippy::too_many_arguments)]
pub fn handle_add(
    config: &ConfigFile,
    name: &str,
    description: &str,
    start_date: Option<&str>,
    due_date: Option<&str>,
    priority: i64,
    complete: i64,
    deleted: i64,
) -> Result<()> {
    let todoer = open_todoer(config)?;
    let today = today().format(crate::models::DATE_FORMAT).to_string();
    let new = NewTask::parse(
        name,
        description,
        start_date.unwrap_or(&today),
        due_date.unwrap_or(&today),
        priority,
        complete,
        deleted,
    )?;

    let task = todoer.add(&new)?;
    println!(
        "{}",
        format!(
            "to-do # {}: \"{}\" was added with priority: {}",
            task.id, task.name, task.priority
        )
        .green()
    );
    Ok(())
}

/// Handle the list command
pub fn handle_list(
    config: &ConfigFile,
    method: &str,
    start: Option<&str>,
    end: Option<&str>,
    json: bool,
) -> Result<()> {
    let selection = Selection::resolve(method, start, end, today())?;
    let todoer = open_todoer(config)?;
    let tasks = todoer.list(selection)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("{}", "There are no tasks in the to-do list yet".red());
        return Ok(());
    }

    let headers: String = COLUMNS.concat();
    let rule = "-".repeat(headers.len());
    println!("{}", "\nto-do list:\n".blue().bold());
    println!("{}", headers.blue().bold());
    println!("{}", rule.blue());
    for task in &tasks {
        println!("{}", format_row(task).blue());
    }
    println!("{}", format!("{rule}\n").blue());
    Ok(())
}

/// One table line, padded to the header column widths
pub fn format_row(task: &Task) -> String {
    let flag = |b: bool| if b { "1" } else { "0" };
    let cells = [
        task.id.to_string(),
        task.name.clone(),
        task.description.clone(),
        task.start_date.to_string(),
        task.due_date.to_string(),
        task.priority.to_string(),
        flag(task.complete).to_string(),
        flag(task.deleted).to_string(),
    ];

    let mut line = format!("{:<w$}", cells[0], w = COLUMNS[0].len());
    let last = cells.len() - 1;
    for (i, cell) in cells.iter().enumerate().skip(1) {
        if i == last {
            line.push_str(&format!("| {cell}"));
        } else {
            line.push_str(&format!("| {:<w$}", cell, w = COLUMNS[i].len() - 2));
        }
    }
    line
}

/// Handle the complete command
pub fn handle_complete(config: &ConfigFile, id: i64) -> Result<()> {
    let todoer = open_todoer(config)?;
    let task = todoer.set_done(id)?;
    println!(
        "{}",
        format!("to-do # {} \"{}\" completed!", task.id, task.description).green()
    );
    Ok(())
}

/// Handle the rename command
pub fn handle_rename(config: &ConfigFile, id: i64, name: &str) -> Result<()> {
    let todoer = open_todoer(config)?;
    let task = todoer.rename(id, name)?;
    println!(
        "{}",
        format!("to-do # {} renamed to \"{}\"", task.id, task.name).green()
    );
    Ok(())
}

/// Handle the redescribe command
pub fn handle_redescribe(config: &ConfigFile, id: i64, description: &str) -> Result<()> {
    let todoer = open_todoer(config)?;
    let task = todoer.redescribe(id, description)?;
    println!(
        "{}",
        format!(
            "to-do # {} description set to \"{}\"",
            task.id, task.description
        )
        .green()
    );
    Ok(())
}

/// Handle the remove command (soft delete)
pub fn handle_remove(config: &ConfigFile, id: i64, force: bool) -> Result<()> {
    let todoer = open_todoer(config)?;
    if !force {
        let task = todoer.get(id)?;
        if !confirm(&format!("Delete to-do # {id}: {}?", task.description))? {
            println!("Operation canceled");
            return Ok(());
        }
    }
    let task = todoer.remove(id)?;
    println!(
        "{}",
        format!("to-do # {id}: '{}' was removed", task.description).green()
    );
    Ok(())
}

/// Handle the purge command (hard delete)
pub fn handle_purge(config: &ConfigFile, id: i64, force: bool) -> Result<()> {
    let todoer = open_todoer(config)?;
    if !force {
        let task = todoer.get(id)?;
        if !confirm(&format!(
            "Permanently delete to-do # {id}: {}?",
            task.description
        ))? {
            println!("Operation canceled");
            return Ok(());
        }
    }
    let task = todoer.purge(id)?;
    println!(
        "{}",
        format!("to-do # {id}: '{}' was purged", task.description).green()
    );
    Ok(())
}

/// Handle the clear command
pub fn handle_clear(config: &ConfigFile, force: bool) -> Result<()> {
    let todoer = open_todoer(config)?;
    if !force && !confirm("Delete all to-dos?")? {
        println!("Operation canceled");
        return Ok(());
    }
    let removed = todoer.remove_all()?;
    println!(
        "{}",
        format!("All to-dos were removed ({removed})").green()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, parse_date};
    use std::io::Cursor;

    fn task() -> Task {
        Task {
            id: 1,
            name: "Buy milk".to_string(),
            description: "2%".to_string(),
            start_date: parse_date("2024-01-01").unwrap(),
            due_date: parse_date("2024-01-05").unwrap(),
            priority: Priority::Low,
            complete: false,
            deleted: true,
        }
    }

    #[test]
    fn test_format_row_aligns_with_headers() {
        let row = format_row(&task());
        assert_eq!(
            row,
            "1    | Buy milk     | 2%                         | 2024-01-01   | 2024-01-05 | 1         | 0     | 1"
        );
        let headers = COLUMNS.concat();
        assert_eq!(row.find("| 2024-01-01"), headers.find("| Start Date"));
    }

    #[test]
    fn test_format_row_long_values_are_not_truncated() {
        let mut t = task();
        t.name = "A name that is far too long for its column".to_string();
        let row = format_row(&t);
        assert!(row.contains("| A name that is far too long for its column| 2%"));
    }

    #[test]
    fn test_confirm_with() {
        let mut out = Vec::new();
        assert!(confirm_with("Sure?", &mut Cursor::new("y\n"), &mut out).unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "Sure? [y/N]: ");

        let mut out = Vec::new();
        assert!(confirm_with("Sure?", &mut Cursor::new("YES\n"), &mut out).unwrap());
        assert!(!confirm_with("Sure?", &mut Cursor::new("n\n"), &mut out).unwrap());
        assert!(!confirm_with("Sure?", &mut Cursor::new(""), &mut out).unwrap());
    }

    #[test]
    fn test_open_todoer_without_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ConfigFile::new(dir.path().join("config.ini"));
        assert!(matches!(open_todoer(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_open_todoer_without_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ConfigFile::new(dir.path().join("config.ini"));
        config.init(&dir.path().join("gone.db")).unwrap();
        assert!(matches!(open_todoer(&config), Err(Error::Config(ref m)) if m.contains("Database not found")));
    }

    #[test]
    fn test_init_reuses_existing_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ConfigFile::new(dir.path().join("config.ini"));
        let db = dir.path().join("todo.db");

        handle_init(&config, Some(db.clone())).unwrap();
        let todoer = open_todoer(&config).unwrap();
        todoer
            .add(&NewTask::new("keep", "me", parse_date("2024-01-01").unwrap()))
            .unwrap();

        handle_init(&config, Some(db)).unwrap();
        let tasks = open_todoer(&config)
            .unwrap()
            .list(Selection::TaskNumber)
            .unwrap();
        assert_eq!(tasks.len(), 1);
    }
}
