use crate::db::Store;
use crate::error::{Error, Result};
use crate::models::{NewTask, Priority, Task};
use crate::selection::Selection;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use tracing::{debug, info};

const TASK_COLUMNS: &str =
    "ID, NAME, DESCRIPTION, START_DATE, DUE_DATE, PRIORITY, COMPLETE, DELETED";

/// Repository over the `TASKS` table
pub struct Todoer {
    store: Store,
}

impl Todoer {
    pub fn new(store: Store) -> Self {
        Todoer { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Insert a task and return it with its assigned id
    pub fn add(&self, task: &NewTask) -> Result<Task> {
        self.store.with_conn(|conn| {
            conn.execute(
                "INSERT INTO TASKS (NAME, DESCRIPTION, START_DATE, DUE_DATE, PRIORITY, COMPLETE, DELETED)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    task.name,
                    task.description,
                    task.start_date,
                    task.due_date,
                    task.priority.as_i64(),
                    task.complete,
                    task.deleted,
                ],
            )?;
            let id = conn.last_insert_rowid();
            info!(id, name = %task.name, "added task");
            fetch(conn, id)
        })
    }

    pub fn get(&self, id: i64) -> Result<Task> {
        self.store.with_conn(|conn| fetch(conn, id))
    }

    /// All tasks, ordered and filtered by `selection`
    pub fn list(&self, selection: Selection) -> Result<Vec<Task>> {
        let (clauses, values) = selection.clauses();
        let sql = format!("SELECT {TASK_COLUMNS} FROM TASKS {clauses}");
        debug!(method = %selection.method(), "listing tasks");

        self.store.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let tasks = stmt.query_map(params_from_iter(values), task_from_row)?;
            tasks
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| e.into())
        })
    }

    /// Mark a task complete
    pub fn set_done(&self, id: i64) -> Result<Task> {
        self.update(id, "UPDATE TASKS SET COMPLETE = 1 WHERE ID = ?1", params![id])
    }

    pub fn rename(&self, id: i64, name: &str) -> Result<Task> {
        self.update(id, "UPDATE TASKS SET NAME = ?2 WHERE ID = ?1", params![id, name])
    }

    pub fn redescribe(&self, id: i64, description: &str) -> Result<Task> {
        self.update(
            id,
            "UPDATE TASKS SET DESCRIPTION = ?2 WHERE ID = ?1",
            params![id, description],
        )
    }

    /// Soft delete: set the DELETED flag and keep the row
    pub fn remove(&self, id: i64) -> Result<Task> {
        self.update(id, "UPDATE TASKS SET DELETED = 1 WHERE ID = ?1", params![id])
    }

    /// Hard delete: drop the row and return what it held
    pub fn purge(&self, id: i64) -> Result<Task> {
        self.store.with_conn(|conn| {
            let task = fetch(conn, id)?;
            conn.execute("DELETE FROM TASKS WHERE ID = ?1", [id])?;
            info!(id, "purged task");
            Ok(task)
        })
    }

    /// Delete every task, returning how many rows went away
    pub fn remove_all(&self) -> Result<usize> {
        self.store.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM TASKS", [])?;
            info!(removed, "cleared tasks");
            Ok(removed)
        })
    }

    fn update(&self, id: i64, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Task> {
        self.store.with_conn(|conn| {
            let changed = conn.execute(sql, params)?;
            if changed == 0 {
                return Err(Error::task_not_found(id));
            }
            debug!(id, sql, "updated task");
            fetch(conn, id)
        })
    }
}

fn fetch(conn: &Connection, id: i64) -> Result<Task> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM TASKS WHERE ID = ?1"),
        [id],
        task_from_row,
    )
    .optional()?
    .ok_or_else(|| Error::task_not_found(id))
}

fn task_from_row(row: &Row) -> std::result::Result<Task, rusqlite::Error> {
    let priority: i64 = row.get(5)?;
    let priority = Priority::try_from(priority).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Integer,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        )
    })?;

    Ok(Task {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        start_date: row.get(3)?,
        due_date: row.get(4)?,
        priority,
        complete: row.get(6)?,
        deleted: row.get(7)?,
    })
}
