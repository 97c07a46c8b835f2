//! Users and their status messages.
//!
//! Both collections time each call and log it at info level, which is the
//! only instrumentation the menu front end has.

use crate::db::Store;
use crate::error::{Error, Result};
use crate::models::{Status, User};
use rusqlite::{OptionalExtension, Row, params};
use std::time::Instant;
use tracing::info;

fn timed<T>(op: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let start = Instant::now();
    let result = f();
    info!(
        op,
        ok = result.is_ok(),
        elapsed_secs = start.elapsed().as_secs_f64(),
        "sqlite call finished"
    );
    result
}

fn user_not_found(user_id: &str) -> Error {
    Error::NotFound {
        entity: "User",
        key: user_id.to_string(),
    }
}

fn status_not_found(status_id: &str) -> Error {
    Error::NotFound {
        entity: "Status",
        key: status_id.to_string(),
    }
}

/// Repository over `userstable`
pub struct UserCollection {
    store: Store,
}

impl UserCollection {
    pub fn new(store: Store) -> Self {
        UserCollection { store }
    }

    /// Insert a user. An existing `user_id` yields `DuplicateKey` and leaves
    /// the table untouched.
    pub fn add_user(&self, user: &User) -> Result<()> {
        timed("add_user", || {
            user.validate()?;
            self.store.with_conn(|conn| {
                conn.execute(
                    "INSERT INTO userstable (user_id, user_name, user_last_name, user_email)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        user.user_id,
                        user.user_name,
                        user.user_last_name,
                        user.user_email
                    ],
                )
                .map_err(|e| Error::classify(e, "User", &user.user_id))?;
                Ok(())
            })
        })
    }

    /// Replace name, last name and email of an existing user
    pub fn modify_user(&self, user: &User) -> Result<()> {
        timed("modify_user", || {
            user.validate()?;
            self.store.with_conn(|conn| {
                let changed = conn
                    .execute(
                        "UPDATE userstable
                         SET user_name = ?2, user_last_name = ?3, user_email = ?4
                         WHERE user_id = ?1",
                        params![
                            user.user_id,
                            user.user_name,
                            user.user_last_name,
                            user.user_email
                        ],
                    )
                    .map_err(|e| Error::classify(e, "User", &user.user_id))?;
                if changed == 0 {
                    return Err(user_not_found(&user.user_id));
                }
                Ok(())
            })
        })
    }

    /// Delete a user and, through the foreign key, all of their statuses
    pub fn delete_user(&self, user_id: &str) -> Result<()> {
        timed("delete_user", || {
            self.store.with_conn(|conn| {
                let changed =
                    conn.execute("DELETE FROM userstable WHERE user_id = ?1", [user_id])?;
                if changed == 0 {
                    return Err(user_not_found(user_id));
                }
                Ok(())
            })
        })
    }

    pub fn search_user(&self, user_id: &str) -> Result<User> {
        timed("search_user", || {
            self.store.with_conn(|conn| {
                conn.query_row(
                    "SELECT user_id, user_name, user_last_name, user_email
                     FROM userstable WHERE user_id = ?1",
                    [user_id],
                    user_from_row,
                )
                .optional()?
                .ok_or_else(|| user_not_found(user_id))
            })
        })
    }
}

/// Repository over `statustable`
pub struct StatusCollection {
    store: Store,
}

impl StatusCollection {
    pub fn new(store: Store) -> Self {
        StatusCollection { store }
    }

    /// Insert a status. The owning user must exist and `status_id` must be new.
    pub fn add_status(&self, status: &Status) -> Result<()> {
        timed("add_status", || {
            self.store.with_conn(|conn| {
                conn.execute(
                    "INSERT INTO statustable (status_id, user_id, status_text) VALUES (?1, ?2, ?3)",
                    params![status.status_id, status.user_id, status.status_text],
                )
                .map_err(|e| {
                    Error::classify_with_owner(e, "Status", &status.status_id, &status.user_id)
                })?;
                Ok(())
            })
        })
    }

    /// Reassign the owner and text of an existing status
    pub fn modify_status(&self, status: &Status) -> Result<()> {
        timed("modify_status", || {
            self.store.with_conn(|conn| {
                let changed = conn
                    .execute(
                        "UPDATE statustable SET user_id = ?2, status_text = ?3 WHERE status_id = ?1",
                        params![status.status_id, status.user_id, status.status_text],
                    )
                    .map_err(|e| {
                        Error::classify_with_owner(e, "Status", &status.status_id, &status.user_id)
                    })?;
                if changed == 0 {
                    return Err(status_not_found(&status.status_id));
                }
                Ok(())
            })
        })
    }

    pub fn delete_status(&self, status_id: &str) -> Result<()> {
        timed("delete_status", || {
            self.store.with_conn(|conn| {
                let changed =
                    conn.execute("DELETE FROM statustable WHERE status_id = ?1", [status_id])?;
                if changed == 0 {
                    return Err(status_not_found(status_id));
                }
                Ok(())
            })
        })
    }

    pub fn search_status(&self, status_id: &str) -> Result<Status> {
        timed("search_status", || {
            self.store.with_conn(|conn| {
                conn.query_row(
                    "SELECT s.status_id, s.user_id, s.status_text
                     FROM statustable s
                     JOIN userstable u ON u.user_id = s.user_id
                     WHERE s.status_id = ?1",
                    [status_id],
                    status_from_row,
                )
                .optional()?
                .ok_or_else(|| status_not_found(status_id))
            })
        })
    }

    /// Every status text posted by `user_id`, sorted
    pub fn search_all_status_updates(&self, user_id: &str) -> Result<Vec<String>> {
        timed("search_all_status_updates", || {
            self.store.with_conn(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT status_text FROM statustable WHERE user_id = ?1
                     ORDER BY status_text",
                )?;
                let texts = stmt.query_map([user_id], |row| row.get::<_, String>(0))?;
                texts
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| e.into())
            })
        })
    }

    /// Every status whose text contains `needle`, case-sensitively, sorted
    pub fn filter_status_by_string(&self, needle: &str) -> Result<Vec<Status>> {
        timed("filter_status_by_string", || {
            self.store.with_conn(|conn| {
                // instr() is case-sensitive, LIKE is not
                let mut stmt = conn.prepare(
                    "SELECT status_id, user_id, status_text FROM statustable
                     WHERE instr(status_text, ?1) > 0
                     ORDER BY status_id, user_id, status_text",
                )?;
                let rows = stmt.query_map([needle], status_from_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| e.into())
            })
        })
    }
}

fn user_from_row(row: &Row) -> std::result::Result<User, rusqlite::Error> {
    Ok(User {
        user_id: row.get(0)?,
        user_name: row.get(1)?,
        user_last_name: row.get(2)?,
        user_email: row.get(3)?,
    })
}

fn status_from_row(row: &Row) -> std::result::Result<Status, rusqlite::Error> {
    Ok(Status {
        status_id: row.get(0)?,
        user_id: row.get(1)?,
        status_text: row.get(2)?,
    })
}
