//! Bulk import of users and status updates from CSV files.

use crate::db::Store;
use crate::error::{Error, Result};
use crate::models::{ImportSummary, Status, User};
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Statuses are inserted in batches of this size
const STATUS_CHUNK: usize = 100;

// Field names match the lowercased header record
#[derive(Debug, Deserialize)]
struct AccountRow {
    user_id: String,
    name: String,
    #[serde(rename = "lastname")]
    last_name: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct StatusRow {
    status_id: String,
    user_id: String,
    status_text: String,
}

/// Deserialize every row, matching header names case-insensitively
fn read_rows<T, R>(reader: R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers: StringRecord = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    rdr.set_headers(headers);

    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

fn require(value: &str, field: &str, line: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Parse(format!("line {line}: empty {field}")));
    }
    Ok(())
}

/// Import users from a CSV file with `USER_ID,NAME,LASTNAME,EMAIL` columns
pub fn load_users(store: &Store, path: &Path) -> Result<ImportSummary> {
    let file = std::fs::File::open(path)?;
    load_users_from(store, file)
}

/// Import users from any CSV reader.
///
/// Every row is checked before anything is written; an empty field or an
/// over-long name aborts the whole import. Rows whose `user_id` is already
/// stored are skipped.
pub fn load_users_from<R: Read>(store: &Store, reader: R) -> Result<ImportSummary> {
    let start = Instant::now();
    let rows: Vec<AccountRow> = read_rows(reader)?;

    let mut users = Vec::with_capacity(rows.len());
    for (idx, row) in rows.into_iter().enumerate() {
        let line = idx + 2;
        require(&row.user_id, "USER_ID", line)?;
        require(&row.name, "NAME", line)?;
        require(&row.last_name, "LASTNAME", line)?;
        require(&row.email, "EMAIL", line)?;
        let user = User::new(row.user_id, row.email, row.name, row.last_name);
        user.validate()
            .map_err(|e| Error::Parse(format!("line {line}: {e}")))?;
        users.push(user);
    }

    let summary = store.with_transaction(|tx| {
        let mut summary = ImportSummary::default();
        let mut stmt = tx.prepare(
            "INSERT INTO userstable (user_id, user_name, user_last_name, user_email)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for user in &users {
            match stmt.execute((
                &user.user_id,
                &user.user_name,
                &user.user_last_name,
                &user.user_email,
            )) {
                Ok(_) => summary.inserted += 1,
                Err(e) => match Error::classify(e, "User", &user.user_id) {
                    Error::DuplicateKey { key, .. } => {
                        debug!(user_id = %key, "skipping existing user");
                        summary.skipped += 1;
                    }
                    other => return Err(other),
                },
            }
        }
        Ok(summary)
    })?;

    info!(
        inserted = summary.inserted,
        skipped = summary.skipped,
        elapsed_secs = start.elapsed().as_secs_f64(),
        "loaded users"
    );
    Ok(summary)
}

/// Import statuses from a CSV file with `STATUS_ID,USER_ID,STATUS_TEXT` columns
pub fn load_statuses(store: &Store, path: &Path) -> Result<ImportSummary> {
    let file = std::fs::File::open(path)?;
    load_statuses_from(store, file)
}

/// Import statuses from any CSV reader.
///
/// The whole file goes in one transaction, written in chunks. Existing
/// `status_id`s are skipped; a status naming an unknown user rolls everything
/// back.
pub fn load_statuses_from<R: Read>(store: &Store, reader: R) -> Result<ImportSummary> {
    let start = Instant::now();
    let rows: Vec<StatusRow> = read_rows(reader)?;

    let mut statuses = Vec::with_capacity(rows.len());
    for (idx, row) in rows.into_iter().enumerate() {
        let line = idx + 2;
        require(&row.status_id, "STATUS_ID", line)?;
        require(&row.user_id, "USER_ID", line)?;
        require(&row.status_text, "STATUS_TEXT", line)?;
        statuses.push(Status::new(row.status_id, row.user_id, row.status_text));
    }

    let summary = store.with_transaction(|tx| {
        let mut summary = ImportSummary::default();
        for (n, chunk) in statuses.chunks(STATUS_CHUNK).enumerate() {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO statustable (status_id, user_id, status_text) VALUES (?1, ?2, ?3)",
            )?;
            for status in chunk {
                match stmt.execute((&status.status_id, &status.user_id, &status.status_text)) {
                    Ok(_) => summary.inserted += 1,
                    Err(e) => match Error::classify_with_owner(
                        e,
                        "Status",
                        &status.status_id,
                        &status.user_id,
                    ) {
                        Error::DuplicateKey { key, .. } => {
                            debug!(status_id = %key, "skipping existing status");
                            summary.skipped += 1;
                        }
                        other => return Err(other),
                    },
                }
            }
            debug!(chunk = n, rows = chunk.len(), "inserted status chunk");
        }
        Ok(summary)
    })?;

    info!(
        inserted = summary.inserted,
        skipped = summary.skipped,
        elapsed_secs = start.elapsed().as_secs_f64(),
        "loaded statuses"
    );
    Ok(summary)
}
