use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used on the command line and in the `TASKS` table
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate {
        input: input.to_string(),
    })
}

/// Task priority, stored as 1..=3 in the PRIORITY column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum Priority {
    Low = 1,
    #[default]
    Medium = 2,
    High = 3,
}

impl Priority {
    pub fn as_i64(&self) -> i64 {
        *self as i64
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

impl TryFrom<i64> for Priority {
    type Error = String;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::Low),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::High),
            _ => Err(format!("priority must be 1, 2 or 3, got {value}")),
        }
    }
}

impl From<Priority> for i64 {
    fn from(p: Priority) -> Self {
        p.as_i64()
    }
}

/// A row of the `TASKS` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub complete: bool,
    pub deleted: bool,
}

/// New task input
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub complete: bool,
    pub deleted: bool,
}

impl NewTask {
    /// Task starting and due on `today` with default priority and flags
    pub fn new(name: impl Into<String>, description: impl Into<String>, today: NaiveDate) -> Self {
        NewTask {
            name: name.into(),
            description: description.into(),
            start_date: today,
            due_date: today,
            priority: Priority::default(),
            complete: false,
            deleted: false,
        }
    }

    /// Build from raw command-line values, parsing the dates and range-checking
    /// the priority and flags.
    pub fn parse(
        name: &str,
        description: &str,
        start_date: &str,
        due_date: &str,
        priority: i64,
        complete: i64,
        deleted: i64,
    ) -> Result<Self> {
        Ok(NewTask {
            name: name.to_string(),
            description: description.to_string(),
            start_date: parse_date(start_date)?,
            due_date: parse_date(due_date)?,
            priority: Priority::try_from(priority).map_err(Error::Parse)?,
            complete: parse_flag("complete", complete)?,
            deleted: parse_flag("deleted", deleted)?,
        })
    }
}

fn parse_flag(field: &str, value: i64) -> Result<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(Error::Parse(format!("{field} must be 0 or 1, got {value}"))),
    }
}

/// A row of `userstable`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub user_name: String,
    pub user_last_name: String,
    pub user_email: String,
}

impl User {
    pub const MAX_ID_LEN: usize = 30;
    pub const MAX_NAME_LEN: usize = 30;
    pub const MAX_LAST_NAME_LEN: usize = 100;

    pub fn new(
        user_id: impl Into<String>,
        user_email: impl Into<String>,
        user_name: impl Into<String>,
        user_last_name: impl Into<String>,
    ) -> Self {
        User {
            user_id: user_id.into(),
            user_name: user_name.into(),
            user_last_name: user_last_name.into(),
            user_email: user_email.into(),
        }
    }

    /// Enforce the column length limits (each strictly below its maximum).
    pub fn validate(&self) -> Result<()> {
        check_len("user_id", &self.user_id, Self::MAX_ID_LEN)?;
        check_len("user_name", &self.user_name, Self::MAX_NAME_LEN)?;
        check_len("user_last_name", &self.user_last_name, Self::MAX_LAST_NAME_LEN)?;
        if self.user_id.is_empty() {
            return Err(Error::Parse("user_id must not be empty".to_string()));
        }
        Ok(())
    }
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len >= max {
        return Err(Error::Parse(format!(
            "{field} must be shorter than {max} characters, got {len}"
        )));
    }
    Ok(())
}

/// A row of `statustable`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Status {
    pub status_id: String,
    pub user_id: String,
    pub status_text: String,
}

impl Status {
    pub fn new(
        status_id: impl Into<String>,
        user_id: impl Into<String>,
        status_text: impl Into<String>,
    ) -> Self {
        Status {
            status_id: status_id.into(),
            user_id: user_id.into(),
            status_text: status_text.into(),
        }
    }
}

/// Outcome of a bulk CSV import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}
