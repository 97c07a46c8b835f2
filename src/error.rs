use rusqlite::ErrorCode;
use rusqlite::ffi;
use thiserror::Error;

/// All possible errors raised by the to-do and social repositories
#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Creating database failed: {0}")]
    Schema(#[source] rusqlite::Error),

    #[error("Invalid input: {0}")]
    Parse(String),

    #[error("Invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("{entity} '{key}' already exists")]
    DuplicateKey { entity: &'static str, key: String },

    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    #[error("Unsupported list method '{0}'. Use one of: task_number, priority, due_date, closed_range, overdue")]
    UnsupportedQuery(String),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn task_not_found(id: i64) -> Self {
        Error::NotFound {
            entity: "Task",
            key: id.to_string(),
        }
    }

    /// Map a raw SQLite failure onto the repository taxonomy.
    ///
    /// Uniqueness violations become `DuplicateKey` for `entity`/`key`. Check
    /// constraint failures become `Parse`. Anything else stays a `Db` error.
    pub fn classify(err: rusqlite::Error, entity: &'static str, key: &str) -> Self {
        Self::classify_with_owner(err, entity, key, key)
    }

    /// Like [`Error::classify`], but a foreign key violation is reported as the
    /// owning user `owner` not existing.
    pub fn classify_with_owner(
        err: rusqlite::Error,
        entity: &'static str,
        key: &str,
        owner: &str,
    ) -> Self {
        if let rusqlite::Error::SqliteFailure(ref code, ref msg) = err {
            if code.code == ErrorCode::ConstraintViolation {
                match code.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        return Error::DuplicateKey {
                            entity,
                            key: key.to_string(),
                        };
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                        return Error::NotFound {
                            entity: "User",
                            key: owner.to_string(),
                        };
                    }
                    ffi::SQLITE_CONSTRAINT_CHECK => {
                        return Error::Parse(
                            msg.clone()
                                .unwrap_or_else(|| "check constraint failed".to_string()),
                        );
                    }
                    _ => {}
                }
            }
        }
        Error::Db(err)
    }

    /// True when the error means "nothing was changed because the key exists"
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::DuplicateKey { .. })
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
