//! The `todo` config file: an INI file whose `[General]` section names the
//! database.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "todo";
const CONFIG_FILE_NAME: &str = "config.ini";

#[derive(Debug, Deserialize)]
struct Settings {
    #[serde(rename = "General", alias = "general")]
    general: General,
}

#[derive(Debug, Deserialize)]
struct General {
    database: PathBuf,
}

/// Location of the config file
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigFile {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `<config dir>/todo/config.ini`
    pub fn default_location() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("cannot determine the user config directory".into()))?;
        Ok(Self::new(dir.join(APP_NAME).join(CONFIG_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write the file, pointing it at `database`
    pub fn init(&self, database: &Path) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    Error::Config(format!("cannot create {}: {e}", parent.display()))
                })?;
            }
        }
        let value = database.to_str().ok_or_else(|| {
            Error::Config(format!("database path {} is not valid UTF-8", database.display()))
        })?;
        let contents = format!("[General]\ndatabase = {}\n", quote_value(value));
        fs::write(&self.path, contents)
            .map_err(|e| Error::Config(format!("cannot write {}: {e}", self.path.display())))?;
        debug!(config = %self.path.display(), database = %database.display(), "wrote config");
        Ok(())
    }

    /// Path of the database named in the `[General]` section
    pub fn database_path(&self) -> Result<PathBuf> {
        if !self.exists() {
            return Err(Error::Config(format!(
                "config file {} not found. Please run \"todo init\"",
                self.path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(self.path.as_path()).format(config::FileFormat::Ini))
            .build()?;
        let settings: Settings = settings.try_deserialize()?;

        if settings.general.database.as_os_str().is_empty() {
            return Err(Error::Config(format!(
                "{} has an empty database entry",
                self.path.display()
            )));
        }
        Ok(settings.general.database)
    }
}

/// Double-quote `value` for the INI reader, which trims bare values and
/// treats `\` as an escape even inside quotes.
fn quote_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\0' => quoted.push_str("\\0"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// `~/.<home dir name>_todo.db`
pub fn default_database_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| Error::Config("cannot determine the home directory".into()))?;
    let stem = home
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(home.join(format!(".{stem}_todo.db")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_then_read() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::new(dir.path().join("nested").join("config.ini"));
        let db = dir.path().join("todo.db");

        config.init(&db).unwrap();
        assert!(config.exists());
        assert_eq!(config.database_path().unwrap(), db);
    }

    #[test]
    fn test_written_file_format() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::new(dir.path().join("config.ini"));
        config.init(Path::new("/tmp/x_todo.db")).unwrap();

        let contents = fs::read_to_string(config.path()).unwrap();
        assert_eq!(contents, "[General]\ndatabase = \"/tmp/x_todo.db\"\n");
    }

    #[test]
    fn test_database_path_round_trips_unchanged() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::new(dir.path().join("config.ini"));

        for db in [
            "/tmp/a\\tb/todo.db",
            "C:\\Users\\ann\\todo.db",
            "/tmp/x y /todo.db ",
            " /tmp/lead.db",
            "/tmp/q\"uote;#.db",
        ] {
            config.init(Path::new(db)).unwrap();
            assert_eq!(config.database_path().unwrap(), PathBuf::from(db));
        }
    }

    #[test]
    fn test_reads_hand_written_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "; comment\n[General]\ndatabase=/data/tasks.db\n").unwrap();

        let config = ConfigFile::new(&path);
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/data/tasks.db")
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::new(dir.path().join("config.ini"));
        assert!(matches!(config.database_path(), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "[General]\nother = 1\n").unwrap();

        let config = ConfigFile::new(&path);
        assert!(matches!(config.database_path(), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_section() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "database = /data/tasks.db\n").unwrap();

        let config = ConfigFile::new(&path);
        assert!(matches!(config.database_path(), Err(Error::Config(_))));
    }

    #[test]
    fn test_default_database_path_shape() {
        if let Ok(path) = default_database_path() {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.starts_with('.'));
            assert!(name.ends_with("_todo.db"));
        }
    }
}
