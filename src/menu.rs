//! Letter-driven interactive front end for the social network store.

use crate::db::Store;
use crate::error::{Error, Result};
use crate::loader;
use crate::models::{Status, User};
use crate::social::{StatusCollection, UserCollection};
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::warn;

const MENU: &str = "
A: Load user database
B: Load status database
C: Add user
D: Update user
E: Search user
F: Delete user
G: Add status
H: Update status
I: Search status
J: Delete status
K: Search all status updates
L: Filter status by string
Q: Quit

Please enter your choice: ";

enum Flow {
    Continue,
    Quit,
}

pub struct Menu<R, W> {
    store: Store,
    users: UserCollection,
    statuses: StatusCollection,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(store: Store, input: R, output: W) -> Self {
        Menu {
            users: UserCollection::new(store.clone()),
            statuses: StatusCollection::new(store.clone()),
            store,
            input,
            output,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Prompt and read one trimmed line; `None` once input is exhausted
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn say(&mut self, message: impl AsRef<str>) -> Result<()> {
        writeln!(self.output, "{}", message.as_ref())?;
        Ok(())
    }

    /// Show the menu until the user quits or input runs out
    pub fn run(&mut self) -> Result<()> {
        loop {
            let Some(choice) = self.ask(MENU)? else {
                return Ok(());
            };
            let flow = match choice.to_uppercase().as_str() {
                "A" => self.load_users()?,
                "B" => self.load_status_updates()?,
                "C" => self.add_user()?,
                "D" => self.update_user()?,
                "E" => self.search_user()?,
                "F" => self.delete_user()?,
                "G" => self.add_status()?,
                "H" => self.update_status()?,
                "I" => self.search_status()?,
                "J" => self.delete_status()?,
                "K" => self.search_all_status_updates()?,
                "L" => self.filter_status_by_string()?,
                "Q" => Flow::Quit,
                _ => {
                    self.say("Invalid option")?;
                    Flow::Continue
                }
            };
            if let Flow::Quit = flow {
                return Ok(());
            }
        }
    }

    fn ask_filename(&mut self, prompt: &str, default: &str) -> Result<Option<String>> {
        Ok(self
            .ask(&format!("{prompt} [{default}]: "))?
            .map(|name| if name.is_empty() { default.to_string() } else { name }))
    }

    fn load_users(&mut self) -> Result<Flow> {
        let Some(filename) = self.ask_filename("Enter filename of user file", "accounts.csv")?
        else {
            return Ok(Flow::Quit);
        };
        match loader::load_users(&self.store, Path::new(&filename)) {
            Ok(s) => self.say(format!(
                "Loaded {} users, skipped {} existing",
                s.inserted, s.skipped
            ))?,
            Err(e) => {
                warn!(error = %e, file = %filename, "user import failed");
                self.say(format!("An error occurred while loading users: {e}"))?
            }
        }
        Ok(Flow::Continue)
    }

    fn load_status_updates(&mut self) -> Result<Flow> {
        let Some(filename) =
            self.ask_filename("Enter filename for status file", "status_updates.csv")?
        else {
            return Ok(Flow::Quit);
        };
        match loader::load_statuses(&self.store, Path::new(&filename)) {
            Ok(s) => self.say(format!(
                "Loaded {} status updates, skipped {} existing",
                s.inserted, s.skipped
            ))?,
            Err(e) => {
                warn!(error = %e, file = %filename, "status import failed");
                self.say(format!("An error occurred while loading status updates: {e}"))?
            }
        }
        Ok(Flow::Continue)
    }

    fn ask_user(&mut self) -> Result<Option<User>> {
        let Some(user_id) = self.ask("User ID: ")? else {
            return Ok(None);
        };
        let Some(email) = self.ask("User email: ")? else {
            return Ok(None);
        };
        let Some(name) = self.ask("User name: ")? else {
            return Ok(None);
        };
        let Some(last_name) = self.ask("User last name: ")? else {
            return Ok(None);
        };
        Ok(Some(User::new(user_id, email, name, last_name)))
    }

    fn ask_status(&mut self) -> Result<Option<Status>> {
        let Some(user_id) = self.ask("User ID: ")? else {
            return Ok(None);
        };
        let Some(status_id) = self.ask("Status ID: ")? else {
            return Ok(None);
        };
        let Some(text) = self.ask("Status text: ")? else {
            return Ok(None);
        };
        Ok(Some(Status::new(status_id, user_id, text)))
    }

    fn add_user(&mut self) -> Result<Flow> {
        let Some(user) = self.ask_user()? else {
            return Ok(Flow::Quit);
        };
        match self.users.add_user(&user) {
            Ok(()) => self.say("User was successfully added")?,
            Err(e) => self.say(format!("An error occurred while trying to add new user: {e}"))?,
        }
        Ok(Flow::Continue)
    }

    fn update_user(&mut self) -> Result<Flow> {
        let Some(user) = self.ask_user()? else {
            return Ok(Flow::Quit);
        };
        match self.users.modify_user(&user) {
            Ok(()) => self.say("User was successfully updated")?,
            Err(e) => self.say(format!("An error occurred while trying to update user: {e}"))?,
        }
        Ok(Flow::Continue)
    }

    fn search_user(&mut self) -> Result<Flow> {
        let Some(user_id) = self.ask("Enter user ID to search: ")? else {
            return Ok(Flow::Quit);
        };
        match self.users.search_user(&user_id) {
            Ok(user) => {
                self.say(format!("User ID: {}", user.user_id))?;
                self.say(format!("Email: {}", user.user_email))?;
                self.say(format!("Name: {}", user.user_name))?;
                self.say(format!("Last name: {}", user.user_last_name))?;
            }
            Err(Error::NotFound { .. }) => self.say("ERROR: User does not exist")?,
            Err(e) => self.say(format!("An error occurred while searching user: {e}"))?,
        }
        Ok(Flow::Continue)
    }

    fn delete_user(&mut self) -> Result<Flow> {
        let Some(user_id) = self.ask("User ID: ")? else {
            return Ok(Flow::Quit);
        };
        match self.users.delete_user(&user_id) {
            Ok(()) => self.say("User was successfully deleted")?,
            Err(e) => self.say(format!("An error occurred while trying to delete user: {e}"))?,
        }
        Ok(Flow::Continue)
    }

    fn add_status(&mut self) -> Result<Flow> {
        let Some(status) = self.ask_status()? else {
            return Ok(Flow::Quit);
        };
        match self.statuses.add_status(&status) {
            Ok(()) => self.say("New status was successfully added")?,
            Err(e) => self.say(format!(
                "An error occurred while trying to add new status: {e}"
            ))?,
        }
        Ok(Flow::Continue)
    }

    fn update_status(&mut self) -> Result<Flow> {
        let Some(status) = self.ask_status()? else {
            return Ok(Flow::Quit);
        };
        match self.statuses.modify_status(&status) {
            Ok(()) => self.say("Status was successfully updated")?,
            Err(e) => self.say(format!("An error occurred while trying to update status: {e}"))?,
        }
        Ok(Flow::Continue)
    }

    fn search_status(&mut self) -> Result<Flow> {
        let Some(status_id) = self.ask("Enter status ID to search: ")? else {
            return Ok(Flow::Quit);
        };
        match self.statuses.search_status(&status_id) {
            Ok(status) => {
                self.say(format!("User ID: {}", status.user_id))?;
                self.say(format!("Status ID: {}", status.status_id))?;
                self.say(format!("Status text: {}", status.status_text))?;
            }
            Err(Error::NotFound { .. }) => self.say("ERROR: Status does not exist")?,
            Err(e) => self.say(format!("An error occurred while searching status: {e}"))?,
        }
        Ok(Flow::Continue)
    }

    fn delete_status(&mut self) -> Result<Flow> {
        let Some(status_id) = self.ask("Status ID: ")? else {
            return Ok(Flow::Quit);
        };
        match self.statuses.delete_status(&status_id) {
            Ok(()) => self.say("Status was successfully deleted")?,
            Err(e) => self.say(format!("An error occurred while trying to delete status: {e}"))?,
        }
        Ok(Flow::Continue)
    }

    fn search_all_status_updates(&mut self) -> Result<Flow> {
        let Some(user_id) = self.ask("Enter user ID: ")? else {
            return Ok(Flow::Quit);
        };
        match self.statuses.search_all_status_updates(&user_id) {
            Ok(texts) if texts.is_empty() => {
                self.say(format!("No status updates found for {user_id}"))?
            }
            Ok(texts) => {
                self.say(format!("A total of {} status updates found for {user_id}", texts.len()))?;
                for text in texts {
                    self.say(text)?;
                }
            }
            Err(e) => self.say(format!("An error occurred while searching status updates: {e}"))?,
        }
        Ok(Flow::Continue)
    }

    fn filter_status_by_string(&mut self) -> Result<Flow> {
        let Some(needle) = self.ask("Enter the string to search: ")? else {
            return Ok(Flow::Quit);
        };
        match self.statuses.filter_status_by_string(&needle) {
            Ok(found) if found.is_empty() => self.say("No matching status updates")?,
            Ok(found) => {
                for status in found {
                    self.say(format!("{}: {}", status.status_id, status.status_text))?;
                }
            }
            Err(e) => self.say(format!("An error occurred while filtering status updates: {e}"))?,
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn run(store: &Store, script: &str) -> String {
        let mut menu = Menu::new(store.clone(), Cursor::new(script.to_string()), Vec::new());
        menu.run().unwrap();
        String::from_utf8(menu.into_output()).unwrap()
    }

    fn setup() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().join("twitter.db"));
        store.create_social_schema().unwrap();
        (dir, store)
    }

    #[test]
    fn test_add_and_search_user() {
        let (_dir, store) = setup();
        let out = run(
            &store,
            "c\ndave03\ndavid.yuen@gmail.com\nDavid\nYuen\nE\ndave03\nq\n",
        );
        assert!(out.contains("User was successfully added"));
        assert!(out.contains("User ID: dave03"));
        assert!(out.contains("Email: david.yuen@gmail.com"));
        assert!(out.contains("Name: David"));
        assert!(out.contains("Last name: Yuen"));
    }

    #[test]
    fn test_duplicate_user_reports_error() {
        let (_dir, store) = setup();
        let out = run(&store, "C\nu1\na@b.c\nA\nB\nC\nu1\nx@y.z\nX\nY\n");
        assert!(out.contains("User was successfully added"));
        assert!(out.contains("An error occurred while trying to add new user: User 'u1' already exists"));
    }

    #[test]
    fn test_missing_user_and_status() {
        let (_dir, store) = setup();
        let out = run(&store, "E\nnobody\nI\nnothing\nF\nnobody\n");
        assert!(out.contains("ERROR: User does not exist"));
        assert!(out.contains("ERROR: Status does not exist"));
        assert!(out.contains("An error occurred while trying to delete user"));
    }

    #[test]
    fn test_status_flow() {
        let (_dir, store) = setup();
        let script = "\
C\nu1\na@b.c\nAnn\nBee\n\
G\nu1\nu1_001\nHello there\n\
G\nu1\nu1_002\nanother hello\n\
G\nghost\ng_001\nboo\n\
L\nhello\n\
K\nu1\n\
H\nu1\nu1_001\nHello again\n\
I\nu1_001\n\
J\nu1_002\n\
Q\n";
        let out = run(&store, script);
        assert_eq!(out.matches("New status was successfully added").count(), 2);
        assert!(out.contains("An error occurred while trying to add new status: User 'ghost' not found"));
        assert!(out.contains("u1_002: another hello"));
        assert!(!out.contains("u1_001: Hello there"));
        assert!(out.contains("A total of 2 status updates found for u1"));
        assert!(out.contains("Status was successfully updated"));
        assert!(out.contains("Status text: Hello again"));
        assert!(out.contains("Status was successfully deleted"));
    }

    #[test]
    fn test_invalid_option_and_eof() {
        let (_dir, store) = setup();
        let out = run(&store, "Z\n");
        assert!(out.contains("Invalid option"));
        // prompt shown again after the invalid choice, then input ends
        assert_eq!(out.matches("Please enter your choice: ").count(), 2);
    }

    #[test]
    fn test_quit_stops_reading() {
        let (_dir, store) = setup();
        let out = run(&store, "q\nZ\n");
        assert!(!out.contains("Invalid option"));
    }

    #[test]
    fn test_load_from_files() {
        let (dir, store) = setup();
        let accounts = dir.path().join("accounts.csv");
        std::fs::write(&accounts, "USER_ID,NAME,LASTNAME,EMAIL\nu1,Ann,Bee,a@b.c\n").unwrap();
        let statuses = dir.path().join("status_updates.csv");
        std::fs::write(&statuses, "STATUS_ID,USER_ID,STATUS_TEXT\nu1_1,u1,hi\n").unwrap();

        let script = format!("A\n{}\nB\n{}\nA\n{}\n", accounts.display(), statuses.display(), dir.path().join("missing.csv").display());
        let out = run(&store, &script);
        assert!(out.contains("Loaded 1 users, skipped 0 existing"));
        assert!(out.contains("Loaded 1 status updates, skipped 0 existing"));
        assert!(out.contains("An error occurred while loading users"));
    }
}
