pub mod cli;
pub mod cli_handlers;
pub mod config;
pub mod db;
pub mod error;
pub mod loader;
pub mod menu;
pub mod models;
pub mod selection;
pub mod social;
pub mod todo;

pub use error::{Error, Result};
pub use models::*;
