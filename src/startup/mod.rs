//! Process startup: logging and configuration reporting

mod logger;

pub use logger::{init_logging, StartupLogger};
