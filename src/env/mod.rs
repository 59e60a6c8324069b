//! `.env` file parsing for the CLI configuration layer.

pub mod entry;
pub mod parse;

pub use entry::EnvIndex;
pub use parse::{parse_env_file, parse_env_str};
