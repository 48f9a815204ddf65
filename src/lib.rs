//! Commit history tooling: a local exporter (`git-history`) and a cached
//! GitHub activity fetcher (`gh-activity`).

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod presentation;
pub mod utils;

pub use error::{ActivityError, Result};
