//! File logging. The terminal belongs to the editor, so events go to a log
//! file in the data directory instead of stderr.

use std::env;
use std::fs::{self, File};

use anyhow::{Context, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::{Paths, LOG_ENV};

/// Install the global subscriber. The filter comes from `RUST_LOG`, then
/// `SEARCH_BOOK_SETS_LOG`, then defaults to info for this crate.
pub fn init(paths: &Paths) -> Result<()> {
    fs::create_dir_all(&paths.data_dir).context("failed to create data directory")?;
    let log_file = File::create(paths.log_file()).context("failed to create log file")?;

    let directives = env::var("RUST_LOG")
        .or_else(|_| env::var(LOG_ENV))
        .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_filter(EnvFilter::new(directives));

    tracing_subscriber::registry()
        .with(file_layer)
        .try_init()
        .context("failed to install log subscriber")
}
