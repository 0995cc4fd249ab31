// Copyright (c) 2026 rezky_nightky

//! Log output. The terminal is owned by the alternate screen, so events are
//! only recorded when a log file is given.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "GLYPHRAIN_LOG";
const DEFAULT_FILTER: &str = "info";

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a global subscriber appending to `path`. Without a path nothing
/// is installed and every `tracing` macro is a no-op.
pub fn init(path: Option<&Path>) -> io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .try_init()
        .map_err(io::Error::other)
}
