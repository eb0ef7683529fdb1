// Rewind - Time-Travel Debugger Client
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Logging configuration for Rewind components
//!
//! Provides centralized logging setup with:
//! - Structured console output
//! - File logging to a temporary directory
//! - Environment variable support (RUST_LOG)

use eyre::{eyre, Result};
use std::{env, fs, path::PathBuf, sync::Once};
use tracing::Level;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, time::LocalTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Initialize logging for Rewind components
///
/// This function sets up:
/// - Colorful, structured console logging with timestamps
/// - Optional file logging to a temporary directory with daily rotation
/// - Environment variable support for log levels (RUST_LOG), INFO by default
///
/// # Arguments
/// * `component_name` - Name of the component (e.g., "rewind")
/// * `enable_file_logging` - Whether to also write logs to a file
pub fn init_logging(component_name: &str, enable_file_logging: bool) -> Result<()> {
    let env_filter = default_filter("info")?;

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(LocalTime::rfc_3339())
        .with_writer(std::io::stderr)
        .with_ansi(true);

    if enable_file_logging {
        let log_dir = create_log_directory(component_name)?;

        let file_appender = rolling::daily(&log_dir, format!("{component_name}.log"));
        let (non_blocking_appender, guard) = non_blocking(file_appender);

        // The guard flushes on drop, which must not happen before process exit
        std::mem::forget(guard);

        let file_layer = fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(LocalTime::rfc_3339())
            .with_ansi(false)
            .with_writer(non_blocking_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer.with_filter(EnvFilter::from_default_env()))
            .try_init()
            .map_err(|e| eyre!("Failed to initialize tracing subscriber: {e}"))?;

        tracing::info!(
            component = component_name,
            log_dir = %log_dir.display(),
            "Logging initialized with console and file output"
        );
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .try_init()
            .map_err(|e| eyre!("Failed to initialize tracing subscriber: {e}"))?;

        tracing::info!(component = component_name, "Logging initialized with console output only");
    }

    Ok(())
}

/// Initialize logging that only writes to a file.
///
/// Used by command line tools whose stdout is machine readable output.
/// Returns the path of the log directory.
pub fn init_file_only_logging(component_name: &str) -> Result<PathBuf> {
    let log_dir = create_log_directory(component_name)?;

    let file_appender = rolling::daily(&log_dir, format!("{component_name}.log"));
    let (non_blocking_appender, guard) = non_blocking(file_appender);
    std::mem::forget(guard);

    tracing_subscriber::fmt()
        .with_env_filter(default_filter("debug")?)
        .with_writer(non_blocking_appender)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| eyre!("Failed to initialize file logging: {e}"))?;

    Ok(log_dir)
}

/// Create log directory in system temp folder
fn create_log_directory(component_name: &str) -> Result<PathBuf> {
    let log_dir = env::temp_dir().join("rewind-logs").join(component_name);
    fs::create_dir_all(&log_dir)?;
    Ok(log_dir)
}

fn default_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| eyre!("Failed to create environment filter: {e}"))
}

/// Initialize simple logging (console only, no fancy formatting)
///
/// This is useful for tests or simple utilities that don't need
/// the full logging setup.
pub fn init_simple_logging(level: Level) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(default_filter(level.as_str())?)
        .with_test_writer()
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| eyre!("Failed to initialize simple logging: {e}"))?;

    Ok(())
}

// Global test logging initialization - ensures logging is only set up once across all tests
static TEST_LOGGING_INIT: Once = Once::new();

/// Safe logging initialization for tests - can be called multiple times without crashing
///
/// Console-only, INFO by default but respects RUST_LOG.
pub fn ensure_test_logging(default_level: Option<Level>) {
    TEST_LOGGING_INIT.call_once(|| {
        // A subscriber may already be installed by another harness; that is fine
        let _ = init_simple_logging(default_level.unwrap_or(Level::INFO));
    });
}
