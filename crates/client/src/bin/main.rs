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

//! Rewind CLI - one-shot commands against a replay service
//!
//! Each invocation opens a session, runs one command and prints the result as JSON.

use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use eyre::{Context, Result};
use rewind_client::{Config, DebugSession, RpcClient};
use rewind_common::{
    logging,
    types::{BreakpointOptions, Frame, Location, PauseReason},
};
use serde::Serialize;

/// Rewind debugger client
#[derive(Debug, Parser)]
#[command(name = "rewind")]
#[command(about = "Command line client for the Rewind time-travel debugger", version)]
struct Args {
    /// Replay service URL (overrides config and REWIND_ORACLE_URL)
    #[arg(long)]
    url: Option<String>,

    /// Config file path (uses ~/.rewind.toml if not specified)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Set a breakpoint or log point, e.g. `app.js:12` or `#source-1:12:4`
    Break {
        /// Location to break at
        location: Location,
        /// Only pause or log when this expression is truthy
        #[arg(long)]
        condition: Option<String>,
        /// Log this expression when the location is hit
        #[arg(long)]
        log: Option<String>,
        /// Do not pause at the location
        #[arg(long)]
        no_pause: bool,
    },
    /// Show the scopes of a paused frame
    Scopes {
        /// Frame id
        #[arg(long)]
        frame: String,
    },
    /// Show inline previews of a paused frame
    Previews {
        /// Frame id
        #[arg(long)]
        frame: String,
        /// Paused location
        #[arg(long)]
        location: Location,
    },
    /// Evaluate an expression in a paused frame
    Eval {
        /// Frame id
        #[arg(long)]
        frame: String,
        /// Expression to evaluate
        expr: String,
    },
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let output = serde_json::to_string_pretty(value).wrap_err("Failed to serialize output")?;
    println!("{output}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to a file so stdout stays valid JSON
    let log_file_path = logging::init_file_only_logging("rewind")?;
    eprintln!("Rewind logs: {}", log_file_path.display());

    let config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load().unwrap_or_default(),
    };
    let url = args.url.clone().unwrap_or_else(|| config.oracle_url());

    tracing::info!("Connecting to replay service at: {}", url);
    let client = Arc::new(RpcClient::new(&url, config.request_timeout())?);
    let mut session = DebugSession::new(client.clone(), client);

    match args.command {
        Command::Break { location, condition, log, no_pause } => {
            let options = BreakpointOptions {
                condition,
                should_pause: !no_pause,
                should_log: log.is_some(),
                log_value: log,
                ..Default::default()
            };
            session
                .set_breakpoint(location, options)
                .await
                .wrap_err("Failed to set breakpoint")?;
            print_json(&session.list_breakpoints())?;
        }
        Command::Scopes { frame } => {
            let frame = Frame::new(frame, Location::default());
            let scopes = session.scopes(&frame).await.wrap_err("Failed to load scopes")?;
            print_json(&scopes)?;
        }
        Command::Previews { frame, location } => {
            if !config.previews.enabled {
                eprintln!("Inline previews are disabled in the config");
                return Ok(());
            }
            let frame = Frame::new(frame, location.clone());
            session.on_paused(PauseReason::default());
            let previews = session
                .inline_previews(&frame, &location)
                .await
                .wrap_err("Failed to compute previews")?;
            print_json(&previews.as_deref())?;
        }
        Command::Eval { frame, expr } => {
            let frame = Frame::new(frame, Location::default());
            let outcome = session.evaluate(&expr, &frame).await.wrap_err("Evaluation failed")?;
            print_json(&outcome)?;
        }
    }

    Ok(())
}
