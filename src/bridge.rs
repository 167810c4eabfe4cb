/*
 * This file is part of Fanpanel.
 *
 * Copyright (C) 2025 Fanpanel contributors
 *
 * Fanpanel is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Fanpanel is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Fanpanel. If not, see <https://www.gnu.org/licenses/>.
 */

//! Command bridge to the fancontrol CLI and logger.
//!
//! Requests are executed on worker threads and their completions come back
//! over a channel tagged with the caller's reply token. The UI thread never
//! blocks on a subprocess.

use std::io;
use std::process::{Command, Stdio};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::logger;

/// Body handed to callers when a call fails.
pub const EMPTY_BODY: &str = "[]";

/// Exit status reported when the executable could not be started.
pub const SPAWN_FAILED: i32 = 127;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("command exited with status {status}")]
    Exit { status: i32, output: String },
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which external executable a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Config,
    Logger,
}

/// How to gain privileges for the tools.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Elevation {
    /// Plain execution as root, `sudo -n` otherwise.
    #[default]
    Auto,
    None,
    Sudo,
    Pkexec,
}

impl Elevation {
    pub fn prefix(self, is_root: bool) -> &'static [&'static str] {
        match self {
            Elevation::Auto if is_root => &[],
            Elevation::Auto | Elevation::Sudo => &["sudo", "-n"],
            Elevation::Pkexec => &["pkexec"],
            Elevation::None => &[],
        }
    }
}

/// Exit status plus stdout followed by stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutput {
    pub status: i32,
    pub text: String,
}

#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    fn run(&self, argv: &[String]) -> io::Result<RawOutput>;
}

/// Runs commands on the local system, elevated as configured.
pub struct SystemRunner {
    elevation: Elevation,
    is_root: bool,
}

impl SystemRunner {
    pub fn new(elevation: Elevation) -> Self {
        Self { elevation, is_root: unsafe { libc::geteuid() } == 0 }
    }

    pub fn command_line(&self, argv: &[String]) -> Vec<String> {
        self.elevation
            .prefix(self.is_root)
            .iter()
            .map(|s| s.to_string())
            .chain(argv.iter().cloned())
            .collect()
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String]) -> io::Result<RawOutput> {
        let full = self.command_line(argv);
        let (program, args) = full
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
        let out = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;
        let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&out.stderr));
        Ok(RawOutput { status: out.status.code().unwrap_or(-1), text })
    }
}

/// A call waiting to be executed. `reply` routes the completion back.
#[derive(Debug, Clone, PartialEq)]
pub struct Request<R> {
    pub tool: Tool,
    pub args: Vec<String>,
    pub payload: Option<Map<String, Value>>,
    pub reply: R,
}

impl<R> Request<R> {
    pub fn config<S: AsRef<str>>(reply: R, args: &[S]) -> Self {
        Self::new(Tool::Config, reply, args)
    }

    pub fn logger<S: AsRef<str>>(reply: R, args: &[S]) -> Self {
        Self::new(Tool::Logger, reply, args)
    }

    fn new<S: AsRef<str>>(tool: Tool, reply: R, args: &[S]) -> Self {
        Self {
            tool,
            args: args.iter().map(|a| a.as_ref().to_string()).collect(),
            payload: None,
            reply,
        }
    }

    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Outcome of one call.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion<R> {
    pub tool: Tool,
    pub reply: R,
    /// Panel activation the request was issued from.
    pub origin: u64,
    pub output: String,
    pub status: i32,
    /// Failure text, when the call failed.
    pub error: Option<String>,
}

impl<R> Completion<R> {
    pub fn succeeded(&self) -> bool {
        self.status == 0
    }

    /// Whether this failure has to be shown to the user. Logger failures mean
    /// "not running" and stay silent.
    pub fn needs_alert(&self) -> bool {
        self.tool == Tool::Config && !self.succeeded()
    }

    pub fn alert_text(&self) -> String {
        match self.error.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => format!("Command error: {}", text),
            _ => format!(
                "Command error: command exited with status {}\nPlease check the log file",
                self.status
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub config_cli: String,
    pub logger_cli: String,
}

pub struct Bridge<R> {
    runner: Arc<dyn CommandRunner>,
    paths: ToolPaths,
    tx: Sender<Completion<R>>,
}

impl<R: Send + 'static> Bridge<R> {
    pub fn new(runner: Arc<dyn CommandRunner>, paths: ToolPaths, tx: Sender<Completion<R>>) -> Self {
        Self { runner, paths, tx }
    }

    /// `[command, ...args, json(payload)]`.
    pub fn argv(&self, tool: Tool, args: &[String], payload: Option<&Map<String, Value>>) -> Result<Vec<String>, BridgeError> {
        let command = match tool {
            Tool::Config => &self.paths.config_cli,
            Tool::Logger => &self.paths.logger_cli,
        };
        let mut argv = Vec::with_capacity(args.len() + 2);
        argv.push(command.clone());
        argv.extend(args.iter().cloned());
        if let Some(payload) = payload {
            argv.push(serde_json::to_string(payload)?);
        }
        Ok(argv)
    }

    /// Runs a request on the calling thread.
    pub fn invoke(&self, request: Request<R>, origin: u64) -> Completion<R> {
        let Request { tool, args, payload, reply } = request;
        let result = self
            .argv(tool, &args, payload.as_ref())
            .and_then(|argv| execute(self.runner.as_ref(), &argv));
        match result {
            Ok(text) => Completion { tool, reply, origin, output: text, status: 0, error: None },
            Err(err) => {
                let (status, error) = match &err {
                    BridgeError::Exit { status, output } => {
                        let text = output.trim();
                        (*status, (!text.is_empty()).then(|| text.to_string()))
                    }
                    BridgeError::Spawn { .. } => (SPAWN_FAILED, Some(err.to_string())),
                    BridgeError::Json(_) => (1, Some(err.to_string())),
                };
                logger::log_event(
                    "bridge_failure",
                    json!({
                        "tool": format!("{:?}", tool),
                        "args": args,
                        "status": status,
                        "error": err.to_string(),
                    }),
                );
                Completion {
                    tool,
                    reply,
                    origin,
                    output: EMPTY_BODY.to_string(),
                    status,
                    error,
                }
            }
        }
    }

    /// Runs a request on a worker thread and posts the completion.
    pub fn submit(&self, request: Request<R>, origin: u64) {
        let worker = Bridge {
            runner: Arc::clone(&self.runner),
            paths: self.paths.clone(),
            tx: self.tx.clone(),
        };
        thread::spawn(move || {
            let completion = worker.invoke(request, origin);
            // The receiver is gone only while shutting down.
            let _ = worker.tx.send(completion);
        });
    }
}

fn execute(runner: &dyn CommandRunner, argv: &[String]) -> Result<String, BridgeError> {
    logger::log_event("bridge_invoke", json!({ "argv": argv }));
    let raw = runner.run(argv).map_err(|source| BridgeError::Spawn {
        command: argv.first().cloned().unwrap_or_default(),
        source,
    })?;
    if raw.status != 0 {
        return Err(BridgeError::Exit { status: raw.status, output: raw.text });
    }
    Ok(raw.text)
}
