//! `mpc` backend: drives an MPD server through its command-line client.
//!
//! Each operation runs one `mpc` process and waits for it. Output is logged at
//! debug level; a non-zero exit status becomes [`PlayerError::CommandFailed`].

use std::process::Command;

use super::{PlayerBackend, PlayerError, PlayerStatus, parse_status};

pub struct MpcBackend {
    program: String,
    host: Option<String>,
}

impl MpcBackend {
    pub fn new(program: impl Into<String>, host: Option<String>) -> Self {
        Self {
            program: program.into(),
            host,
        }
    }

    /// Full argument list for one invocation, including `--host` when set.
    fn arguments(&self, args: &[&str]) -> Vec<String> {
        let mut full = Vec::with_capacity(args.len() + 2);
        if let Some(host) = &self.host {
            full.push("--host".to_string());
            full.push(host.clone());
        }
        full.extend(args.iter().map(|arg| arg.to_string()));
        full
    }

    fn run(&self, args: &[&str]) -> Result<String, PlayerError> {
        let arguments = self.arguments(args);
        let command_line = format!("{} {}", self.program, arguments.join(" "));
        log_debug!("command: {command_line}");

        let output = Command::new(&self.program)
            .args(&arguments)
            .output()
            .map_err(|source| PlayerError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(PlayerError::CommandFailed {
                command: command_line,
                status: output.status.to_string(),
                output: text.trim().to_string(),
            });
        }

        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            log_debug!("  {line}");
        }
        Ok(text)
    }
}

/// `mpc volume` argument for a relative change, or `None` for zero.
fn volume_delta_argument(delta: i32) -> Option<String> {
    match delta {
        0 => None,
        d if d > 0 => Some(format!("+{d}")),
        d => Some(d.to_string()),
    }
}

impl PlayerBackend for MpcBackend {
    fn play(&mut self) -> Result<(), PlayerError> {
        self.run(&["play"]).map(drop)
    }

    fn stop(&mut self) -> Result<(), PlayerError> {
        self.run(&["stop"]).map(drop)
    }

    fn toggle_playback(&mut self) -> Result<(), PlayerError> {
        self.run(&["toggle"]).map(drop)
    }

    fn set_volume(&mut self, volume: u8) -> Result<(), PlayerError> {
        self.run(&["volume", &volume.to_string()]).map(drop)
    }

    fn adjust_volume(&mut self, delta: i32) -> Result<(), PlayerError> {
        match volume_delta_argument(delta) {
            Some(argument) => self.run(&["volume", &argument]).map(drop),
            None => Ok(()),
        }
    }

    fn clear_playlist(&mut self) -> Result<(), PlayerError> {
        self.run(&["clear"]).map(drop)
    }

    fn enqueue_track(&mut self, uri: &str) -> Result<(), PlayerError> {
        self.run(&["add", uri]).map(drop)
    }

    fn query_status(&mut self) -> Result<PlayerStatus, PlayerError> {
        let output = self.run(&["status"])?;
        parse_status(&output)
    }

    fn backend_name(&self) -> &'static str {
        "mpc"
    }
}
