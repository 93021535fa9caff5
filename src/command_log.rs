use crate::race::{RaceCommand, RaceState};
use serde::{Deserialize, Serialize};

/// A UI command together with what the controller made of it
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggedCommand {
    /// Milliseconds since the log was created
    pub timestamp_ms: u64,
    pub command: RaceCommand,
    /// State the race was in when the command arrived
    pub state_before: RaceState,
    pub accepted: bool,
}

/// In-memory record of every command sent to the race controller
pub struct CommandLog {
    origin: f64,
    commands: Vec<LoggedCommand>,
}

impl CommandLog {
    /// `origin` is the clock reading (seconds) that timestamps are measured from
    pub fn new(origin: f64) -> Self {
        CommandLog {
            origin,
            commands: Vec::new(),
        }
    }

    pub fn record(&mut self, now: f64, command: RaceCommand, state_before: RaceState, accepted: bool) {
        let timestamp_ms = ((now - self.origin).max(0.0) * 1000.0) as u64;

        if accepted {
            log::debug!("[{:6}ms] {:?} accepted in {}", timestamp_ms, command, state_before);
        } else {
            log::debug!("[{:6}ms] {:?} ignored in {}", timestamp_ms, command, state_before);
        }

        self.commands.push(LoggedCommand {
            timestamp_ms,
            command,
            state_before,
            accepted,
        });
    }

    pub fn get_commands(&self) -> &[LoggedCommand] {
        &self.commands
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.commands)
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        let count = |cmd: RaceCommand| {
            self.commands
                .iter()
                .filter(|c| c.accepted && c.command == cmd)
                .count()
        };
        let ignored = self.commands.iter().filter(|c| !c.accepted).count();

        let duration = self.commands.last().map(|c| c.timestamp_ms).unwrap_or(0);

        format!(
            "Session Duration: {}ms\n\
             Total Commands: {} ({} ignored)\n\
             Races Started: {}, Restarts: {}\n\
             New Maps: {}, New Cherries: {}",
            duration,
            self.commands.len(),
            ignored,
            count(RaceCommand::Start),
            count(RaceCommand::Restart),
            count(RaceCommand::GenerateNewMap),
            count(RaceCommand::GenerateNewCherry),
        )
    }
}
