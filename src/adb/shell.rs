use crate::adb::connection::AdbConnection;
use crate::core::types::DeviceId;
use crate::error::{NetlogError, Result};
use log::*;
use std::time::Duration;

const EXIT_CODE_MARKER: &str = "EXIT_CODE:";
const SHELL_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Shell command execution over the `shell:` service
pub struct ShellCommand {
    command: String,
    device_id: Option<DeviceId>,
}

impl ShellCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            device_id: None,
        }
    }

    /// Target a specific device
    pub fn with_device(mut self, device_id: DeviceId) -> Self {
        self.device_id = Some(device_id);
        self
    }

    /// Execute the command and return its output and exit code
    pub async fn execute(&self, host: &str, port: u16) -> Result<ShellOutput> {
        let mut conn = AdbConnection::connect(host, port).await?;

        if let Some(device_id) = &self.device_id {
            conn.select_device(device_id)?;
        }

        // The legacy shell service has no exit status, so echo one after the command.
        let shell_cmd = format!("shell:{}; echo {}$?", self.command, EXIT_CODE_MARKER);
        conn.send_command(&shell_cmd)?;
        conn.read_okay()?;

        conn.set_read_timeout(Some(SHELL_READ_TIMEOUT))?;
        let raw = conn.read_to_end()?;
        let output = ShellOutput::parse(&String::from_utf8_lossy(&raw));
        debug!("`{}` exited with {}", self.command, output.exit_code);

        Ok(output)
    }

    /// Execute and fail unless the command exits 0
    pub async fn execute_checked(&self, host: &str, port: u16) -> Result<ShellOutput> {
        let output = self.execute(host, port).await?;
        if !output.success() {
            return Err(NetlogError::Shell(format!(
                "`{}` exited with {}: {}",
                self.command,
                output.exit_code,
                output.stdout.trim()
            )));
        }
        Ok(output)
    }
}

/// Shell command output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    pub stdout: String,
    pub exit_code: i32,
}

impl ShellOutput {
    /// Split raw shell output into text and the trailing exit code marker
    pub fn parse(raw: &str) -> Self {
        let cleaned = raw.replace('\0', "").replace("\r\n", "\n");
        let trimmed = cleaned.trim_end();

        if let Some(pos) = trimmed.rfind(EXIT_CODE_MARKER) {
            let code = trimmed[pos + EXIT_CODE_MARKER.len()..].trim().parse::<i32>();
            if let Ok(exit_code) = code {
                return Self {
                    stdout: trimmed[..pos].trim_end_matches('\n').to_string(),
                    exit_code,
                };
            }
        }

        warn!("Shell output had no exit code marker");
        Self {
            stdout: trimmed.to_string(),
            exit_code: 0,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Quote a string for a POSIX shell
pub fn shell_quote(s: &str) -> String {
    if !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-=:,+@%".contains(c))
    {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', r#"'\''"#))
}
