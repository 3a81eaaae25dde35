//! Built-in system actions.

use async_trait::async_trait;
use router_types::ActionSettings;
use sysinfo::{MemoryRefreshKind, RefreshKind, System};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::action::{Action, ActionError, ActionOutput};
use crate::registry::ActionRegistry;

/// Register the four built-in actions with their catalog descriptions.
pub fn builtin_registry(settings: &ActionSettings) -> Result<ActionRegistry, ActionError> {
    if settings.shell_command.is_none() {
        warn!("No actions.shell_command configured; run_shell_command will refuse to run");
    }

    ActionRegistry::new()
        .with(
            "open_calculator",
            "Open the calculator application on the system.",
            OpenCalculator,
        )?
        .with(
            "open_chrome",
            "Open Google Chrome to the home page.",
            OpenBrowser::new(settings.browser_url.clone()),
        )?
        .with(
            "check_ram_usage",
            "Check the system RAM usage and return it as a percentage.",
            CheckRamUsage,
        )?
        .with(
            "run_shell_command",
            "Run a provided shell command and return its output.",
            RunShellCommand::new(settings.shell_command.clone()),
        )
}

/// Start `program` without waiting for it to exit.
fn spawn_detached(program: &str, args: &[&str]) -> Result<(), ActionError> {
    debug!(program, ?args, "Spawning process");
    Command::new(program)
        .args(args)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|source| ActionError::Launch {
            program: program.to_string(),
            source,
        })
}

/// Launches the platform calculator.
pub struct OpenCalculator;

impl OpenCalculator {
    fn command() -> (&'static str, &'static [&'static str]) {
        if cfg!(target_os = "windows") {
            ("calc", &[])
        } else if cfg!(target_os = "macos") {
            ("open", &["-a", "Calculator"])
        } else {
            ("gnome-calculator", &[])
        }
    }
}

#[async_trait]
impl Action for OpenCalculator {
    async fn execute(&self) -> Result<ActionOutput, ActionError> {
        let (program, args) = Self::command();
        spawn_detached(program, args)?;
        Ok(ActionOutput::empty())
    }
}

/// Opens a URL with the platform's default handler.
pub struct OpenBrowser {
    url: String,
}

impl OpenBrowser {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    fn command(&self) -> (&'static str, Vec<&str>) {
        if cfg!(target_os = "windows") {
            ("cmd", vec!["/C", "start", "", self.url.as_str()])
        } else if cfg!(target_os = "macos") {
            ("open", vec![self.url.as_str()])
        } else {
            ("xdg-open", vec![self.url.as_str()])
        }
    }
}

#[async_trait]
impl Action for OpenBrowser {
    async fn execute(&self) -> Result<ActionOutput, ActionError> {
        let (program, args) = self.command();
        spawn_detached(program, &args)?;
        Ok(ActionOutput::empty())
    }
}

/// Reports used memory as a percentage of total.
pub struct CheckRamUsage;

/// Used/total as a percentage; 0 when total is unknown.
pub(crate) fn usage_percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    used as f64 / total as f64 * 100.0
}

#[async_trait]
impl Action for CheckRamUsage {
    async fn execute(&self) -> Result<ActionOutput, ActionError> {
        let mut system = System::new_with_specifics(
            RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()),
        );
        system.refresh_memory();

        let percent = usage_percent(system.used_memory(), system.total_memory());
        Ok(ActionOutput::text(format!("RAM Usage: {:.1}%", percent)))
    }
}

/// Runs a fixed shell command and returns its trimmed stdout.
pub struct RunShellCommand {
    command: Option<String>,
}

impl RunShellCommand {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl Action for RunShellCommand {
    async fn execute(&self) -> Result<ActionOutput, ActionError> {
        let command = self
            .command
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ActionError::NotConfigured("actions.shell_command".to_string()))?;

        let (shell, flag) = if cfg!(target_os = "windows") {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };

        let output = Command::new(shell)
            .arg(flag)
            .arg(command)
            .output()
            .await
            .map_err(|source| ActionError::Launch {
                program: shell.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(ActionError::Command {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(ActionOutput::text(
            String::from_utf8_lossy(&output.stdout).trim().to_string(),
        ))
    }
}
