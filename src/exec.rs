use crate::error::{Result, TaskError};
use tokio::process::Command;
use tracing::debug;

/// Runs an external tool to completion, returning its stdout. A non-zero
/// exit turns into a `TaskError::Command` carrying the captured stderr.
pub async fn run_tool(tool: &str, command: &mut Command) -> Result<String> {
    debug!("Running {}: {:?}", tool, command.as_std());

    let output = command.output().await.map_err(|e| TaskError::Command {
        tool: tool.to_string(),
        status: "spawn failed".to_string(),
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(TaskError::Command {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
