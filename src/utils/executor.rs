// mgnl-workspace-copy/src/utils/executor.rs
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::errors::{AppError, Result};

/// Working directory for spawned client tools.
pub const COMMAND_WORKING_DIR: &str = "/tmp";

/// A single client tool invocation: program, arguments and extra environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

// Environment values carry credentials and are never printed.
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("program", &self.program)
            .field("args", &self.args)
            .field(
                "env",
                &self.env.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Runs client tool invocations on behalf of the restore logic.
///
/// Only the exit status is observed; output is passed through untouched.
#[allow(async_fn_in_trait)]
pub trait Executor {
    async fn run(&self, invocation: &Invocation) -> Result<()>;
}

/// Spawns real OS processes, one at a time, honouring a cancellation token.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    cancel: CancellationToken,
    working_dir: PathBuf,
}

impl ProcessExecutor {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            working_dir: PathBuf::from(COMMAND_WORKING_DIR),
        }
    }
}

impl Executor for ProcessExecutor {
    async fn run(&self, invocation: &Invocation) -> Result<()> {
        let command = invocation.to_string();
        if self.cancel.is_cancelled() {
            return Err(AppError::Cancelled(command));
        }

        let program = which::which(&invocation.program).map_err(|source| {
            AppError::ToolNotFound {
                path: invocation.program.clone(),
                source,
            }
        })?;

        info!(%command, "running command");
        let mut child = Command::new(program)
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AppError::Spawn {
                command: command.clone(),
                source,
            })?;

        let waited = tokio::select! {
            status = child.wait() => Some(status),
            _ = self.cancel.cancelled() => None,
        };

        let status = match waited {
            Some(status) => status?,
            None => {
                let _ = child.kill().await;
                return Err(AppError::Cancelled(command));
            }
        };

        if !status.success() {
            return Err(AppError::Command {
                command,
                status: status.to_string(),
            });
        }

        info!(%command, "successfully ran command");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_display_hides_environment() {
        let invocation = Invocation::new("/usr/lib/postgresql/12/bin/psql")
            .args(["-h", "db", "-c", "select 1"])
            .env("PGPASSWORD", "hunter2");

        let shown = invocation.to_string();
        assert_eq!(shown, "/usr/lib/postgresql/12/bin/psql -h db -c select 1");
        assert!(!format!("{:?}", invocation).contains("hunter2"));
    }

    #[tokio::test]
    async fn test_missing_program_is_tool_not_found() {
        let executor = ProcessExecutor::new(CancellationToken::new());
        let invocation = Invocation::new("/nonexistent/bin/psql").arg("-c");

        let err = executor.run(&invocation).await.unwrap_err();
        assert!(matches!(err, AppError::ToolNotFound { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_token_skips_spawn() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let executor = ProcessExecutor::new(cancel);

        let err = executor
            .run(&Invocation::new("/nonexistent/bin/pg_restore"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Cancelled(_)));
    }

    #[tokio::test]
    async fn test_running_child_is_killed_on_cancel() {
        let cancel = CancellationToken::new();
        let executor = ProcessExecutor::new(cancel.clone());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            executor.run(&Invocation::new("sleep").arg("30")),
        )
        .await
        .expect("cancelled command should return before the timeout");

        assert!(matches!(result, Err(AppError::Cancelled(command)) if command == "sleep 30"));
    }
}
