// Shared fixtures for unit tests.
use std::sync::Mutex;

use crate::config::ConnectionParams;
use crate::errors::{AppError, Result};
use crate::utils::executor::{Executor, Invocation};

type FailWhen = Box<dyn Fn(&Invocation) -> bool + Send + Sync>;

/// Records every invocation and fails those matching a predicate.
pub struct FakeExecutor {
    calls: Mutex<Vec<Invocation>>,
    fail_when: FailWhen,
    cancel_when: FailWhen,
}

impl FakeExecutor {
    pub fn succeeding() -> Self {
        Self::failing_when(|_| false)
    }

    pub fn failing_when(fail_when: impl Fn(&Invocation) -> bool + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_when: Box::new(fail_when),
            cancel_when: Box::new(|_| false),
        }
    }

    /// Invocations matching `cancel_when` fail as if interrupted.
    pub fn cancelled_when(cancel_when: impl Fn(&Invocation) -> bool + Send + Sync + 'static) -> Self {
        Self {
            cancel_when: Box::new(cancel_when),
            ..Self::succeeding()
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

impl Executor for FakeExecutor {
    async fn run(&self, invocation: &Invocation) -> Result<()> {
        self.calls.lock().unwrap().push(invocation.clone());
        if (self.cancel_when)(invocation) {
            return Err(AppError::Cancelled(invocation.to_string()));
        }
        if (self.fail_when)(invocation) {
            return Err(AppError::Command {
                command: invocation.to_string(),
                status: "exit status: 1".to_string(),
            });
        }
        Ok(())
    }
}

pub fn connection() -> ConnectionParams {
    ConnectionParams {
        pg_version: "12".to_string(),
        host: "author-db".to_string(),
        port: 5432,
        username: "postgres".to_string(),
        password: "secret".to_string(),
        dbname: "author".to_string(),
    }
}

fn arg_after<'a>(invocation: &'a Invocation, flag: &str) -> Option<&'a str> {
    invocation
        .args
        .iter()
        .position(|a| a == flag)
        .and_then(|i| invocation.args.get(i + 1))
        .map(String::as_str)
}

/// SQL passed to psql with `-c`.
pub fn sql_of(invocation: &Invocation) -> Option<&str> {
    arg_after(invocation, "-c")
}

/// Table passed to pg_restore with `-t`.
pub fn restored_table(invocation: &Invocation) -> Option<&str> {
    arg_after(invocation, "-t")
}

pub fn is_pg_restore(invocation: &Invocation) -> bool {
    invocation.program.ends_with("pg_restore")
}
