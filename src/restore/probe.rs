// mgnl-workspace-copy/src/restore/probe.rs
use std::path::PathBuf;
use tracing::info;

use crate::config::ConnectionParams;
use crate::errors::{AppError, Result};
use crate::utils::executor::{Executor, Invocation};
use crate::utils::{BIN_PATH_PATTERN, resolve_path};

/// Result of probing a table with a bounded read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TablePresence {
    Present,
    /// The probe query failed; the table is treated as missing.
    Absent { reason: String },
}

/// Builds a `psql -c <sql>` invocation against the target database.
pub(crate) fn psql_query(psql_path: PathBuf, connection: &ConnectionParams, sql: &str) -> Invocation {
    Invocation::new(psql_path)
        .args(connection.client_args())
        .arg("-c")
        .arg(sql)
        .env("PGPASSWORD", connection.password.clone())
}

fn psql_path(connection: &ConnectionParams) -> PathBuf {
    resolve_path(BIN_PATH_PATTERN, &connection.pg_version, "psql")
}

/// Checks whether `table` can be read.
///
/// This looks only at the exit status of `SELECT ... LIMIT 1`, so any failure
/// (missing table, permissions, unreachable server) reads as absent.
/// Cancellation is the one error passed through.
pub async fn table_exists<E: Executor>(
    executor: &E,
    connection: &ConnectionParams,
    table: &str,
) -> Result<TablePresence> {
    info!(table, "check if table exists");
    let sql = format!("SELECT * from {} LIMIT 1", table);
    match executor.run(&psql_query(psql_path(connection), connection, &sql)).await {
        Ok(()) => Ok(TablePresence::Present),
        Err(e @ AppError::Cancelled(_)) => Err(e),
        Err(e) => Ok(TablePresence::Absent {
            reason: e.to_string(),
        }),
    }
}

/// Empties `table`. Irreversible and not wrapped in a transaction.
pub async fn reset_table<E: Executor>(
    executor: &E,
    connection: &ConnectionParams,
    table: &str,
) -> Result<()> {
    info!(table, "empty data");
    let sql = format!("TRUNCATE TABLE {};", table);
    executor
        .run(&psql_query(psql_path(connection), connection, &sql))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeExecutor, connection, sql_of};

    #[tokio::test]
    async fn test_table_exists_runs_bounded_select() {
        let executor = FakeExecutor::succeeding();
        let presence = table_exists(&executor, &connection(), "pm_website_bundle")
            .await
            .unwrap();

        assert_eq!(presence, TablePresence::Present);
        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].program,
            PathBuf::from("/usr/lib/postgresql/12/bin/psql")
        );
        assert_eq!(
            calls[0].args,
            vec![
                "-h", "author-db", "-p", "5432", "-U", "postgres", "-d", "author", "-c",
                "SELECT * from pm_website_bundle LIMIT 1",
            ]
        );
        assert_eq!(
            calls[0].env,
            vec![("PGPASSWORD".to_string(), "secret".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failed_probe_is_absent_not_error() {
        let executor = FakeExecutor::failing_when(|_| true);
        let presence = table_exists(&executor, &connection(), "pm_tags_bundle")
            .await
            .unwrap();

        assert!(matches!(presence, TablePresence::Absent { reason } if reason.contains("pm_tags_bundle")));
    }

    #[tokio::test]
    async fn test_cancelled_check_is_not_absent() {
        let executor = FakeExecutor::cancelled_when(|_| true);
        let err = table_exists(&executor, &connection(), "pm_tags_bundle")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Cancelled(_)));
    }

    #[tokio::test]
    async fn test_reset_table_truncates_and_escalates() {
        let executor = FakeExecutor::succeeding();
        reset_table(&executor, &connection(), "ds_datastore").await.unwrap();
        assert_eq!(sql_of(&executor.calls()[0]), Some("TRUNCATE TABLE ds_datastore;"));

        let executor = FakeExecutor::failing_when(|_| true);
        assert!(reset_table(&executor, &connection(), "ds_datastore").await.is_err());
    }
}
