// mgnl-workspace-copy/src/restore/db_restore.rs
use std::path::Path;
use tracing::info;

use crate::config::ConnectionParams;
use crate::errors::Result;
use crate::utils::executor::{Executor, Invocation};
use crate::utils::{BIN_PATH_PATTERN, resolve_path};

/// Loader jobs pg_restore runs in parallel for one table.
pub const RESTORE_JOBS: u32 = 10;

/// Builds the data-only, single-table pg_restore invocation.
pub fn pg_restore_invocation(
    connection: &ConnectionParams,
    table: &str,
    dump_path: &Path,
) -> Invocation {
    Invocation::new(resolve_path(BIN_PATH_PATTERN, &connection.pg_version, "pg_restore"))
        .args(["--verbose", "--data-only"])
        .args(connection.client_args())
        .args(["-t", table])
        .args(["--jobs".to_string(), RESTORE_JOBS.to_string()])
        .arg(dump_path.to_string_lossy())
        .env("PGPASSWORD", connection.password.clone())
}

/// Loads the rows of `table` from the dump file.
///
/// Assumes the table is present in the dump; pg_restore decides otherwise.
pub async fn restore_table<E: Executor>(
    executor: &E,
    connection: &ConnectionParams,
    table: &str,
    dump_path: &Path,
) -> Result<()> {
    info!(table, dump = %dump_path.display(), "restore data from dump file");
    executor
        .run(&pg_restore_invocation(connection, table, dump_path))
        .await
}
