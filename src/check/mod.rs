// mgnl-workspace-copy/src/check/mod.rs
use std::path::PathBuf;
use tracing::info;

use crate::config::ConnectionParams;
use crate::errors::Result;
use crate::restore::probe::psql_query;
use crate::utils::executor::Executor;
use crate::utils::{BIN_PATH_PATTERN, resolve_path};

/// psql used when no client version is requested.
pub const DEFAULT_PSQL_PATH: &str = "/usr/local/bin/psql";

/// psql for the connectivity check; an empty version selects the fixed fallback.
pub fn check_psql_path(pg_version: &str) -> PathBuf {
    if pg_version.is_empty() {
        info!("pgversion is not set, use default psql");
        return PathBuf::from(DEFAULT_PSQL_PATH);
    }
    resolve_path(BIN_PATH_PATTERN, pg_version, "psql")
}

/// Confirms the database answers `select 1`.
pub async fn check_connection<E: Executor>(
    connection: &ConnectionParams,
    executor: &E,
) -> Result<()> {
    info!(?connection, "check db connection");
    let invocation = psql_query(check_psql_path(&connection.pg_version), connection, "select 1");
    executor.run(&invocation).await?;
    info!("db connection is ok");
    Ok(())
}
