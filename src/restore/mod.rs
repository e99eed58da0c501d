pub(crate) mod naming;     // Workspace name to table name resolution
pub(crate) mod probe;      // psql existence check and truncate
pub(crate) mod db_restore; // pg_restore of a single table
mod logic;

use crate::config::RestoreRequest;
use crate::errors::RestoreFailure;
use crate::utils::executor::Executor;

pub use logic::RestoreReport;

/// Public entry point for the workspace restore.
pub async fn run_workspace_restore<E: Executor>(
    request: &RestoreRequest,
    executor: &E,
) -> Result<RestoreReport, RestoreFailure> {
    logic::perform_workspace_restore(request, executor).await
}
