// mgnl-workspace-copy/src/restore/logic.rs
use tracing::{info, warn};

use crate::config::RestoreRequest;
use crate::errors::{RestoreFailure, RestoreStep};
use crate::utils::executor::Executor;

use super::db_restore::restore_table;
use super::naming::{LEGACY_TABLES, table_name};
use super::probe::{TablePresence, reset_table, table_exists};

/// Shared binary store table referenced by every workspace.
pub const DATASTORE_TABLE: &str = "ds_datastore";

/// One table that was loaded from the dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredTable {
    /// `None` for the datastore table.
    pub workspace: Option<String>,
    pub table: String,
    pub truncated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub tables: Vec<RestoredTable>,
    pub warnings: Vec<String>,
}

/// Restores every requested workspace, then the datastore table.
///
/// For each workspace, in request order:
/// 1. Resolve the table name.
/// 2. Probe the table; a failed probe only skips the truncate.
/// 3. Truncate the table if the probe succeeded.
/// 4. Restore the table from the dump.
///
/// Stops at the first failed truncate or restore, or an interrupted existence
/// check. Tables restored before the failure are left as they are.
pub async fn perform_workspace_restore<E: Executor>(
    request: &RestoreRequest,
    executor: &E,
) -> Result<RestoreReport, RestoreFailure> {
    info!(
        connection = ?request.connection,
        dump = %request.dump_path.display(),
        workspaces = ?request.workspaces,
        "run db copy"
    );
    let connection = &request.connection;
    let mut report = RestoreReport::default();

    for workspace in &request.workspaces {
        let table = table_name(workspace, request.normalize_table_names);
        info!(workspace = %workspace, table = %table, "copy table");

        let presence = table_exists(executor, connection, &table)
            .await
            .map_err(|e| RestoreFailure::new(&table, RestoreStep::ExistenceCheck, e))?;
        let truncated = match presence {
            TablePresence::Present => {
                reset_table(executor, connection, &table)
                    .await
                    .map_err(|e| RestoreFailure::new(&table, RestoreStep::Truncate, e))?;
                true
            }
            TablePresence::Absent { reason } => {
                warn!(table = %table, %reason, "table does not exist, skipping truncate");
                false
            }
        };

        restore_table(executor, connection, &table, &request.dump_path)
            .await
            .map_err(|e| RestoreFailure::new(&table, RestoreStep::Restore, e))?;

        report.tables.push(RestoredTable {
            workspace: Some(workspace.clone()),
            table,
            truncated,
        });
    }

    if request.copy_datastore {
        info!(table = DATASTORE_TABLE, "copy datastore");
        reset_table(executor, connection, DATASTORE_TABLE)
            .await
            .map_err(|e| RestoreFailure::new(DATASTORE_TABLE, RestoreStep::Truncate, e))?;
        restore_table(executor, connection, DATASTORE_TABLE, &request.dump_path)
            .await
            .map_err(|e| RestoreFailure::new(DATASTORE_TABLE, RestoreStep::Restore, e))?;
        report.tables.push(RestoredTable {
            workspace: None,
            table: DATASTORE_TABLE.to_string(),
            truncated: true,
        });
    }

    if request.show_version_warning {
        report.warnings = version_warnings(&request.workspaces);
        for warning in &report.warnings {
            warn!("{}", warning);
        }
    }

    Ok(report)
}

/// Advisory warnings for version workspaces absent from the requested list.
///
/// Matches the list as given, before any normalisation.
pub fn version_warnings(workspaces: &[String]) -> Vec<String> {
    LEGACY_TABLES
        .iter()
        .filter(|(workspace, _)| !workspaces.iter().any(|w| w == workspace))
        .map(|(_, table)| format!("{} workspace may be missing", table))
        .collect()
}
