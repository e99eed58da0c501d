// mgnl-workspace-copy/src/restore/naming.rs
use tracing::debug;

/// Legacy version workspaces whose tables do not follow the bundle naming.
pub const LEGACY_TABLES: &[(&str, &str)] = &[
    ("magnolia-mgnlversion", "pm_mgnlversion_bundle"),
    ("magnolia_conf_sec-mgnlVersion", "version_bundle"),
];

const HYPHEN_ESCAPE: &str = "_x002d_";

/// Maps an exported workspace name to the table it is persisted in.
///
/// With `normalize` off the name is used as the table name unchanged.
pub fn table_name(workspace: &str, normalize: bool) -> String {
    if normalize {
        normalize_table_name(workspace)
    } else {
        workspace.to_string()
    }
}

/// `marketing-tags` becomes `pm_marketing_x002d_tags_bundle`.
pub fn normalize_table_name(workspace: &str) -> String {
    debug!(workspace, "normalize table name");
    // ASCII case folding; workspace names never carry non-ASCII letters.
    if let Some((_, table)) = LEGACY_TABLES
        .iter()
        .find(|(legacy, _)| legacy.eq_ignore_ascii_case(workspace))
    {
        return (*table).to_string();
    }

    format!("pm_{}_bundle", workspace.replace('-', HYPHEN_ESCAPE))
}
