pub mod executor;

use std::path::PathBuf;

/// Directory pattern of the Debian/Ubuntu versioned PostgreSQL client tools.
pub const BIN_PATH_PATTERN: &str = "/usr/lib/postgresql/%s/bin";

/// Resolves the path of a PostgreSQL client tool for a major version.
///
/// `%s` in `path_pattern` is replaced with `pg_version` and `tool` is appended.
pub fn resolve_path(path_pattern: &str, pg_version: &str, tool: &str) -> PathBuf {
    PathBuf::from(path_pattern.replacen("%s", pg_version, 1)).join(tool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path_pg_restore() {
        assert_eq!(
            resolve_path(BIN_PATH_PATTERN, "12", "pg_restore"),
            PathBuf::from("/usr/lib/postgresql/12/bin/pg_restore")
        );
    }

    #[test]
    fn test_resolve_path_psql() {
        assert_eq!(
            resolve_path(BIN_PATH_PATTERN, "12", "psql"),
            PathBuf::from("/usr/lib/postgresql/12/bin/psql")
        );
        assert_eq!(
            resolve_path(BIN_PATH_PATTERN, "11", "psql"),
            PathBuf::from("/usr/lib/postgresql/11/bin/psql")
        );
    }
}
