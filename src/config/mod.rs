// mgnl-workspace-copy/src/config/mod.rs
use clap::Args;
use clap::builder::BoolishValueParser;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::errors::{AppError, Result};

pub const SUPPORTED_PG_VERSIONS: &[&str] = &["11", "12"];
pub const DEFAULT_COPY_PG_VERSION: &str = "12";
pub const DEFAULT_USERNAME: &str = "postgres";
pub const DEFAULT_PASSWORD: &str = "postgres";
pub const DEFAULT_PORT: u16 = 5432;

// Struct for deserializing the optional JSON config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJsonConfig {
    pub pgversion: Option<String>,
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub port: Option<String>,
    pub dbname: Option<String>,
    pub database_url: Option<String>,
    pub dump_file: Option<PathBuf>,
    pub mgnl_workspaces: Option<Vec<String>>,
    pub normalize_table_name: Option<bool>,
    pub copy_datastore: Option<bool>,
    pub show_version_warning: Option<bool>,
    pub check_connection: Option<bool>,
}

impl RawJsonConfig {
    pub fn load_from_json(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)?;
        let raw: RawJsonConfig = serde_json::from_str(&config_content)?;
        Ok(raw)
    }
}

/// Connection flags shared by the `copy` and `check` commands.
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// PostgreSQL version of the client tools. Supported: 11, 12.
    #[arg(long = "pgversion", env = "PGVERSION")]
    pub pg_version: Option<String>,

    /// Postgres DB host, e.g. dev-magnolia-helm-author-db-0.dev-magnolia-helm-author-db.dev
    #[arg(long, env = "DB_HOST")]
    pub host: Option<String>,

    /// Postgres DB username [default: postgres]
    #[arg(long, env = "DB_USERNAME")]
    pub username: Option<String>,

    /// Postgres DB user password [default: postgres]
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Postgres DB port [default: 5432]
    #[arg(long, env = "DB_PORT")]
    pub port: Option<String>,

    /// Postgres DB name, e.g. author, public
    #[arg(long, env = "DB_NAME")]
    pub dbname: Option<String>,

    /// Connection URL; fills any connection field not given otherwise.
    #[arg(long = "database-url", env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
}

/// Flags of the `copy` command.
#[derive(Debug, Clone, Default, Args)]
pub struct CopyArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Postgres DB dump file path
    #[arg(long = "dump-file", env = "DB_DUMP_PATH")]
    pub dump_file: Option<PathBuf>,

    /// Magnolia workspaces to copy, comma separated
    #[arg(long = "mgnl-workspaces", env = "MGNL_WORKSPACES", value_delimiter = ',')]
    pub mgnl_workspaces: Vec<String>,

    /// Convert exported workspace names to db table names [default: true]
    #[arg(
        long = "normalize-table-name",
        env = "NORMALIZE_TABLE_NAME",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub normalize_table_name: Option<bool>,

    /// Copy the ds_datastore table [default: true]
    #[arg(
        long = "copy-datastore",
        env = "COPY_DATASTORE",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub copy_datastore: Option<bool>,

    /// Warn when the version workspaces are not in the list [default: false]
    #[arg(
        long = "show-version-warning",
        env = "SHOW_VERSION_WARNING",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub show_version_warning: Option<bool>,

    /// Check the db connection before touching any table [default: false]
    #[arg(
        long = "check-connection",
        env = "CHECK_CONNECTION",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub check_connection: Option<bool>,
}

/// Validated connection parameters for the PostgreSQL client tools.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Empty only for the connectivity check, which then uses a fixed psql.
    pub pg_version: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub dbname: String,
}

impl ConnectionParams {
    /// `-h`, `-p`, `-U`, `-d` arguments understood by both psql and pg_restore.
    pub fn client_args(&self) -> Vec<String> {
        vec![
            "-h".to_string(),
            self.host.clone(),
            "-p".to_string(),
            self.port.to_string(),
            "-U".to_string(),
            self.username.clone(),
            "-d".to_string(),
            self.dbname.clone(),
        ]
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("pg_version", &self.pg_version)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("dbname", &self.dbname)
            .finish()
    }
}

/// Everything a workspace restore run needs. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreRequest {
    pub connection: ConnectionParams,
    pub dump_path: PathBuf,
    pub workspaces: Vec<String>,
    pub normalize_table_names: bool,
    pub copy_datastore: bool,
    pub show_version_warning: bool,
    pub check_connection: bool,
}

/// Connection components taken from a `postgres://` URL.
#[derive(Debug, Default)]
struct UrlParts {
    host: Option<String>,
    port: Option<String>,
    username: Option<String>,
    password: Option<String>,
    dbname: Option<String>,
}

fn parse_database_url(db_url: &str) -> Result<UrlParts> {
    let parsed = Url::parse(db_url)?;
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
    Ok(UrlParts {
        host: parsed.host_str().and_then(non_empty),
        port: parsed.port().map(|p| p.to_string()),
        username: non_empty(parsed.username()),
        password: parsed.password().and_then(non_empty),
        dbname: non_empty(parsed.path().trim_start_matches('/')),
    })
}

impl ConnectionArgs {
    /// Merges flags, the JSON config and `database_url`, then validates.
    ///
    /// An empty `default_pg_version` means the version may stay unset.
    pub fn resolve(self, raw: &RawJsonConfig, default_pg_version: &str) -> Result<ConnectionParams> {
        let url_parts = match self.database_url.as_ref().or(raw.database_url.as_ref()) {
            Some(db_url) => parse_database_url(db_url)?,
            None => UrlParts::default(),
        };

        let pg_version = self
            .pg_version
            .or_else(|| raw.pgversion.clone())
            .unwrap_or_else(|| default_pg_version.to_string());
        let host = self.host.or_else(|| raw.host.clone()).or(url_parts.host);
        let port = self.port.or_else(|| raw.port.clone()).or(url_parts.port);
        let username = self
            .username
            .or_else(|| raw.username.clone())
            .or(url_parts.username)
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string());
        let password = self
            .password
            .or_else(|| raw.password.clone())
            .or(url_parts.password)
            .unwrap_or_else(|| DEFAULT_PASSWORD.to_string());
        let dbname = self.dbname.or_else(|| raw.dbname.clone()).or(url_parts.dbname);

        let pg_version = pg_version.trim().to_string();
        if pg_version.is_empty() {
            if !default_pg_version.is_empty() {
                return Err(AppError::Config("pgversion cannot be empty".into()));
            }
        } else if !SUPPORTED_PG_VERSIONS.contains(&pg_version.as_str()) {
            return Err(AppError::Config(format!(
                "unsupported postgresql version {}, supported: {}",
                pg_version,
                SUPPORTED_PG_VERSIONS.join(", ")
            )));
        }

        let host = required(host, "db host")?;
        let port = match port {
            Some(p) if p.trim().is_empty() => {
                return Err(AppError::Config("db port cannot be empty".into()));
            }
            Some(p) => p
                .trim()
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("db port is not a valid port: {}", p)))?,
            None => DEFAULT_PORT,
        };
        if username.trim().is_empty() {
            return Err(AppError::Config("db username cannot be empty".into()));
        }
        let dbname = required(dbname, "db name")?;

        Ok(ConnectionParams {
            pg_version,
            host,
            port,
            username,
            password,
            dbname,
        })
    }
}

impl CopyArgs {
    /// Builds the validated restore request for the `copy` command.
    pub fn resolve(self, raw: &RawJsonConfig) -> Result<RestoreRequest> {
        let connection = self.connection.resolve(raw, DEFAULT_COPY_PG_VERSION)?;

        let dump_path = self
            .dump_file
            .or_else(|| raw.dump_file.clone())
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| AppError::Config("db dump file path cannot be empty".into()))?;

        let workspaces = if self.mgnl_workspaces.is_empty() {
            raw.mgnl_workspaces.clone().unwrap_or_default()
        } else {
            self.mgnl_workspaces
        };
        let workspaces: Vec<String> = workspaces
            .into_iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        if workspaces.is_empty() {
            return Err(AppError::Config("mgnl workspaces list cannot be empty".into()));
        }

        Ok(RestoreRequest {
            connection,
            dump_path,
            workspaces,
            normalize_table_names: self
                .normalize_table_name
                .or(raw.normalize_table_name)
                .unwrap_or(true),
            copy_datastore: self.copy_datastore.or(raw.copy_datastore).unwrap_or(true),
            show_version_warning: self
                .show_version_warning
                .or(raw.show_version_warning)
                .unwrap_or(false),
            check_connection: self
                .check_connection
                .or(raw.check_connection)
                .unwrap_or(false),
        })
    }
}

fn required(value: Option<String>, what: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Config(format!("{} cannot be empty", what))),
    }
}
