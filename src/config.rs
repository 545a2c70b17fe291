use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name the schema database is created under unless configured otherwise
pub const DEFAULT_DATABASE: &str = "personjobdept.db";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PersonJobDeptConfig {
    pub database: Option<String>,
    /// `tracing` filter directive, e.g. `info` or `personjobdept=debug`
    pub log_level: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("personjobdept.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<PersonJobDeptConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: PersonJobDeptConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

/// Database path: explicit flag, then config file, then the default name
pub fn resolve_database_path(
    flag: Option<PathBuf>,
    config: Option<&PersonJobDeptConfig>,
) -> PathBuf {
    flag.or_else(|| config.and_then(|c| c.database.as_ref()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
