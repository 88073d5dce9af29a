use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_PORT: u16 = 3000;

/// Set to `1`, `true` or `yes` to suppress progress bars and spinners
pub const QUIET_ENV: &str = "CHEMLINK_QUIET";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChemlinkConfig {
    pub database: Option<String>,
    pub page_size: Option<usize>,
    pub port: Option<u16>,
}

impl ChemlinkConfig {
    /// CLI flag wins, then the config file, then the project default
    pub fn resolve_database(&self, flag: Option<PathBuf>, base: &Path) -> PathBuf {
        flag.or_else(|| self.database.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| default_database_path_in(base))
    }

    pub fn resolve_page_size(&self, flag: Option<usize>) -> usize {
        flag.or(self.page_size).unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn resolve_port(&self, flag: Option<u16>) -> u16 {
        flag.or(self.port).unwrap_or(DEFAULT_PORT)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("chemlink.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".chemlink").join("chemlink.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<ChemlinkConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: ChemlinkConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &ChemlinkConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn is_quiet() -> bool {
    static QUIET: OnceLock<bool> = OnceLock::new();
    *QUIET.get_or_init(|| env_flag(std::env::var(QUIET_ENV).ok().as_deref()))
}

fn env_flag(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        Some(v) => v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"),
        None => false,
    }
}
