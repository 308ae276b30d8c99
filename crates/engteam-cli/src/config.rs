use engteam_logging::LogFormat;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Built-in defaults, the lowest configuration layer
const DEFAULT_CONFIG: &str = r#"
[catalog]
# path = "~/engineering-team/catalog"  # Or set ENGINEERING_TEAM_CATALOG

[database]
file_name = "engineering-team.db"

[install]
target_dir = ".claude"

[logging]
level = "warn"  # trace, debug, info, warn, error
format = "text"  # text or json
"#;

/// Environment variable naming the catalog root
pub const CATALOG_ENV: &str = "ENGINEERING_TEAM_CATALOG";

/// Prefix for structured overrides, e.g. `ENGINEERING_TEAM__LOGGING__LEVEL`
const ENV_PREFIX: &str = "ENGINEERING_TEAM";

/// Base name of the global and local config files
const CONFIG_NAME: &str = "engineering-team";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CatalogConfig {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub file_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InstallConfig {
    /// Directory inside the project that receives agents and skills
    pub target_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    pub database: DatabaseConfig,
    pub install: InstallConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Global config path: ~/.engineering-team/engineering-team.toml
    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| {
            home.join(format!(".{}", CONFIG_NAME))
                .join(format!("{}.toml", CONFIG_NAME))
        })
    }

    /// Load configuration with layered approach:
    /// 1. Built-in defaults
    /// 2. Global config: ~/.engineering-team/engineering-team.toml (optional)
    /// 3. Local override: ./engineering-team.toml (optional)
    /// 4. Environment variables (highest priority)
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        Self::load_from(Self::global_config_path().as_deref(), Path::new(CONFIG_NAME))
    }

    /// Layered load with explicit file locations; missing files are skipped
    pub fn load_from(global: Option<&Path>, local: &Path) -> anyhow::Result<Self> {
        let mut config_builder = config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ));

        if let Some(global) = global {
            config_builder =
                config_builder.add_source(config::File::from(global).required(false));
        }

        config_builder = config_builder
            .add_source(config::File::from(local).required(false))
            // Double underscore after the prefix keeps ENGINEERING_TEAM_CATALOG out of this layer
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            );

        if let Ok(path) = env::var(CATALOG_ENV) {
            if !path.trim().is_empty() {
                config_builder = config_builder.set_override("catalog.path", path)?;
            }
        }

        let config: Self = config_builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Catalog root: configured path, else the per-user data directory
    pub fn catalog_root(&self) -> PathBuf {
        match self.catalog.path.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(path) => expand_tilde(path),
            None => default_catalog_root(),
        }
    }
}

fn default_catalog_root() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(CONFIG_NAME).join("catalog"))
        .unwrap_or_else(|| PathBuf::from("catalog"))
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}
