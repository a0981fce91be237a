//! Configuration loader with multi-source merging

use super::file_config::DelveConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::PathBuf;

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `DELVE_`-prefixed environment variables (`DELVE_AZURE__MODEL_DEPLOYMENT=...`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./delve.toml`
    /// 4. Global: `~/.config/delve/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<DelveConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(DelveConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = PathBuf::from("delve.toml");
        if project_path.exists() {
            figment = figment.merge(Toml::file(&project_path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("DELVE_").split("__"));

        figment.extract().map_err(Box::new)
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("delve").join("config.toml"))
    }
}
