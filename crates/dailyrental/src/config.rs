use crate::error::{RentalError, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_CONFIG_FILE: &str = "dailyrental.toml";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyRentalConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON document holding every known rental
    pub data_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("rentals.json"),
        }
    }
}

impl DailyRentalConfig {
    /// Defaults, then the TOML file, then `DAILYRENTAL_` environment variables.
    ///
    /// Nested keys use a double underscore, e.g. `DAILYRENTAL_STORAGE__DATA_FILE`.
    pub fn load(path_override: Option<PathBuf>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(DailyRentalConfig::default()));

        match path_override {
            Some(path) => {
                if !path.exists() {
                    return Err(RentalError::ConfigError {
                        message: format!("config file {} does not exist", path.display()),
                    });
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        figment = figment.merge(Env::prefixed("DAILYRENTAL_").split("__"));

        figment.extract().map_err(|e| RentalError::ConfigError {
            message: e.to_string(),
        })
    }
}
