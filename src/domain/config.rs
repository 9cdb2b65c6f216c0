use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::car_id::DEFAULT_DIGITS;

/// Configuration for the rental tracker.
///
/// This struct holds settings that control where the rental table lives,
/// how car IDs are rendered, and which deletions are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The number of digits in a car ID.
    ///
    /// IDs are padded to this width with leading zeros, e.g. '00001'.
    digits: usize,

    /// Whether a car that is currently rented out may be deleted.
    pub allow_delete_rented: bool,

    /// The path of the rental table.
    ///
    /// Relative paths are resolved against the working directory.
    pub data_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            digits: default_digits(),
            allow_delete_rented: false,
            data_file: default_data_file(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads the configuration, falling back to the defaults if the file is
    /// missing or invalid.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::debug!("Failed to load config from {}: {e}", path.display());
            Self::default()
        })
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized.
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))
    }

    /// Returns the number of digits for padding car IDs.
    #[must_use]
    pub const fn digits(&self) -> usize {
        self.digits
    }

    /// Sets the number of digits for padding car IDs.
    ///
    /// A width of zero is treated as one.
    pub fn set_digits(&mut self, digits: usize) {
        self.digits = digits.max(1);
    }
}

const fn default_digits() -> usize {
    DEFAULT_DIGITS
}

fn default_data_file() -> PathBuf {
    PathBuf::from("rental_data.csv")
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        /// The number of digits in a car ID.
        #[serde(default = "default_digits")]
        digits: usize,

        #[serde(default)]
        allow_delete_rented: bool,

        #[serde(default = "default_data_file")]
        data_file: PathBuf,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                digits,
                allow_delete_rented,
                data_file,
            } => Self {
                digits: digits.max(1),
                allow_delete_rented,
                data_file,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            digits: config.digits,
            allow_delete_rented: config.allow_delete_rented,
            data_file: config.data_file,
        }
    }
}
