use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_BIAS_GENE_LENGTH, DEFAULT_BIAS_OFFSET, DEFAULT_BIAS_WINDOW};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct BiasParams {
    /// genes shorter than this are left out of bias accounting
    pub gene_length: u32,
    /// bases trimmed from both gene ends before windowing
    pub offset: u32,
    pub window_size: u32,
}

impl Default for BiasParams {
    fn default() -> Self {
        BiasParams {
            gene_length: DEFAULT_BIAS_GENE_LENGTH,
            offset: DEFAULT_BIAS_OFFSET,
            window_size: DEFAULT_BIAS_WINDOW,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// gzip the base coverage stream
    pub gzip: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct QcConfig {
    pub bias: BiasParams,
    pub output: OutputConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Bias window size must be positive")]
    EmptyWindow,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl QcConfig {
    pub fn from_toml_str(raw: &str) -> ConfigResult<Self> {
        let config: QcConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.bias.window_size == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        Ok(())
    }
}

impl TryFrom<&Path> for QcConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        QcConfig::from_toml_str(&toml_str)
    }
}
