use anyhow::Result;
use std::path::PathBuf;

use crate::{Config, ValidationResult};

/// Application lifecycle: owns the validated configuration.
pub struct App {
    config: Config,
    warnings: ValidationResult,
}

impl App {
    /// Create a new application instance from the default config file
    pub fn new() -> Result<Self> {
        let (config, warnings) = Config::load_validated()?;
        Ok(Self::with_config(config, warnings))
    }

    /// Create a new application instance from an explicit config file
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let (config, warnings) = Config::load_validated_from(&path)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(Self::with_config(config, warnings))
    }

    fn with_config(config: Config, warnings: ValidationResult) -> Self {
        Self {
            config,
            warnings,
        }
    }

    /// Prepare runtime directories
    pub fn initialize(&mut self) -> Result<()> {
        let data_dir = &self.config.storage.data_dir;
        std::fs::create_dir_all(data_dir)?;
        tracing::info!(
            "Application initialized (data dir: {}, {} config warnings)",
            data_dir.display(),
            self.warnings.warnings.len()
        );
        Ok(())
    }

    /// Shutdown the application
    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down application");
        Ok(())
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Warnings collected while validating the config
    pub fn warnings(&self) -> &ValidationResult {
        &self.warnings
    }
}
