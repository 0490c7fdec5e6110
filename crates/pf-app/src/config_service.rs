//! Selection configuration files and command-line overrides.

use std::path::Path;

use pf_core::Real;
use pf_select::{RankPolicy, SelectionConfig, TolerancePreset, ToleranceSetting};

use crate::error::{AppError, AppResult};

/// Load a [`SelectionConfig`] from a YAML file. Missing keys take defaults.
pub fn load_config(path: &Path) -> AppResult<SelectionConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: SelectionConfig = serde_yaml::from_str(&content)
        .map_err(|e| AppError::ConfigParse(format!("{}: {}", path.display(), e)))?;
    config.validate()?;

    Ok(config)
}

/// Save a [`SelectionConfig`] as YAML.
pub fn save_config(path: &Path, config: &SelectionConfig) -> AppResult<()> {
    let content = serde_yaml::to_string(config)
        .map_err(|e| AppError::ConfigParse(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(path, content).map_err(|e| AppError::ConfigWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Values given on the command line; each one replaces the file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub policy: Option<String>,
    pub tolerance: Option<String>,
    pub quality_gate: Option<Real>,
    pub top_n: Option<usize>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: SelectionConfig) -> AppResult<SelectionConfig> {
        if let Some(name) = &self.policy {
            config.policy = RankPolicy::parse(name).ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "unknown ranking policy '{name}' (expected simple, refined or grouped)"
                ))
            })?;
        }
        if let Some(name) = &self.tolerance {
            let preset = TolerancePreset::parse(name).ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "unknown tolerance preset '{name}' (expected narrow, standard or wide)"
                ))
            })?;
            config.tolerances = ToleranceSetting::Preset(preset);
        }
        if let Some(gate) = self.quality_gate {
            config.quality_gate = gate;
        }
        if let Some(top_n) = self.top_n {
            config.top_n = top_n;
        }
        config.validate()?;
        Ok(config)
    }
}

/// File config (or defaults) with overrides applied.
pub fn resolve_config(path: Option<&Path>, overrides: &ConfigOverrides) -> AppResult<SelectionConfig> {
    let base = match path {
        Some(path) => load_config(path)?,
        None => SelectionConfig::default(),
    };
    overrides.apply(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_values() {
        let overrides = ConfigOverrides {
            policy: Some("simple".into()),
            tolerance: Some("wide".into()),
            quality_gate: Some(65.0),
            top_n: Some(3),
        };
        let config = overrides.apply(SelectionConfig::default()).unwrap();
        assert_eq!(config.policy, RankPolicy::Simple);
        assert_eq!(config.margins(), TolerancePreset::Wide.margins());
        assert_eq!(config.quality_gate, 65.0);
        assert_eq!(config.top_n, 3);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let overrides = ConfigOverrides {
            policy: Some("fastest".into()),
            ..ConfigOverrides::default()
        };
        assert!(matches!(
            overrides.apply(SelectionConfig::default()),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn invalid_override_fails_validation() {
        let overrides = ConfigOverrides {
            top_n: Some(0),
            ..ConfigOverrides::default()
        };
        assert!(matches!(
            overrides.apply(SelectionConfig::default()),
            Err(AppError::Select(_))
        ));
    }
}
