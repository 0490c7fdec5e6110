//! Selection tunables.
//!
//! The tolerance fractions and the single-pump efficiency gate have differed
//! between catalog revisions, so none of them are literals in the engine.

use pf_core::Real;
use serde::{Deserialize, Serialize};

use crate::error::{SelectError, SelectResult};

/// Pressure margins as fractions of the model's maximum pressure.
///
/// Extremal rotors get the `tight` margin on the side facing outside the
/// family envelope and the `loose` margin on the side facing the family's
/// middle; interior rotors get `loose` on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceMargins {
    pub tight: Real,
    pub loose: Real,
    /// Envelope check applied after admission to min/max rotors.
    #[serde(default = "default_boundary")]
    pub boundary: Real,
}

fn default_boundary() -> Real {
    0.03
}

impl ToleranceMargins {
    pub const NARROW: Self = Self {
        tight: 0.015,
        loose: 0.05,
        boundary: 0.03,
    };
    pub const STANDARD: Self = Self {
        tight: 0.03,
        loose: 0.075,
        boundary: 0.03,
    };
    pub const WIDE: Self = Self {
        tight: 0.03,
        loose: 0.10,
        boundary: 0.03,
    };

    pub fn validate(&self) -> SelectResult<()> {
        for (name, v) in [
            ("tight", self.tight),
            ("loose", self.loose),
            ("boundary", self.boundary),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(SelectError::InvalidConfig {
                    what: format!("tolerance '{name}' must be a non-negative fraction, got {v}"),
                });
            }
        }
        if self.tight > self.loose {
            return Err(SelectError::InvalidConfig {
                what: format!(
                    "tight tolerance {} exceeds loose tolerance {}",
                    self.tight, self.loose
                ),
            });
        }
        Ok(())
    }
}

impl Default for ToleranceMargins {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Named tolerance sets observed across catalog revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TolerancePreset {
    Narrow,
    Standard,
    Wide,
}

impl TolerancePreset {
    pub fn margins(self) -> ToleranceMargins {
        match self {
            Self::Narrow => ToleranceMargins::NARROW,
            Self::Standard => ToleranceMargins::STANDARD,
            Self::Wide => ToleranceMargins::WIDE,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "narrow" => Some(Self::Narrow),
            "standard" => Some(Self::Standard),
            "wide" => Some(Self::Wide),
            _ => None,
        }
    }
}

/// Either a preset name or explicit fractions in a config file:
///
/// ```yaml
/// tolerances: wide
/// # or
/// tolerances: { tight: 0.02, loose: 0.06 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToleranceSetting {
    Preset(TolerancePreset),
    Custom(ToleranceMargins),
}

impl ToleranceSetting {
    pub fn margins(&self) -> ToleranceMargins {
        match self {
            Self::Preset(preset) => preset.margins(),
            Self::Custom(margins) => *margins,
        }
    }
}

impl Default for ToleranceSetting {
    fn default() -> Self {
        Self::Preset(TolerancePreset::Standard)
    }
}

/// Ranking policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankPolicy {
    /// (motor ↑, efficiency ↓, |relative flow error| ↑, |pressure error| ↑)
    Simple,
    /// (motor ↑, flow-centering tie-break ↑, |pressure error| ↑)
    #[default]
    Refined,
    /// One row per (model, motor), then (motor ↑, efficiency ↓)
    Grouped,
}

impl RankPolicy {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "simple" => Some(Self::Simple),
            "refined" => Some(Self::Refined),
            "grouped" => Some(Self::Grouped),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub tolerances: ToleranceSetting,
    /// Single-pump mode qualifies only if the best row's efficiency (%)
    /// is strictly above this.
    pub quality_gate: Real,
    pub policy: RankPolicy,
    /// Refined policy: efficiency spread (percentage points) under which
    /// same-motor rows count as competing peers.
    pub efficiency_gap_window: Real,
    /// Grouped policy: rows this close (percentage points) to their group's
    /// most efficient row compete on flow centring.
    pub group_efficiency_window: Real,
    pub top_n: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            tolerances: ToleranceSetting::default(),
            quality_gate: 60.0,
            policy: RankPolicy::Refined,
            efficiency_gap_window: 5.0,
            group_efficiency_window: 4.0,
            top_n: 5,
        }
    }
}

impl SelectionConfig {
    pub fn margins(&self) -> ToleranceMargins {
        self.tolerances.margins()
    }

    /// Efficiency window used by the configured policy.
    pub fn efficiency_window(&self) -> Real {
        match self.policy {
            RankPolicy::Grouped => self.group_efficiency_window,
            RankPolicy::Simple | RankPolicy::Refined => self.efficiency_gap_window,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn validate(&self) -> SelectResult<()> {
        self.margins().validate()?;
        if !(0.0..=100.0).contains(&self.quality_gate) {
            return Err(SelectError::InvalidConfig {
                what: format!(
                    "quality gate must be within 0..=100 %, got {}",
                    self.quality_gate
                ),
            });
        }
        for (name, window) in [
            ("efficiency gap window", self.efficiency_gap_window),
            ("group efficiency window", self.group_efficiency_window),
        ] {
            if !window.is_finite() || window < 0.0 {
                return Err(SelectError::InvalidConfig {
                    what: format!("{name} must be non-negative, got {window}"),
                });
            }
        }
        if self.top_n == 0 {
            return Err(SelectError::InvalidConfig {
                what: "top_n must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SelectionConfig::default();
        assert_eq!(config.margins(), ToleranceMargins::STANDARD);
        assert_eq!(config.quality_gate, 60.0);
        assert_eq!(config.policy, RankPolicy::Refined);
        assert_eq!(config.top_n, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn presets() {
        assert_eq!(TolerancePreset::Narrow.margins().tight, 0.015);
        assert_eq!(TolerancePreset::Wide.margins().loose, 0.10);
        assert_eq!(TolerancePreset::parse(" Wide "), Some(TolerancePreset::Wide));
        assert_eq!(TolerancePreset::parse("loose"), None);
        assert_eq!(RankPolicy::parse("SIMPLE"), Some(RankPolicy::Simple));
        assert_eq!(RankPolicy::parse("grouped"), Some(RankPolicy::Grouped));
    }

    #[test]
    fn invalid_configs() {
        let config = SelectionConfig::default().with_top_n(0);
        assert!(config.validate().is_err());

        let config = SelectionConfig {
            quality_gate: 140.0,
            ..SelectionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SelectionConfig {
            tolerances: ToleranceSetting::Custom(ToleranceMargins {
                tight: 0.1,
                loose: 0.05,
                boundary: 0.03,
            }),
            ..SelectionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SelectError::InvalidConfig { .. })
        ));

        let config = SelectionConfig {
            efficiency_gap_window: -1.0,
            ..SelectionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SelectionConfig {
            group_efficiency_window: Real::NAN,
            ..SelectionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn window_follows_policy() {
        let config = SelectionConfig::default();
        assert_eq!(config.efficiency_window(), 5.0);
        let grouped = SelectionConfig {
            policy: RankPolicy::Grouped,
            ..config
        };
        assert_eq!(grouped.efficiency_window(), 4.0);
    }
}
