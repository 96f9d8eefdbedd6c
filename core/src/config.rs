use std::path::Path;

use anyhow::Context;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::types::PowerMode;

/// Terskler og valg for motoren. Alle andeler er brøk (0.08 = 8 %).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Over lagsnitt når verdi ≥ snitt × (1 + terskel).
    pub above_team_threshold: f64,
    /// Under lagsnitt når verdi ≤ snitt × (1 − terskel).
    pub below_team_threshold: f64,
    /// Scout over lagsnitt (lavere terskel enn for troppen).
    pub scout_threshold: f64,
    /// Rolleprofil avviker når forholdstallet ligger mer enn dette under lagets.
    pub profile_mismatch_threshold: f64,
    /// Tretthetstap som flagges (≥).
    pub fatigue_regression_threshold: f64,
    /// Tak for "god tretthetsresistens" (≤).
    pub fatigue_resistance_ceiling: f64,
    /// Moduser detektorene kjøres i.
    pub modes: Vec<PowerMode>,
    /// År alderskategorier regnes mot; `None` = inneværende år.
    pub reference_year: Option<i32>,
    /// Reserver teller ikke i lagsnittet.
    pub exclude_reserves_from_baseline: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            above_team_threshold: 0.08,
            below_team_threshold: 0.08,
            scout_threshold: 0.05,
            profile_mismatch_threshold: 0.15,
            fatigue_regression_threshold: 0.10,
            fatigue_resistance_ceiling: 0.05,
            modes: vec![PowerMode::PerKg],
            reference_year: None,
            exclude_reserves_from_baseline: false,
        }
    }
}

impl EngineConfig {
    pub fn reference_year(&self) -> i32 {
        self.reference_year
            .unwrap_or_else(crate::baseline::current_year)
    }

    /// Negative eller ikke-endelige terskler faller tilbake til default.
    pub fn sanitized(mut self) -> Self {
        let d = EngineConfig::default();
        fn fix(v: &mut f64, fallback: f64, name: &str) {
            if !v.is_finite() || *v < 0.0 {
                warn!("config: {name}={v} is invalid, using {fallback}");
                *v = fallback;
            }
        }
        fix(&mut self.above_team_threshold, d.above_team_threshold, "above_team_threshold");
        fix(&mut self.below_team_threshold, d.below_team_threshold, "below_team_threshold");
        fix(&mut self.scout_threshold, d.scout_threshold, "scout_threshold");
        fix(&mut self.profile_mismatch_threshold, d.profile_mismatch_threshold, "profile_mismatch_threshold");
        fix(&mut self.fatigue_regression_threshold, d.fatigue_regression_threshold, "fatigue_regression_threshold");
        fix(&mut self.fatigue_resistance_ceiling, d.fatigue_resistance_ceiling, "fatigue_resistance_ceiling");
        if self.modes.is_empty() {
            warn!("config: no modes given, using {:?}", d.modes);
            self.modes = d.modes;
        }
        self.modes.sort();
        self.modes.dedup();
        self
    }
}

/// Leser inn konfig fra disk (JSON).
/// Hvis filen ikke finnes, returneres default-konfig.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<EngineConfig> {
    let path = path.as_ref();
    if path.exists() {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: EngineConfig = serde_json::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!("config loaded from {}", path.display());
        Ok(cfg.sanitized())
    } else {
        warn!("config {} not found, using defaults", path.display());
        Ok(EngineConfig::default())
    }
}

/// Lagrer konfig til disk som JSON (pretty-print).
pub fn save_config(cfg: &EngineConfig, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(cfg)?;
    std::fs::write(path, json).with_context(|| format!("writing config {}", path.display()))?;
    info!("config saved to {}", path.display());
    Ok(())
}
