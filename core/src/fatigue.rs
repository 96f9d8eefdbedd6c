use log::debug;
use ordered_float::OrderedFloat;

use crate::baseline::BaselineSet;
use crate::config::EngineConfig;
use crate::insights::{Insight, InsightKind, Severity};
use crate::models::{PowerSubject, SubjectKind};
use crate::power::{has_meaningful_profile, power_value, RoundTo, THRESHOLD_EPS};
use crate::types::{Duration, FatigueState, PowerMode};

/// Tap relativt til uthvilt: (fresh − fatigued) / fresh. Krever to positive verdier.
#[inline]
pub fn regression_ratio(fresh: f64, fatigued: f64) -> Option<f64> {
    if fresh > 0.0 && fatigued > 0.0 && fresh.is_finite() && fatigued.is_finite() {
        Some((fresh - fatigued) / fresh)
    } else {
        None
    }
}

/// Sammendrag for ett tretthetsnivå over de kritiske varighetene.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelRegression {
    pub level: FatigueState,
    pub worst_duration: Duration,
    pub max_regression: f64,
    pub mean_regression: f64,
    pub fresh_at_worst: f64,
    pub fatigued_at_worst: f64,
    pub measured: usize,
}

/// `None` når ingen kritisk varighet er målt i begge tilstander (i valgt modus).
///
/// Tapet regnes i watt: vekten forkortes uansett, og W/kg-deling gir bare støy.
pub fn level_regression(
    subject: &dyn PowerSubject,
    mode: PowerMode,
    level: FatigueState,
) -> Option<LevelRegression> {
    let pairs: Vec<(Duration, f64, f64, f64)> = Duration::CRITICAL
        .iter()
        .filter_map(|&d| {
            let fresh = power_value(subject, d, mode, FatigueState::Fresh)?;
            let fatigued = power_value(subject, d, mode, level)?;
            let r = regression_ratio(
                power_value(subject, d, PowerMode::Absolute, FatigueState::Fresh)?,
                power_value(subject, d, PowerMode::Absolute, level)?,
            )?;
            Some((d, fresh, fatigued, r))
        })
        .collect();

    if pairs.is_empty() {
        return None;
    }

    let mean = pairs.iter().map(|p| p.3).sum::<f64>() / pairs.len() as f64;
    // Ved likt tap vinner den første i CRITICAL-rekkefølgen.
    let &(d, fresh, fatigued, max) = pairs
        .iter()
        .rev()
        .max_by_key(|p| OrderedFloat(p.3))?;

    Some(LevelRegression {
        level,
        worst_duration: d,
        max_regression: max,
        mean_regression: mean,
        fresh_at_worst: fresh,
        fatigued_at_worst: fatigued,
        measured: pairs.len(),
    })
}

/// Tretthetsanalyse for rytterne i troppen.
///
/// Per nivå: maks tap ≥ regresjonsterskel → `FatigueRegression`; ellers
/// 0 ≤ maks ≤ resistenstak → `FatigueResistance`. Mellom de to flagges ingenting.
pub fn detect_fatigue_regression<S: PowerSubject>(
    athletes: &[S],
    baselines: &BaselineSet,
    mode: PowerMode,
    cfg: &EngineConfig,
) -> Vec<Insight> {
    let mut out = Vec::new();
    let unit = mode.unit();

    for a in athletes {
        if a.kind() != SubjectKind::Athlete {
            continue;
        }
        if !has_meaningful_profile(a, mode, FatigueState::Fresh) {
            continue;
        }

        for level in FatigueState::FATIGUED {
            let Some(lr) = level_regression(a, mode, level) else {
                debug!("fatigue: {} has no measurable {} durations, skipped", a.id(), level);
                continue;
            };
            let pct = -((lr.max_regression * 100.0).round() as i64);
            let d = lr.worst_duration;

            if lr.max_regression >= cfg.fatigue_regression_threshold - THRESHOLD_EPS {
                let team = baselines
                    .get(level, mode)
                    .and_then(|g| g.team_value(d));
                let team_txt = team
                    .map(|b| format!(", team average {:.2} {unit}", b))
                    .unwrap_or_default();
                out.push(
                    Insight::new(a, InsightKind::FatigueRegression, Severity::Warning, mode)
                        .at(d, level)
                        .values(lr.fatigued_at_worst, team)
                        .percent(pct)
                        .describe(format!(
                            "{}: {} drops from {:.2} to {:.2} {unit} after {} ({}%{team_txt})",
                            a.name(),
                            d.label(),
                            lr.fresh_at_worst,
                            lr.fatigued_at_worst,
                            level,
                            pct
                        )),
                );
            } else if lr.max_regression >= 0.0
                && lr.max_regression <= cfg.fatigue_resistance_ceiling + THRESHOLD_EPS
            {
                out.push(
                    Insight::new(a, InsightKind::FatigueResistance, Severity::Positive, mode)
                        .at(d, level)
                        .values(lr.fatigued_at_worst, Some(lr.fresh_at_worst))
                        .percent(pct)
                        .describe(format!(
                            "{}: holds power after {} (max loss {}% on {}, mean {}%)",
                            a.name(),
                            level,
                            -pct,
                            d.label(),
                            (lr.mean_regression * 100.0).round_to(1)
                        )),
                );
            }
        }
    }
    out
}
