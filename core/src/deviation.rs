use ordered_float::OrderedFloat;

use crate::baseline::BaselineSet;
use crate::config::EngineConfig;
use crate::insights::{Insight, InsightKind, Severity};
use crate::models::PowerSubject;
use crate::power::{percent_vs, power_value, reaches_above, reaches_below};
use crate::types::{AgeCategory, Duration, FatigueState, PowerMode};

fn fatigue_suffix(state: FatigueState) -> String {
    match state {
        FatigueState::Fresh => String::new(),
        other => format!(" after {other}"),
    }
}

/// Avvik mot lagsnitt og kategorisnitt for én tilstand/modus.
///
/// Over: (verdi − snitt)/snitt ≥ over-terskel. Under: ≤ −under-terskel. Begge inklusive.
/// Kategori sjekkes uavhengig, kun over-terskel og kun når kategorien er kjent.
pub fn detect_deviations(
    subject: &dyn PowerSubject,
    baselines: &BaselineSet,
    mode: PowerMode,
    state: FatigueState,
    cfg: &EngineConfig,
) -> Vec<Insight> {
    let mut out = Vec::new();
    let Some(group) = baselines.get(state, mode) else {
        return out;
    };
    let category = AgeCategory::from_birth_date(subject.birth_date(), group.reference_year);
    let unit = mode.unit();
    let suffix = fatigue_suffix(state);

    for d in Duration::ALL {
        let Some(value) = power_value(subject, d, mode, state) else {
            continue;
        };

        if let Some(base) = group.team_value(d) {
            if reaches_above(value, base, cfg.above_team_threshold) {
                let pct = percent_vs(value, base);
                out.push(
                    Insight::new(subject, InsightKind::AboveTeamAverage, Severity::Positive, mode)
                        .at(d, state)
                        .values(value, Some(base))
                        .percent(pct)
                        .describe(format!(
                            "{}: {} at {:.2} {unit}{suffix} is {pct}% above team average ({:.2} {unit})",
                            subject.name(),
                            d.label(),
                            value,
                            base
                        )),
                );
            } else if reaches_below(value, base, cfg.below_team_threshold) {
                let pct = percent_vs(value, base);
                out.push(
                    Insight::new(subject, InsightKind::BelowTeamAverage, Severity::Warning, mode)
                        .at(d, state)
                        .values(value, Some(base))
                        .percent(pct)
                        .describe(format!(
                            "{}: {} at {:.2} {unit}{suffix} is {}% below team average ({:.2} {unit})",
                            subject.name(),
                            d.label(),
                            value,
                            -pct,
                            base
                        )),
                );
            }
        }

        if let Some(cat_base) = group.category_value(category, d) {
            if reaches_above(value, cat_base, cfg.above_team_threshold) {
                let pct = percent_vs(value, cat_base);
                out.push(
                    Insight::new(subject, InsightKind::AboveCategoryAverage, Severity::Positive, mode)
                        .at(d, state)
                        .values(value, Some(cat_base))
                        .percent(pct)
                        .describe(format!(
                            "{}: {} at {:.2} {unit}{suffix} is {pct}% above the {:?} average ({:.2} {unit})",
                            subject.name(),
                            d.label(),
                            value,
                            category,
                            cat_base
                        )),
                );
            }
        }
    }
    out
}

/// Scoutet kandidat mot troppens uthvilte lagsnitt, med egen (lavere) terskel.
pub fn detect_scout_matches(
    scout: &dyn PowerSubject,
    baselines: &BaselineSet,
    mode: PowerMode,
    cfg: &EngineConfig,
) -> Vec<Insight> {
    let state = FatigueState::Fresh;
    let Some(group) = baselines.get(state, mode) else {
        return Vec::new();
    };
    let unit = mode.unit();

    Duration::ALL
        .iter()
        .filter_map(|&d| {
            let value = power_value(scout, d, mode, state)?;
            let base = group.team_value(d)?;
            if !reaches_above(value, base, cfg.scout_threshold) {
                return None;
            }
            let pct = percent_vs(value, base);
            Some(
                Insight::new(scout, InsightKind::ScoutMatch, Severity::Info, mode)
                    .at(d, state)
                    .values(value, Some(base))
                    .percent(pct)
                    .describe(format!(
                        "Scout {}: {} at {:.2} {unit} is {pct}% above team average ({:.2} {unit})",
                        scout.name(),
                        d.label(),
                        value,
                        base
                    )),
            )
        })
        .collect()
}

/// Subjektets sterkeste varighet relativt til laget (uthvilt), når den klarer over-terskelen.
pub fn detect_profile_highlight(
    subject: &dyn PowerSubject,
    baselines: &BaselineSet,
    mode: PowerMode,
    cfg: &EngineConfig,
) -> Option<Insight> {
    let state = FatigueState::Fresh;
    let group = baselines.get(state, mode)?;

    // Første varighet vinner ved likt forhold (Duration::ALL-rekkefølge).
    let (d, value, base) = Duration::ALL
        .iter()
        .filter_map(|&d| {
            let v = power_value(subject, d, mode, state)?;
            let b = group.team_value(d)?;
            Some((d, v, b))
        })
        .rev()
        .max_by_key(|(_, v, b)| OrderedFloat(v / b))?;

    if !reaches_above(value, base, cfg.above_team_threshold) {
        return None;
    }
    let pct = percent_vs(value, base);
    let unit = mode.unit();
    Some(
        Insight::new(subject, InsightKind::ProfileHighlight, Severity::Info, mode)
            .at(d, state)
            .values(value, Some(base))
            .percent(pct)
            .describe(format!(
                "{}: strongest relative effort is {} ({:.2} {unit}, {pct}% above team average)",
                subject.name(),
                d.label(),
                value
            )),
    )
}
