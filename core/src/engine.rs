use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::alerts::{alerts_from_insights, missing_data_alerts, Alert};
use crate::baseline::BaselineSet;
use crate::config::EngineConfig;
use crate::deviation::{detect_deviations, detect_profile_highlight, detect_scout_matches};
use crate::fatigue::detect_fatigue_regression;
use crate::insights::Insight;
use crate::metrics;
use crate::models::{Athlete, PowerSubject, ScoutCandidate};
use crate::profile_check::detect_profile_mismatch;
use crate::types::FatigueState;

/// Resultat av én kjøring over et øyeblikksbilde av troppen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineReport {
    pub reference_year: i32,
    pub baselines: BaselineSet,
    pub insights: Vec<Insight>,
    pub alerts: Vec<Alert>,
}

/// Hele kjeden: gruppesnitt → detektorer → alerts.
///
/// Gruppesnittene beregnes ferdig før noen detektor leser dem. Ingen tilstand
/// beholdes mellom kall; samme input gir samme rapport.
pub fn run_engine(
    athletes: &[Athlete],
    scouts: &[ScoutCandidate],
    cfg: &EngineConfig,
) -> EngineReport {
    let cfg = cfg.clone().sanitized();
    let year = cfg.reference_year();
    info!(
        "engine run: {} athletes, {} scouts, modes {:?}, year {}",
        athletes.len(),
        scouts.len(),
        cfg.modes,
        year
    );

    // 1) Gruppesnitt (troppen; reserver valgfritt utelatt)
    let population: Vec<&Athlete> = athletes
        .iter()
        .filter(|a| !(cfg.exclude_reserves_from_baseline && a.is_reserve()))
        .collect();
    let baselines = BaselineSet::compute(&population, &cfg.modes, year);

    // 2) Detektorer
    let mut insights: Vec<Insight> = Vec::new();
    for &mode in &cfg.modes {
        for a in athletes {
            for state in FatigueState::ALL {
                insights.extend(detect_deviations(a, &baselines, mode, state, &cfg));
            }
            insights.extend(detect_profile_mismatch(a, &baselines, mode, FatigueState::Fresh, &cfg));
            insights.extend(detect_profile_highlight(a, &baselines, mode, &cfg));
        }
        insights.extend(detect_fatigue_regression(athletes, &baselines, mode, &cfg));
        for s in scouts {
            insights.extend(detect_scout_matches(s, &baselines, mode, &cfg));
        }
    }

    // 3) Alerts: datamangel først, så funn som krever oppfølging
    let mut alerts: Vec<Alert> = athletes
        .iter()
        .flat_map(|a| missing_data_alerts(a))
        .collect();
    alerts.extend(alerts_from_insights(&insights));

    metrics::engine_run_total();
    for i in &insights {
        metrics::insight_emitted_total(i.kind);
    }
    for a in &alerts {
        metrics::alert_emitted_total(a.kind);
    }
    debug!("engine run finished: {} insights, {} alerts", insights.len(), alerts.len());

    EngineReport {
        reference_year: year,
        baselines,
        insights,
        alerts,
    }
}
