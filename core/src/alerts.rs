use serde::{Deserialize, Serialize};

use crate::insights::{Insight, InsightKind, Severity};
use crate::models::{PowerSubject, SubjectKind};
use crate::power::has_meaningful_profile;
use crate::types::{Duration, FatigueState, PowerMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    MissingPowerData,
    FatigueDataMissing,
    ProfileMismatch,
    ScoutAboveTeam,
    FatigueRegression,
    AboveTeamAverage,
    BelowTeamAverage,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::MissingPowerData => "missing_power_data",
            AlertKind::FatigueDataMissing => "fatigue_data_missing",
            AlertKind::ProfileMismatch => "profile_mismatch",
            AlertKind::ScoutAboveTeam => "scout_above_team",
            AlertKind::FatigueRegression => "fatigue_regression",
            AlertKind::AboveTeamAverage => "above_team_average",
            AlertKind::BelowTeamAverage => "below_team_average",
        }
    }

    /// Anbefalt oppfølging for hver type.
    pub fn action_hint(&self) -> Option<&'static str> {
        let hint = match self {
            AlertKind::MissingPowerData => "schedule a power profile test",
            AlertKind::FatigueDataMissing => "plan efforts after 15/30/45 kJ of work",
            AlertKind::ProfileMismatch => "review the rider's role or targeted training",
            AlertKind::ScoutAboveTeam => "consider the candidate for recruitment",
            AlertKind::FatigueRegression => "add fatigue-resistance work to the plan",
            AlertKind::BelowTeamAverage => "check training load and recovery",
            AlertKind::AboveTeamAverage => return None,
        };
        Some(hint)
    }
}

/// Funn + anbefalt handling. Deler subjektfeltene med `Insight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub subject_id: String,
    pub subject_name: String,
    pub subject_kind: SubjectKind,
    pub kind: AlertKind,
    pub severity: Severity,
    pub duration: Option<Duration>,
    pub fatigue: Option<FatigueState>,
    pub value: Option<f64>,
    pub reference: Option<f64>,
    pub unit: Option<String>,
    pub message: String,
    pub action: Option<String>,
}

impl Alert {
    fn for_subject(subject: &dyn PowerSubject, kind: AlertKind, severity: Severity, message: String) -> Self {
        Self {
            subject_id: subject.id().to_string(),
            subject_name: subject.name().to_string(),
            subject_kind: subject.kind(),
            kind,
            severity,
            duration: None,
            fatigue: None,
            value: None,
            reference: None,
            unit: None,
            message,
            action: kind.action_hint().map(str::to_string),
        }
    }

    /// Alert avledet fra et funn. `None` for funn uten oppfølging.
    pub fn from_insight(insight: &Insight) -> Option<Alert> {
        let kind = match insight.kind {
            InsightKind::FatigueRegression => AlertKind::FatigueRegression,
            InsightKind::ProfileMismatch => AlertKind::ProfileMismatch,
            InsightKind::ScoutMatch => AlertKind::ScoutAboveTeam,
            // Avvik gir kun alert i uthvilt tilstand; trett-avvik dekkes av regresjon.
            InsightKind::AboveTeamAverage if insight.fatigue == Some(FatigueState::Fresh) => {
                AlertKind::AboveTeamAverage
            }
            InsightKind::BelowTeamAverage if insight.fatigue == Some(FatigueState::Fresh) => {
                AlertKind::BelowTeamAverage
            }
            _ => return None,
        };
        Some(Alert {
            subject_id: insight.subject_id.clone(),
            subject_name: insight.subject_name.clone(),
            subject_kind: insight.subject_kind,
            kind,
            severity: insight.severity,
            duration: insight.duration,
            fatigue: insight.fatigue,
            value: insight.value,
            reference: insight.reference,
            unit: Some(insight.unit.clone()),
            message: insight.description.clone(),
            action: kind.action_hint().map(str::to_string),
        })
    }
}

/// Datamangel-varsler for én rytter: ingen uthvilt profil, eller ingen trett profil.
/// Sjekkes i watt, så manglende vekt ikke ser ut som manglende måling.
pub fn missing_data_alerts(subject: &dyn PowerSubject) -> Vec<Alert> {
    let mode = PowerMode::Absolute;
    if !has_meaningful_profile(subject, mode, FatigueState::Fresh) {
        return vec![Alert::for_subject(
            subject,
            AlertKind::MissingPowerData,
            Severity::Warning,
            format!("{}: no fresh power profile recorded", subject.name()),
        )];
    }
    let any_fatigued = FatigueState::FATIGUED
        .iter()
        .any(|s| has_meaningful_profile(subject, mode, *s));
    if any_fatigued {
        return Vec::new();
    }
    vec![Alert::for_subject(
        subject,
        AlertKind::FatigueDataMissing,
        Severity::Info,
        format!("{}: no power values recorded under fatigue", subject.name()),
    )]
}

/// Funn → alerts, i samme rekkefølge som funnene.
pub fn alerts_from_insights(insights: &[Insight]) -> Vec<Alert> {
    insights.iter().filter_map(Alert::from_insight).collect()
}
