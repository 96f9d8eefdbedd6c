use serde::{Deserialize, Serialize};

use crate::models::{PowerSubject, SubjectKind};
use crate::types::{Duration, FatigueState, PowerMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    AboveTeamAverage,
    BelowTeamAverage,
    AboveCategoryAverage,
    FatigueRegression,
    FatigueResistance,
    ProfileMismatch,
    ScoutMatch,
    ProfileHighlight,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::AboveTeamAverage => "above_team_average",
            InsightKind::BelowTeamAverage => "below_team_average",
            InsightKind::AboveCategoryAverage => "above_category_average",
            InsightKind::FatigueRegression => "fatigue_regression",
            InsightKind::FatigueResistance => "fatigue_resistance",
            InsightKind::ProfileMismatch => "profile_mismatch",
            InsightKind::ScoutMatch => "scout_match",
            InsightKind::ProfileHighlight => "profile_highlight",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Positive,
    Warning,
    Info,
    Neutral,
}

/// Ett funn om ett subjekt. Uforanderlig etter at det er laget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub subject_id: String,
    pub subject_name: String,
    pub subject_kind: SubjectKind,
    pub kind: InsightKind,
    pub severity: Severity,
    pub mode: PowerMode,
    pub duration: Option<Duration>,
    pub fatigue: Option<FatigueState>,
    /// Subjektets verdi (W eller W/kg).
    pub value: Option<f64>,
    /// Referanseverdien det er sammenlignet mot.
    pub reference: Option<f64>,
    pub unit: String,
    /// Fortegnsbærende prosent relativt til referansen: +11 over, -16 tap.
    pub percent: Option<i64>,
    pub description: String,
}

impl Insight {
    /// Start et funn for subjektet; resten fylles med `with_*`.
    pub fn new(
        subject: &dyn PowerSubject,
        kind: InsightKind,
        severity: Severity,
        mode: PowerMode,
    ) -> Self {
        Self {
            subject_id: subject.id().to_string(),
            subject_name: subject.name().to_string(),
            subject_kind: subject.kind(),
            kind,
            severity,
            mode,
            duration: None,
            fatigue: None,
            value: None,
            reference: None,
            unit: mode.unit().to_string(),
            percent: None,
            description: String::new(),
        }
    }

    pub fn at(mut self, duration: Duration, fatigue: FatigueState) -> Self {
        self.duration = Some(duration);
        self.fatigue = Some(fatigue);
        self
    }

    pub fn values(mut self, value: f64, reference: Option<f64>) -> Self {
        self.value = Some(value);
        self.reference = reference;
        self
    }

    pub fn unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    pub fn percent(mut self, pct: i64) -> Self {
        self.percent = Some(pct);
        self
    }

    pub fn describe(mut self, text: String) -> Self {
        self.description = text;
        self
    }
}
