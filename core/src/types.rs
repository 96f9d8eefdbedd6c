use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EngineError;

/// De ni kanoniske varighetene et effektprofil måles på.
/// `Cp` er critical power (utholdenhets-proxy), ikke en fast tid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Duration {
    S1,
    S5,
    S30,
    Min1,
    Min3,
    Min5,
    Min12,
    Min20,
    Cp,
}

impl Duration {
    pub const ALL: [Duration; 9] = [
        Duration::S1,
        Duration::S5,
        Duration::S30,
        Duration::Min1,
        Duration::Min3,
        Duration::Min5,
        Duration::Min12,
        Duration::Min20,
        Duration::Cp,
    ];

    /// Utholdenhetsrelevante varigheter brukt i tretthetsanalysen.
    pub const CRITICAL: [Duration; 5] = [
        Duration::Cp,
        Duration::Min20,
        Duration::Min12,
        Duration::Min5,
        Duration::Min1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Duration::S1 => "1s",
            Duration::S5 => "5s",
            Duration::S30 => "30s",
            Duration::Min1 => "1min",
            Duration::Min3 => "3min",
            Duration::Min5 => "5min",
            Duration::Min12 => "12min",
            Duration::Min20 => "20min",
            Duration::Cp => "cp",
        }
    }

    /// Lesbar etikett for beskrivelser ("1 min", "CP").
    pub fn label(&self) -> &'static str {
        match self {
            Duration::S1 => "1 s",
            Duration::S5 => "5 s",
            Duration::S30 => "30 s",
            Duration::Min1 => "1 min",
            Duration::Min3 => "3 min",
            Duration::Min5 => "5 min",
            Duration::Min12 => "12 min",
            Duration::Min20 => "20 min",
            Duration::Cp => "CP",
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Duration {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let d = match key.as_str() {
            "1s" | "1sec" => Duration::S1,
            "5s" | "5sec" => Duration::S5,
            "30s" | "30sec" => Duration::S30,
            "1min" | "60s" => Duration::Min1,
            "3min" | "180s" => Duration::Min3,
            "5min" | "300s" => Duration::Min5,
            "12min" | "720s" => Duration::Min12,
            "20min" | "1200s" => Duration::Min20,
            "cp" | "critical_power" => Duration::Cp,
            _ => return Err(EngineError::UnknownDuration(s.to_string())),
        };
        Ok(d)
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Tretthetstilstand et profil er målt i: uthvilt, eller etter akkumulert arbeid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FatigueState {
    Fresh,
    Low,
    Medium,
    High,
}

impl FatigueState {
    pub const ALL: [FatigueState; 4] = [
        FatigueState::Fresh,
        FatigueState::Low,
        FatigueState::Medium,
        FatigueState::High,
    ];

    pub const FATIGUED: [FatigueState; 3] =
        [FatigueState::Low, FatigueState::Medium, FatigueState::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            FatigueState::Fresh => "fresh",
            FatigueState::Low => "15kj",
            FatigueState::Medium => "30kj",
            FatigueState::High => "45kj",
        }
    }
}

impl fmt::Display for FatigueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FatigueState {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fresh" | "0kj" => Ok(FatigueState::Fresh),
            "15kj" | "low" => Ok(FatigueState::Low),
            "30kj" | "medium" => Ok(FatigueState::Medium),
            "45kj" | "high" => Ok(FatigueState::High),
            _ => Err(EngineError::UnknownFatigueState(s.to_string())),
        }
    }
}

impl Serialize for FatigueState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FatigueState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Absolutt watt eller watt per kilo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerMode {
    Absolute,
    #[serde(alias = "wkg", alias = "per_kilogram")]
    PerKg,
}

impl PowerMode {
    pub fn unit(&self) -> &'static str {
        match self {
            PowerMode::Absolute => "W",
            PowerMode::PerKg => "W/kg",
        }
    }
}

impl FromStr for PowerMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "absolute" | "w" | "watts" => Ok(PowerMode::Absolute),
            "per_kg" | "wkg" | "w/kg" | "per_kilogram" => Ok(PowerMode::PerKg),
            _ => Err(EngineError::UnknownMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Sex {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Unknown => "unknown",
        }
    }

    /// Tolerant: alt som ikke er gjenkjent blir `Unknown`.
    pub fn parse_lenient(s: &str) -> Sex {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Sex::Male,
            "f" | "female" => Sex::Female,
            _ => Sex::Unknown,
        }
    }
}

impl Serialize for Sex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Sex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Sex::parse_lenient).unwrap_or_default())
    }
}

/// Alderskategori avledet fra fødselsdato, alder per 1. januar i referanseåret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeCategory {
    Junior,
    U23,
    Elite,
    Unknown,
}

impl AgeCategory {
    /// ≤18 år → Junior, ≤22 → U23, ellers Elite. Mangler dato → Unknown.
    pub fn from_birth_date(birth: Option<NaiveDate>, reference_year: i32) -> AgeCategory {
        let Some(birth) = birth else {
            return AgeCategory::Unknown;
        };
        let Some(jan1) = NaiveDate::from_ymd_opt(reference_year, 1, 1) else {
            return AgeCategory::Unknown;
        };
        if birth > jan1 {
            return AgeCategory::Unknown;
        }
        let mut age = jan1.year() - birth.year();
        if (birth.month(), birth.day()) > (1, 1) {
            age -= 1;
        }
        match age {
            a if a <= 18 => AgeCategory::Junior,
            a if a <= 22 => AgeCategory::U23,
            _ => AgeCategory::Elite,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, AgeCategory::Unknown)
    }
}

/// Kvalitativ rytterrolle (lukket sett).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Sprinter,
    Climber,
    #[serde(alias = "all_rounder", alias = "allrounder")]
    AllRounder,
    Puncher,
    #[serde(alias = "classics_specialist")]
    ClassicsSpecialist,
    #[serde(alias = "breakaway_specialist")]
    BreakawaySpecialist,
    Complete,
    Other,
}

impl FromStr for Role {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        let role = match key.as_str() {
            "sprinter" => Role::Sprinter,
            "climber" => Role::Climber,
            "all-rounder" | "allrounder" => Role::AllRounder,
            "puncher" => Role::Puncher,
            "classics-specialist" => Role::ClassicsSpecialist,
            "breakaway-specialist" => Role::BreakawaySpecialist,
            "complete" => Role::Complete,
            "other" => Role::Other,
            _ => return Err(EngineError::UnknownRole(s.to_string())),
        };
        Ok(role)
    }
}

/// Watt per kanonisk varighet. Fravær eller 0 betyr "ikke målt".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PowerProfile {
    values: BTreeMap<Duration, f64>,
}

impl PowerProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I: IntoIterator<Item = (Duration, f64)>>(pairs: I) -> Self {
        Self {
            values: pairs.into_iter().collect(),
        }
    }

    pub fn with(mut self, duration: Duration, watts: f64) -> Self {
        self.values.insert(duration, watts);
        self
    }

    pub fn set(&mut self, duration: Duration, watts: f64) {
        self.values.insert(duration, watts);
    }

    /// Rå verdi, kun når den er et positivt, endelig tall.
    pub fn get(&self, duration: Duration) -> Option<f64> {
        self.values
            .get(&duration)
            .copied()
            .filter(|w| w.is_finite() && *w > 0.0)
    }

    /// Minst én positiv verdi et sted i profilen.
    pub fn is_meaningful(&self) -> bool {
        Duration::ALL.iter().any(|d| self.get(*d).is_some())
    }
}
