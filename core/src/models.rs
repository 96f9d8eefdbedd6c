use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{FatigueState, PowerProfile, Role, Sex};

/// Hvilken type subjekt et funn gjelder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Athlete,
    Scout,
}

/// Felles kapabilitet for alt som har et effektprofil (rytter i troppen eller scoutet kandidat).
/// All deteksjon går kun gjennom dette traitet.
pub trait PowerSubject {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn kind(&self) -> SubjectKind;
    fn mass_kg(&self) -> Option<f64>;
    fn birth_date(&self) -> Option<NaiveDate>;
    fn sex(&self) -> Sex;
    fn role(&self) -> Option<Role>;
    fn profile(&self, state: FatigueState) -> Option<&PowerProfile>;

    /// Reserve (ikke full tropp). Scouts er aldri reserve.
    fn is_reserve(&self) -> bool {
        false
    }
}

/// De fire profilene: uthvilt + tre tretthetsnivåer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FatigueProfiles {
    #[serde(default)]
    pub fresh: Option<PowerProfile>,
    #[serde(default, rename = "15kj", alias = "low")]
    pub low: Option<PowerProfile>,
    #[serde(default, rename = "30kj", alias = "medium")]
    pub medium: Option<PowerProfile>,
    #[serde(default, rename = "45kj", alias = "high")]
    pub high: Option<PowerProfile>,
}

impl FatigueProfiles {
    pub fn get(&self, state: FatigueState) -> Option<&PowerProfile> {
        match state {
            FatigueState::Fresh => self.fresh.as_ref(),
            FatigueState::Low => self.low.as_ref(),
            FatigueState::Medium => self.medium.as_ref(),
            FatigueState::High => self.high.as_ref(),
        }
    }

    pub fn set(&mut self, state: FatigueState, profile: PowerProfile) {
        let slot = match state {
            FatigueState::Fresh => &mut self.fresh,
            FatigueState::Low => &mut self.low,
            FatigueState::Medium => &mut self.medium,
            FatigueState::High => &mut self.high,
        };
        *slot = Some(profile);
    }
}

/// Fødselsdato kommer som tekst fra verten; ugyldig tekst gir `None`.
pub fn parse_birth_date(raw: Option<&str>) -> Option<NaiveDate> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d.%m.%Y"))
        .ok()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Athlete {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mass_kg: Option<f64>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub sex: Sex,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub reserve: bool,
    #[serde(default)]
    pub profiles: FatigueProfiles,
}

impl Athlete {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_mass(mut self, kg: f64) -> Self {
        self.mass_kg = Some(kg);
        self
    }

    pub fn with_birth_date(mut self, date: &str) -> Self {
        self.birth_date = Some(date.to_string());
        self
    }

    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = sex;
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_profile(mut self, state: FatigueState, profile: PowerProfile) -> Self {
        self.profiles.set(state, profile);
        self
    }

    pub fn as_reserve(mut self) -> Self {
        self.reserve = true;
        self
    }
}

impl PowerSubject for Athlete {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> SubjectKind {
        SubjectKind::Athlete
    }
    fn mass_kg(&self) -> Option<f64> {
        self.mass_kg
    }
    fn birth_date(&self) -> Option<NaiveDate> {
        parse_birth_date(self.birth_date.as_deref())
    }
    fn sex(&self) -> Sex {
        self.sex
    }
    fn role(&self) -> Option<Role> {
        self.role
    }
    fn profile(&self, state: FatigueState) -> Option<&PowerProfile> {
        self.profiles.get(state)
    }
    fn is_reserve(&self) -> bool {
        self.reserve
    }
}

/// Ekstern kandidat fra scouting. Samme kapabilitet som en rytter, men ikke i troppen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoutCandidate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub club: Option<String>,
    #[serde(default)]
    pub mass_kg: Option<f64>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub sex: Sex,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub profiles: FatigueProfiles,
}

impl ScoutCandidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_mass(mut self, kg: f64) -> Self {
        self.mass_kg = Some(kg);
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_profile(mut self, state: FatigueState, profile: PowerProfile) -> Self {
        self.profiles.set(state, profile);
        self
    }
}

impl PowerSubject for ScoutCandidate {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> SubjectKind {
        SubjectKind::Scout
    }
    fn mass_kg(&self) -> Option<f64> {
        self.mass_kg
    }
    fn birth_date(&self) -> Option<NaiveDate> {
        parse_birth_date(self.birth_date.as_deref())
    }
    fn sex(&self) -> Sex {
        self.sex
    }
    fn role(&self) -> Option<Role> {
        self.role
    }
    fn profile(&self, state: FatigueState) -> Option<&PowerProfile> {
        self.profiles.get(state)
    }
}

impl<T: PowerSubject + ?Sized> PowerSubject for &T {
    fn id(&self) -> &str {
        (**self).id()
    }
    fn name(&self) -> &str {
        (**self).name()
    }
    fn kind(&self) -> SubjectKind {
        (**self).kind()
    }
    fn mass_kg(&self) -> Option<f64> {
        (**self).mass_kg()
    }
    fn birth_date(&self) -> Option<NaiveDate> {
        (**self).birth_date()
    }
    fn sex(&self) -> Sex {
        (**self).sex()
    }
    fn role(&self) -> Option<Role> {
        (**self).role()
    }
    fn profile(&self, state: FatigueState) -> Option<&PowerProfile> {
        (**self).profile(state)
    }
    fn is_reserve(&self) -> bool {
        (**self).is_reserve()
    }
}
