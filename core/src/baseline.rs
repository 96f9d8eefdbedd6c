use std::collections::BTreeMap;

use chrono::{Datelike, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::PowerSubject;
use crate::power::{has_meaningful_profile, power_value};
use crate::types::{AgeCategory, Duration, FatigueState, PowerMode, Sex};

/// Gruppesnitt for én tretthetstilstand og én modus.
///
/// Avledet, aldri kilde til sannhet. En varighet uten gyldige subjekter finnes
/// ikke i kartet (fravær, ikke 0.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAverages {
    pub mode: PowerMode,
    pub fatigue: FatigueState,
    pub reference_year: i32,
    pub team: BTreeMap<Duration, f64>,
    pub by_category: BTreeMap<AgeCategory, BTreeMap<Duration, f64>>,
    pub by_sex: BTreeMap<Sex, BTreeMap<Duration, f64>>,
    /// Antall subjekter bak hvert lagsnitt.
    pub sample_sizes: BTreeMap<Duration, usize>,
    /// Subjekter med meningsfull profil for tilstanden.
    pub subjects_counted: usize,
}

impl GroupAverages {
    pub fn empty(mode: PowerMode, fatigue: FatigueState, reference_year: i32) -> Self {
        Self {
            mode,
            fatigue,
            reference_year,
            team: BTreeMap::new(),
            by_category: BTreeMap::new(),
            by_sex: BTreeMap::new(),
            sample_sizes: BTreeMap::new(),
            subjects_counted: 0,
        }
    }

    pub fn team_value(&self, duration: Duration) -> Option<f64> {
        self.team.get(&duration).copied().filter(|v| *v > 0.0)
    }

    pub fn category_value(&self, category: AgeCategory, duration: Duration) -> Option<f64> {
        if !category.is_known() {
            return None;
        }
        self.by_category
            .get(&category)
            .and_then(|m| m.get(&duration))
            .copied()
            .filter(|v| *v > 0.0)
    }

    pub fn sex_value(&self, sex: Sex, duration: Duration) -> Option<f64> {
        self.by_sex
            .get(&sex)
            .and_then(|m| m.get(&duration))
            .copied()
            .filter(|v| *v > 0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.team.is_empty()
    }
}

#[derive(Default)]
struct MeanAcc {
    sum: f64,
    n: usize,
}

impl MeanAcc {
    fn push(&mut self, v: f64) {
        self.sum += v;
        self.n += 1;
    }

    fn mean(&self) -> Option<f64> {
        if self.n == 0 { None } else { Some(self.sum / self.n as f64) }
    }
}

fn finish(acc: BTreeMap<Duration, MeanAcc>) -> BTreeMap<Duration, f64> {
    acc.into_iter()
        .filter_map(|(d, a)| a.mean().map(|m| (d, m)))
        .collect()
}

pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Gruppesnitt med alderskategori regnet mot inneværende år.
pub fn compute_baselines<S: PowerSubject>(
    subjects: &[S],
    mode: PowerMode,
    state: FatigueState,
) -> GroupAverages {
    compute_baselines_for_year(subjects, mode, state, current_year())
}

/// Gruppesnitt: lag, alderskategori og kjønn, per varighet.
///
/// Kun subjekter med minst én positiv verdi for tilstanden teller, og innen en
/// varighet teller kun positive verdier.
pub fn compute_baselines_for_year<S: PowerSubject>(
    subjects: &[S],
    mode: PowerMode,
    state: FatigueState,
    reference_year: i32,
) -> GroupAverages {
    let mut team: BTreeMap<Duration, MeanAcc> = BTreeMap::new();
    let mut by_cat: BTreeMap<AgeCategory, BTreeMap<Duration, MeanAcc>> = BTreeMap::new();
    let mut by_sex: BTreeMap<Sex, BTreeMap<Duration, MeanAcc>> = BTreeMap::new();
    let mut counted = 0usize;

    for s in subjects {
        if !has_meaningful_profile(s, mode, state) {
            continue;
        }
        counted += 1;
        let category = AgeCategory::from_birth_date(s.birth_date(), reference_year);
        let sex = s.sex();

        for d in Duration::ALL {
            let Some(v) = power_value(s, d, mode, state) else {
                continue;
            };
            team.entry(d).or_default().push(v);
            if category.is_known() {
                by_cat.entry(category).or_default().entry(d).or_default().push(v);
            }
            if sex != Sex::Unknown {
                by_sex.entry(sex).or_default().entry(d).or_default().push(v);
            }
        }
    }

    let sample_sizes = team.iter().map(|(d, a)| (*d, a.n)).collect();
    let out = GroupAverages {
        mode,
        fatigue: state,
        reference_year,
        team: finish(team),
        by_category: by_cat
            .into_iter()
            .map(|(c, acc)| (c, finish(acc)))
            .filter(|(_, m)| !m.is_empty())
            .collect(),
        by_sex: by_sex
            .into_iter()
            .map(|(s, acc)| (s, finish(acc)))
            .filter(|(_, m)| !m.is_empty())
            .collect(),
        sample_sizes,
        subjects_counted: counted,
    };
    debug!(
        "baselines {:?}/{}: {} of {} subjects counted, {} durations",
        mode,
        state,
        counted,
        subjects.len(),
        out.team.len()
    );
    out
}

/// Alle tilstander × moduser, ferdig beregnet før noen detektor leser dem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineSet {
    pub groups: Vec<GroupAverages>,
}

impl BaselineSet {
    pub fn compute<S: PowerSubject>(subjects: &[S], modes: &[PowerMode], reference_year: i32) -> Self {
        let mut groups = Vec::with_capacity(modes.len() * FatigueState::ALL.len());
        for &mode in modes {
            for state in FatigueState::ALL {
                groups.push(compute_baselines_for_year(subjects, mode, state, reference_year));
            }
        }
        Self { groups }
    }

    pub fn get(&self, state: FatigueState, mode: PowerMode) -> Option<&GroupAverages> {
        self.groups
            .iter()
            .find(|g| g.fatigue == state && g.mode == mode)
    }
}
