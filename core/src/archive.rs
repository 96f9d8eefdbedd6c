// core/src/archive.rs
use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use log::{info, warn};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::baseline::BaselineSet;
use crate::error::{EngineError, EngineResult};
use crate::fatigue::level_regression;
use crate::metrics::archive_request_total;
use crate::models::Athlete;
use crate::power::{power_value, RoundTo};
use crate::profile_check::signature_durations;
use crate::scoring::{characteristic_score, combine_scores, rating_to_score};
use crate::types::{Duration, FatigueState, PowerMode, Role};

// Vekter for samlet prestasjonsscore
const W_RATINGS: f64 = 0.6;
const W_CHARACTERISTICS: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaterKind {
    Peer,
    Staff,
}

/// Én vurdering (0–10) av en rytter, typisk etter et ritt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub athlete_id: String,
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub rater_id: Option<String>,
    pub rater_kind: RaterKind,
    pub date: NaiveDate,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub date: NaiveDate,
    /// Sluttplassering som fritekst fra verten ("3", "DNF", ...).
    #[serde(default)]
    pub final_ranking: Option<String>,
    #[serde(default)]
    pub debrief_completed: bool,
    #[serde(default)]
    pub staff_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteQuality {
    pub athlete_id: String,
    pub name: String,
    pub role: Option<Role>,
    /// Rollens signaturvarigheter, 50 = lagsnitt.
    pub characteristic_scores: BTreeMap<Duration, f64>,
    /// Snitt av vurderinger i sesongen (0–10).
    pub rating_average: Option<f64>,
    pub performance_score: Option<f64>,
    pub fatigue_resistance_score: Option<f64>,
    pub rated_events: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffQuality {
    pub staff_id: String,
    pub events_covered: usize,
    pub debriefs_completed: usize,
    pub debrief_rate: Option<f64>,
    pub ratings_given: usize,
    pub mean_rating_given: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSeasonMetrics {
    pub event_count: usize,
    pub ranked_events: usize,
    pub mean_ranking: Option<f64>,
    pub best_ranking: Option<i32>,
    pub worst_ranking: Option<i32>,
    pub debrief_rate: Option<f64>,
}

/// Sesongens øyeblikksbilde. Endres ikke etter opprettelse, kun ved eksplisitt ny beregning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonArchive {
    pub season: i32,
    #[serde(default)]
    pub created_on: Option<NaiveDate>,
    pub group_averages: BaselineSet,
    pub athletes: Vec<AthleteQuality>,
    pub staff: Vec<StaffQuality>,
    pub team: TeamSeasonMetrics,
}

fn in_season(date: NaiveDate, season: i32) -> bool {
    date.year() == season
}

/// Plassering som heltall; "DNF", "" og ≤ 0 utelates.
pub fn parse_ranking(raw: &str) -> Option<i32> {
    let r: i32 = raw.trim().parse().ok()?;
    if r > 0 { Some(r) } else { None }
}

fn team_metrics(events: &[&EventRecord]) -> TeamSeasonMetrics {
    let rankings: Vec<i32> = events
        .iter()
        .filter_map(|e| e.final_ranking.as_deref().and_then(parse_ranking))
        .collect();
    let debriefs = events.iter().filter(|e| e.debrief_completed).count();

    TeamSeasonMetrics {
        event_count: events.len(),
        ranked_events: rankings.len(),
        mean_ranking: if rankings.is_empty() {
            None
        } else {
            Some((rankings.iter().map(|r| *r as f64).sum::<f64>() / rankings.len() as f64).round_to(2))
        },
        best_ranking: rankings.iter().min().copied(),
        worst_ranking: rankings.iter().max().copied(),
        debrief_rate: if events.is_empty() {
            None
        } else {
            Some((debriefs as f64 / events.len() as f64).round_to(3))
        },
    }
}

fn staff_quality(events: &[&EventRecord], ratings: &[&RatingRecord]) -> Vec<StaffQuality> {
    #[derive(Default)]
    struct Acc {
        events: usize,
        debriefs: usize,
        ratings: Vec<f64>,
    }
    let mut by_staff: BTreeMap<&str, Acc> = BTreeMap::new();
    for e in events {
        for s in &e.staff_ids {
            let acc = by_staff.entry(s.as_str()).or_default();
            acc.events += 1;
            if e.debrief_completed {
                acc.debriefs += 1;
            }
        }
    }
    for r in ratings {
        if r.rater_kind != RaterKind::Staff {
            continue;
        }
        if let Some(id) = r.rater_id.as_deref() {
            by_staff.entry(id).or_default().ratings.push(r.score);
        }
    }

    by_staff
        .into_iter()
        .map(|(id, acc)| StaffQuality {
            staff_id: id.to_string(),
            events_covered: acc.events,
            debriefs_completed: acc.debriefs,
            debrief_rate: if acc.events == 0 {
                None
            } else {
                Some((acc.debriefs as f64 / acc.events as f64).round_to(3))
            },
            ratings_given: acc.ratings.len(),
            mean_rating_given: mean(&acc.ratings).map(|m| m.round_to(2)),
        })
        .collect()
}

fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        None
    } else {
        Some(xs.iter().sum::<f64>() / xs.len() as f64)
    }
}

/// 100 × (1 − snitt-tap over målbare tretthetsnivåer). Regnes i watt, så
/// manglende eller ugyldig vekt ikke skjuler tretthetsdata.
fn fatigue_resistance_score(a: &Athlete) -> Option<f64> {
    let losses: Vec<f64> = FatigueState::FATIGUED
        .iter()
        .filter_map(|l| level_regression(a, PowerMode::Absolute, *l))
        .map(|lr| lr.mean_regression)
        .collect();
    mean(&losses).map(|m| (100.0 * (1.0 - m)).clamp(0.0, 100.0).round_to(1))
}

fn athlete_quality(
    a: &Athlete,
    baselines: &BaselineSet,
    ratings: &[&RatingRecord],
) -> Option<AthleteQuality> {
    let own: Vec<&RatingRecord> = ratings
        .iter()
        .copied()
        .filter(|r| r.athlete_id == a.id && r.score.is_finite())
        .collect();
    let scores: Vec<f64> = own.iter().map(|r| r.score).collect();
    let rated_events = own
        .iter()
        .filter_map(|r| r.event_id.as_deref())
        .collect::<BTreeSet<_>>()
        .len();

    let mut characteristic_scores = BTreeMap::new();
    if let (Some(role), Some(group)) = (a.role, baselines.get(FatigueState::Fresh, PowerMode::PerKg)) {
        for &d in signature_durations(role) {
            let score = match (power_value(a, d, PowerMode::PerKg, FatigueState::Fresh), group.team_value(d)) {
                (Some(v), Some(t)) => characteristic_score(v, t),
                _ => 0.0,
            };
            characteristic_scores.insert(d, score.round_to(1));
        }
    }

    let has_characteristics = characteristic_scores.values().any(|s| *s > 0.0);
    if rated_events == 0 && !has_characteristics {
        return None;
    }

    let rating_average = mean(&scores);
    let char_mean = if has_characteristics {
        mean(&characteristic_scores.values().copied().collect::<Vec<_>>())
    } else {
        None
    };
    let performance_score = combine_scores(&[
        (rating_average.map(rating_to_score), W_RATINGS),
        (char_mean, W_CHARACTERISTICS),
    ])
    .map(|s| s.round_to(1));

    Some(AthleteQuality {
        athlete_id: a.id.clone(),
        name: a.name.clone(),
        role: a.role,
        characteristic_scores,
        rating_average: rating_average.map(|r| r.round_to(2)),
        performance_score,
        fatigue_resistance_score: fatigue_resistance_score(a),
        rated_events,
    })
}

/// Sesongarkiv for et kalenderår. All historikk filtreres til sesongvinduet.
pub fn build_archive(
    athletes: &[Athlete],
    rating_history: &[RatingRecord],
    events: &[EventRecord],
    season: i32,
) -> SeasonArchive {
    let ratings: Vec<&RatingRecord> = rating_history
        .iter()
        .filter(|r| in_season(r.date, season))
        .collect();
    let events: Vec<&EventRecord> = events.iter().filter(|e| in_season(e.date, season)).collect();

    let group_averages = BaselineSet::compute(athletes, &[PowerMode::PerKg, PowerMode::Absolute], season);

    let mut quality: Vec<AthleteQuality> = athletes
        .iter()
        .filter_map(|a| athlete_quality(a, &group_averages, &ratings))
        .collect();
    // Høyest score først; uten score sist, ellers stabil rekkefølge.
    quality.sort_by_key(|q| std::cmp::Reverse(OrderedFloat(q.performance_score.unwrap_or(-1.0))));

    SeasonArchive {
        season,
        created_on: None,
        group_averages,
        athletes: quality,
        staff: staff_quality(&events, &ratings),
        team: team_metrics(&events),
    }
}

/// Når et sesongarkiv får lages. Injiseres i `SeasonArchiver`.
pub trait ArchivePolicy {
    /// `Err(grunn)` når arkivering ikke er tillatt ennå.
    fn check(&self, season: i32, today: NaiveDate) -> Result<(), String>;
}

/// Standard: minst N dager etter 31. desember i sesongen.
#[derive(Debug, Clone, Copy)]
pub struct MinDaysAfterSeasonEnd(pub i64);

impl Default for MinDaysAfterSeasonEnd {
    fn default() -> Self {
        MinDaysAfterSeasonEnd(30)
    }
}

impl ArchivePolicy for MinDaysAfterSeasonEnd {
    fn check(&self, season: i32, today: NaiveDate) -> Result<(), String> {
        let Some(end) = NaiveDate::from_ymd_opt(season, 12, 31) else {
            return Err(format!("invalid season {season}"));
        };
        let elapsed = (today - end).num_days();
        if elapsed >= self.0 {
            Ok(())
        } else {
            Err(format!("{elapsed} days since season end, {} required", self.0))
        }
    }
}

impl<F> ArchivePolicy for F
where
    F: Fn(i32, NaiveDate) -> bool,
{
    fn check(&self, season: i32, today: NaiveDate) -> Result<(), String> {
        if self(season, today) {
            Ok(())
        } else {
            Err("rejected by archive policy".to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    Created,
    AlreadyArchived,
}

pub struct ArchiveInputs<'a> {
    pub athletes: &'a [Athlete],
    pub ratings: &'a [RatingRecord],
    pub events: &'a [EventRecord],
}

/// Holder styr på hvilke sesonger som er arkivert. Maks ett arkiv per sesong.
pub struct SeasonArchiver {
    archives: BTreeMap<i32, SeasonArchive>,
    policy: Box<dyn ArchivePolicy + Send + Sync>,
}

impl Default for SeasonArchiver {
    fn default() -> Self {
        Self::new()
    }
}

impl SeasonArchiver {
    pub fn new() -> Self {
        Self::with_policy(MinDaysAfterSeasonEnd::default())
    }

    pub fn with_policy<P: ArchivePolicy + Send + Sync + 'static>(policy: P) -> Self {
        Self {
            archives: BTreeMap::new(),
            policy: Box::new(policy),
        }
    }

    /// Legg inn et arkiv verten allerede har lagret.
    pub fn restore(&mut self, archive: SeasonArchive) -> EngineResult<()> {
        if self.archives.contains_key(&archive.season) {
            return Err(EngineError::AlreadyArchived(archive.season));
        }
        self.archives.insert(archive.season, archive);
        Ok(())
    }

    pub fn is_archived(&self, season: i32) -> bool {
        self.archives.contains_key(&season)
    }

    pub fn get(&self, season: i32) -> Option<&SeasonArchive> {
        self.archives.get(&season)
    }

    pub fn seasons(&self) -> impl Iterator<Item = i32> + '_ {
        self.archives.keys().copied()
    }

    /// Lag arkiv for sesongen om det ikke finnes. Andre kall er en no-op.
    pub fn archive_season(
        &mut self,
        season: i32,
        today: NaiveDate,
        inputs: &ArchiveInputs<'_>,
    ) -> EngineResult<ArchiveOutcome> {
        if self.archives.contains_key(&season) {
            info!("season {season} already archived, nothing to do");
            archive_request_total("already_archived");
            return Ok(ArchiveOutcome::AlreadyArchived);
        }
        self.store(season, today, inputs)?;
        archive_request_total("created");
        Ok(ArchiveOutcome::Created)
    }

    /// Eksplisitt ny beregning; erstatter eksisterende arkiv.
    pub fn recompute(
        &mut self,
        season: i32,
        today: NaiveDate,
        inputs: &ArchiveInputs<'_>,
    ) -> EngineResult<&SeasonArchive> {
        self.store(season, today, inputs)?;
        archive_request_total("recomputed");
        self.archives
            .get(&season)
            .ok_or_else(|| EngineError::ArchiveRefused {
                season,
                reason: "archive missing after store".to_string(),
            })
    }

    fn store(&mut self, season: i32, today: NaiveDate, inputs: &ArchiveInputs<'_>) -> EngineResult<()> {
        if let Err(reason) = self.policy.check(season, today) {
            warn!("season {season} not archived: {reason}");
            archive_request_total("refused");
            return Err(EngineError::ArchiveRefused { season, reason });
        }
        let mut archive = build_archive(inputs.athletes, inputs.ratings, inputs.events, season);
        archive.created_on = Some(today);
        info!(
            "season {season} archived: {} athletes, {} staff, {} events",
            archive.athletes.len(),
            archive.staff.len(),
            archive.team.event_count
        );
        self.archives.insert(season, archive);
        Ok(())
    }
}
