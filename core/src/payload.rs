// core/src/payload.rs
//
// JSON-grensen mot verten. Tolerante inn-typer (aliaser for eldre feltnavn)
// konverteres til kjerne-typene før motoren kjøres.

use std::collections::BTreeMap;

use log::debug;
use serde::Deserialize;
use serde_json as json;
use serde_path_to_error as spte;

use crate::archive::{build_archive, EventRecord, RatingRecord};
use crate::config::EngineConfig;
use crate::engine::run_engine;
use crate::error::{EngineError, EngineResult};
use crate::models::{Athlete, FatigueProfiles, ScoutCandidate};
use crate::types::{Duration, FatigueState, PowerProfile, Role, Sex};

// ──────────────────────────────────────────────────────────────────────────────
// TOLERANTE INN-TYPER
// ──────────────────────────────────────────────────────────────────────────────

/// Profil som rå nøkkel → verdi. Nøkler valideres ved konvertering.
type RawProfile = BTreeMap<String, Option<f64>>;

#[derive(Debug, Deserialize, Default)]
struct ProfilesInTol {
    #[serde(default, alias = "0kj")]
    fresh: Option<RawProfile>,
    #[serde(default, rename = "15kj", alias = "low")]
    low: Option<RawProfile>,
    #[serde(default, rename = "30kj", alias = "medium")]
    medium: Option<RawProfile>,
    #[serde(default, rename = "45kj", alias = "high")]
    high: Option<RawProfile>,
}

#[derive(Debug, Deserialize)]
struct SubjectInTol {
    #[serde(alias = "pk", deserialize_with = "id_as_string")]
    id: String,
    #[serde(default, alias = "display_name", alias = "full_name")]
    name: String,
    #[serde(default, alias = "weight", alias = "weight_kg", alias = "mass")]
    mass_kg: Option<f64>,
    #[serde(default, alias = "birthdate", alias = "date_of_birth")]
    birth_date: Option<String>,
    #[serde(default, alias = "gender")]
    sex: Option<String>,
    #[serde(default, alias = "qualitative_profile", alias = "profile")]
    role: Option<String>,
    #[serde(default, alias = "is_reserve")]
    reserve: bool,
    #[serde(default)]
    club: Option<String>,

    #[serde(default, alias = "power_profiles")]
    profiles: ProfilesInTol,

    // Flate legacy-felt: power_fresh / power_15kj / ...
    #[serde(default, alias = "power")]
    power_fresh: Option<RawProfile>,
    #[serde(default)]
    power_15kj: Option<RawProfile>,
    #[serde(default)]
    power_30kj: Option<RawProfile>,
    #[serde(default)]
    power_45kj: Option<RawProfile>,
}

fn id_as_string<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match json::Value::deserialize(d)? {
        json::Value::String(s) => Ok(s),
        json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("id must be string or number, got {other}"))),
    }
}

#[derive(Debug, Deserialize)]
struct EngineIn {
    #[serde(default, alias = "riders")]
    athletes: Vec<SubjectInTol>,
    #[serde(default, alias = "scouting", alias = "candidates")]
    scouts: Vec<SubjectInTol>,
    #[serde(default)]
    config: Option<EngineConfig>,
}

#[derive(Debug, Deserialize)]
struct ArchiveIn {
    season: i32,
    #[serde(default, alias = "riders")]
    athletes: Vec<SubjectInTol>,
    #[serde(default, alias = "rating_history")]
    ratings: Vec<RatingRecord>,
    #[serde(default)]
    events: Vec<EventRecord>,
}

// ──────────────────────────────────────────────────────────────────────────────
// KONVERTERINGER (tolerant → kjerne-typer)
// ──────────────────────────────────────────────────────────────────────────────

/// `at` er JSON-stien til profilen, `id` subjektet; begge følger med i feilen.
fn to_core_profile(raw: RawProfile, at: &str, id: &str) -> EngineResult<PowerProfile> {
    let mut p = PowerProfile::new();
    for (k, v) in raw {
        let d: Duration = k.parse().map_err(|e: EngineError| EngineError::Payload {
            path: format!("{at}.{k}"),
            message: format!("{e} (subject {id})"),
        })?;
        if let Some(w) = v {
            p.set(d, w);
        }
    }
    Ok(p)
}

fn to_core_profiles(s: &mut SubjectInTol, at: &str) -> EngineResult<FatigueProfiles> {
    let mut out = FatigueProfiles::default();
    let slots = [
        (FatigueState::Fresh, s.profiles.fresh.take().or(s.power_fresh.take())),
        (FatigueState::Low, s.profiles.low.take().or(s.power_15kj.take())),
        (FatigueState::Medium, s.profiles.medium.take().or(s.power_30kj.take())),
        (FatigueState::High, s.profiles.high.take().or(s.power_45kj.take())),
    ];
    for (state, raw) in slots {
        if let Some(raw) = raw {
            let profile_at = format!("{at}.profiles.{state}");
            out.set(state, to_core_profile(raw, &profile_at, &s.id)?);
        }
    }
    Ok(out)
}

fn to_core_role(raw: Option<&str>) -> EngineResult<Option<Role>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(r) => r.parse().map(Some),
    }
}

fn to_core_athlete(mut s: SubjectInTol, at: &str) -> EngineResult<Athlete> {
    let profiles = to_core_profiles(&mut s, at)?;
    Ok(Athlete {
        role: to_core_role(s.role.as_deref())?,
        id: s.id,
        name: s.name,
        mass_kg: s.mass_kg,
        birth_date: s.birth_date,
        sex: s.sex.as_deref().map(Sex::parse_lenient).unwrap_or_default(),
        reserve: s.reserve,
        profiles,
    })
}

fn to_core_scout(mut s: SubjectInTol, at: &str) -> EngineResult<ScoutCandidate> {
    let profiles = to_core_profiles(&mut s, at)?;
    Ok(ScoutCandidate {
        role: to_core_role(s.role.as_deref())?,
        id: s.id,
        name: s.name,
        club: s.club,
        mass_kg: s.mass_kg,
        birth_date: s.birth_date,
        sex: s.sex.as_deref().map(Sex::parse_lenient).unwrap_or_default(),
        profiles,
    })
}

fn parse_with_path<'a, T: Deserialize<'a>>(json_in: &'a str) -> EngineResult<T> {
    let mut de = json::Deserializer::from_str(json_in);
    spte::deserialize(&mut de).map_err(EngineError::from_path_error)
}

// ──────────────────────────────────────────────────────────────────────────────
// OFFENTLIGE INNGANGER
// ──────────────────────────────────────────────────────────────────────────────

/// Tolker en roster-payload til kjerne-typer.
pub fn parse_roster(json_in: &str) -> EngineResult<(Vec<Athlete>, Vec<ScoutCandidate>, EngineConfig)> {
    let parsed: EngineIn = parse_with_path(json_in)?;
    let athletes = parsed
        .athletes
        .into_iter()
        .enumerate()
        .map(|(i, s)| to_core_athlete(s, &format!("athletes[{i}]")))
        .collect::<EngineResult<Vec<_>>>()?;
    let scouts = parsed
        .scouts
        .into_iter()
        .enumerate()
        .map(|(i, s)| to_core_scout(s, &format!("scouts[{i}]")))
        .collect::<EngineResult<Vec<_>>>()?;
    Ok((athletes, scouts, parsed.config.unwrap_or_default()))
}

/// JSON inn → `EngineReport` som JSON ut.
pub fn run_engine_json(json_in: &str) -> EngineResult<String> {
    let (athletes, scouts, cfg) = parse_roster(json_in)?;
    debug!("payload: {} athletes, {} scouts", athletes.len(), scouts.len());
    let report = run_engine(&athletes, &scouts, &cfg);
    Ok(json::to_string(&report)?)
}

/// JSON inn → `SeasonArchive` som JSON ut. Avgjør ikke om sesongen kan arkiveres;
/// det gjør `SeasonArchiver` hos verten.
pub fn build_archive_json(json_in: &str) -> EngineResult<String> {
    let parsed: ArchiveIn = parse_with_path(json_in)?;
    let athletes = parsed
        .athletes
        .into_iter()
        .enumerate()
        .map(|(i, s)| to_core_athlete(s, &format!("athletes[{i}]")))
        .collect::<EngineResult<Vec<_>>>()?;
    let archive = build_archive(&athletes, &parsed.ratings, &parsed.events, parsed.season);
    Ok(json::to_string(&archive)?)
}

/// Default-konfig som JSON (for verten).
pub fn default_config_json() -> EngineResult<String> {
    Ok(json::to_string_pretty(&EngineConfig::default())?)
}
