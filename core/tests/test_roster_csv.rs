// core/tests/test_roster_csv.rs
//
// Tropp lest fra CSV (én rad per rytter og tretthetstilstand), kjørt gjennom hele motoren.
use std::path::Path;

use serde::Deserialize;
use squadpower_core::{
    run_engine, AlertKind, Athlete, Duration, EngineConfig, FatigueState, InsightKind, PowerMode, PowerProfile,
    Role, Sex,
};

#[derive(Debug, Deserialize)]
struct Row {
    id: String,
    name: String,
    mass_kg: Option<f64>,
    birth_date: Option<String>,
    sex: Option<String>,
    role: Option<String>,
    state: String,
    #[serde(rename = "1s")]
    s1: Option<f64>,
    #[serde(rename = "5s")]
    s5: Option<f64>,
    #[serde(rename = "30s")]
    s30: Option<f64>,
    #[serde(rename = "1min")]
    min1: Option<f64>,
    #[serde(rename = "3min")]
    min3: Option<f64>,
    #[serde(rename = "5min")]
    min5: Option<f64>,
    #[serde(rename = "12min")]
    min12: Option<f64>,
    #[serde(rename = "20min")]
    min20: Option<f64>,
    cp: Option<f64>,
}

impl Row {
    fn profile(&self) -> PowerProfile {
        let cols = [
            (Duration::S1, self.s1),
            (Duration::S5, self.s5),
            (Duration::S30, self.s30),
            (Duration::Min1, self.min1),
            (Duration::Min3, self.min3),
            (Duration::Min5, self.min5),
            (Duration::Min12, self.min12),
            (Duration::Min20, self.min20),
            (Duration::Cp, self.cp),
        ];
        PowerProfile::from_pairs(cols.into_iter().filter_map(|(d, w)| w.map(|w| (d, w))))
    }
}

fn load_roster(path: &Path) -> Vec<Athlete> {
    let mut rdr = csv::Reader::from_path(path).expect("kunne ikke åpne roster.csv");
    let mut squad: Vec<Athlete> = Vec::new();
    for row in rdr.deserialize::<Row>() {
        let row = row.expect("ugyldig rad");
        let state: FatigueState = row.state.parse().expect("ukjent tilstand");
        let profile = row.profile();
        if let Some(a) = squad.iter_mut().find(|a| a.id == row.id) {
            a.profiles.set(state, profile);
            continue;
        }
        let mut a = Athlete::new(row.id.as_str(), row.name.as_str()).with_profile(state, profile);
        a.mass_kg = row.mass_kg;
        a.birth_date = row.birth_date.filter(|s| !s.is_empty());
        a.sex = row.sex.as_deref().map(Sex::parse_lenient).unwrap_or_default();
        a.role = row
            .role
            .as_deref()
            .filter(|r| !r.is_empty())
            .map(|r| r.parse::<Role>().expect("ukjent rolle"));
        squad.push(a);
    }
    squad
}

fn fixture() -> Vec<Athlete> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/roster.csv");
    load_roster(&path)
}

#[test]
fn roster_loads() {
    let squad = fixture();
    assert_eq!(squad.len(), 4);
    assert_eq!(squad[0].role, Some(Role::Climber));
    assert_eq!(squad[1].sex, Sex::Female);
    assert_eq!(squad[3].mass_kg, None);
    assert!(squad[0].profiles.low.is_some());
    assert!(squad[2].profiles.low.is_none());
}

#[test]
fn roster_through_engine() {
    let squad = fixture();
    let cfg = EngineConfig {
        reference_year: Some(2025),
        ..EngineConfig::default()
    };
    let report = run_engine(&squad, &[], &cfg);

    let fresh = report.baselines.get(FatigueState::Fresh, PowerMode::PerKg).unwrap();
    assert_eq!(fresh.subjects_counted, 3);

    let find = |id: &str, kind: InsightKind| {
        report
            .insights
            .iter()
            .find(|i| i.subject_id == id && i.kind == kind)
    };

    // Ola holder seg: maks tap 3 % på 20 min
    let ola = find("r1", InsightKind::FatigueResistance).unwrap();
    assert_eq!(ola.fatigue, Some(FatigueState::Low));
    assert_eq!(ola.duration, Some(Duration::Min20));
    assert!(find("r1", InsightKind::FatigueRegression).is_none());

    // Kari: CP 250 → 208 etter 15 kJ
    let kari = find("r2", InsightKind::FatigueRegression).unwrap();
    assert_eq!(kari.duration, Some(Duration::Cp));
    assert_eq!(kari.fatigue, Some(FatigueState::Low));
    assert_eq!(kari.percent, Some(-17));

    let alert = |id: &str| -> Vec<AlertKind> {
        report
            .alerts
            .iter()
            .filter(|a| a.subject_id == id)
            .map(|a| a.kind)
            .collect()
    };
    assert!(alert("r3").contains(&AlertKind::FatigueDataMissing));
    assert_eq!(alert("r4"), vec![AlertKind::MissingPowerData]);
    assert!(alert("r2").contains(&AlertKind::FatigueRegression));
}
