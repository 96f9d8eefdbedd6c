// core/tests/test_engine.rs
use squadpower_core::metrics::gather_metrics;
use squadpower_core::{
    run_engine, AlertKind, Athlete, Duration, EngineConfig, FatigueState, InsightKind, PowerMode, PowerProfile,
    Role, ScoutCandidate, Severity, SubjectKind,
};

fn cfg() -> EngineConfig {
    EngineConfig {
        reference_year: Some(2025),
        ..EngineConfig::default()
    }
}

fn cp_rider(id: &str, cp: f64) -> Athlete {
    Athlete::new(id, id)
        .with_mass(70.0)
        .with_profile(FatigueState::Fresh, PowerProfile::new().with(Duration::Cp, cp))
}

fn mixed_squad() -> Vec<Athlete> {
    vec![
        cp_rider("ola", 300.0)
            .with_role(Role::Climber)
            .with_birth_date("1998-04-02")
            .with_profile(FatigueState::Low, PowerProfile::new().with(Duration::Cp, 250.0)),
        cp_rider("kari", 340.0)
            .with_birth_date("2007-09-09")
            .with_profile(FatigueState::Low, PowerProfile::new().with(Duration::Cp, 335.0)),
        cp_rider("per", 260.0),
        Athlete::new("nils", "nils"),
    ]
}

#[test]
fn same_input_gives_same_report() {
    let squad = mixed_squad();
    let scouts = vec![ScoutCandidate::new("x", "x")
        .with_mass(65.0)
        .with_profile(FatigueState::Fresh, PowerProfile::new().with(Duration::Cp, 320.0))];
    let first = run_engine(&squad, &scouts, &cfg());
    let second = run_engine(&squad, &scouts, &cfg());
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(first.reference_year, 2025);
}

#[test]
fn scout_is_only_compared_as_scout() {
    let squad = vec![cp_rider("a", 300.0), cp_rider("b", 300.0)];
    // 318/70 mot 300/70: +6 %, over scout-terskelen men under 8 %
    let scouts = vec![ScoutCandidate::new("s", "Scout")
        .with_mass(70.0)
        .with_profile(FatigueState::Fresh, PowerProfile::new().with(Duration::Cp, 318.0))];
    let report = run_engine(&squad, &scouts, &cfg());

    let scout_insights: Vec<_> = report
        .insights
        .iter()
        .filter(|i| i.subject_kind == SubjectKind::Scout)
        .collect();
    assert_eq!(scout_insights.len(), 1);
    assert_eq!(scout_insights[0].kind, InsightKind::ScoutMatch);
    assert_eq!(scout_insights[0].severity, Severity::Info);
    assert_eq!(scout_insights[0].percent, Some(6));
    assert_eq!(scout_insights[0].mode, PowerMode::PerKg);

    // scouten flytter ikke lagsnittet
    let g = report.baselines.get(FatigueState::Fresh, PowerMode::PerKg).unwrap();
    assert_eq!(g.subjects_counted, 2);

    let scout_alerts: Vec<_> = report.alerts.iter().filter(|a| a.subject_id == "s").collect();
    assert_eq!(scout_alerts.len(), 1);
    assert_eq!(scout_alerts[0].kind, AlertKind::ScoutAboveTeam);
    assert!(scout_alerts[0].action.is_some());
}

#[test]
fn alerts_cover_missing_data_and_findings() {
    let report = run_engine(&mixed_squad(), &[], &cfg());
    let kinds_for = |id: &str| -> Vec<AlertKind> {
        report
            .alerts
            .iter()
            .filter(|a| a.subject_id == id)
            .map(|a| a.kind)
            .collect()
    };

    assert_eq!(kinds_for("nils"), vec![AlertKind::MissingPowerData]);
    assert!(kinds_for("per").contains(&AlertKind::FatigueDataMissing));
    // 300 → 250: −17 %
    assert!(kinds_for("ola").contains(&AlertKind::FatigueRegression));
    assert!(!kinds_for("kari").contains(&AlertKind::FatigueDataMissing));

    let regression = report
        .alerts
        .iter()
        .find(|a| a.kind == AlertKind::FatigueRegression)
        .unwrap();
    assert_eq!(regression.action.as_deref(), AlertKind::FatigueRegression.action_hint());
    assert_eq!(regression.fatigue, Some(FatigueState::Low));

    // datamangel kommer før funn-baserte alerts
    let first_finding = report
        .alerts
        .iter()
        .position(|a| !matches!(a.kind, AlertKind::MissingPowerData | AlertKind::FatigueDataMissing))
        .unwrap();
    assert!(report.alerts[first_finding..]
        .iter()
        .all(|a| !matches!(a.kind, AlertKind::MissingPowerData | AlertKind::FatigueDataMissing)));
}

#[test]
fn fatigued_deviation_gives_insight_but_no_alert() {
    let report = run_engine(&mixed_squad(), &[], &cfg());
    let fatigued_above = report
        .insights
        .iter()
        .any(|i| i.kind == InsightKind::AboveTeamAverage && i.fatigue == Some(FatigueState::Low));
    // kari 335 mot snitt 292.5 i 15kj
    assert!(fatigued_above);
    assert!(report
        .alerts
        .iter()
        .filter(|a| a.kind == AlertKind::AboveTeamAverage)
        .all(|a| a.fatigue == Some(FatigueState::Fresh)));
}

#[test]
fn reserves_can_be_left_out_of_baseline() {
    let squad = vec![cp_rider("a", 300.0), cp_rider("r", 400.0).as_reserve()];
    let both_modes = EngineConfig {
        modes: vec![PowerMode::Absolute],
        ..cfg()
    };

    let with_reserve = run_engine(&squad, &[], &both_modes);
    let g = with_reserve.baselines.get(FatigueState::Fresh, PowerMode::Absolute).unwrap();
    assert_eq!(g.team_value(Duration::Cp), Some(350.0));

    let cfg_ex = EngineConfig {
        exclude_reserves_from_baseline: true,
        ..both_modes
    };
    let without = run_engine(&squad, &[], &cfg_ex);
    let g = without.baselines.get(FatigueState::Fresh, PowerMode::Absolute).unwrap();
    assert_eq!(g.team_value(Duration::Cp), Some(300.0));
    // reserven vurderes fortsatt
    assert!(without
        .insights
        .iter()
        .any(|i| i.subject_id == "r" && i.kind == InsightKind::AboveTeamAverage));
}

#[test]
fn invalid_thresholds_fall_back_to_defaults() {
    let bad = EngineConfig {
        above_team_threshold: -1.0,
        scout_threshold: f64::NAN,
        modes: vec![],
        ..cfg()
    };
    let squad = vec![cp_rider("a", 300.0), cp_rider("b", 330.0)];
    let report = run_engine(&squad, &[], &bad);
    let good = run_engine(&squad, &[], &cfg());
    assert_eq!(report.insights, good.insights);
}

#[test]
fn runs_are_counted() {
    run_engine(&[cp_rider("a", 300.0)], &[], &cfg());
    let text = gather_metrics().unwrap();
    assert!(text.contains("squadpower_engine_runs_total"));
}
