// core/tests/test_archive.rs
use chrono::NaiveDate;
use squadpower_core::archive::parse_ranking;
use squadpower_core::{
    build_archive, ArchiveInputs, ArchiveOutcome, Athlete, Duration, EngineError, EventRecord, FatigueState,
    PowerProfile, RaterKind, RatingRecord, Role, SeasonArchiver,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn event(id: &str, d: &str, ranking: Option<&str>, debrief: bool, staff: &[&str]) -> EventRecord {
    EventRecord {
        id: id.to_string(),
        name: format!("Ritt {id}"),
        date: date(d),
        final_ranking: ranking.map(str::to_string),
        debrief_completed: debrief,
        staff_ids: staff.iter().map(|s| s.to_string()).collect(),
    }
}

fn rating(athlete: &str, event: &str, rater: &str, kind: RaterKind, d: &str, score: f64) -> RatingRecord {
    RatingRecord {
        athlete_id: athlete.to_string(),
        event_id: Some(event.to_string()),
        rater_id: Some(rater.to_string()),
        rater_kind: kind,
        date: date(d),
        score,
    }
}

fn events() -> Vec<EventRecord> {
    vec![
        event("e1", "2024-04-01", Some("3"), true, &["s1"]),
        event("e2", "2024-06-15", Some("DNF"), false, &["s1", "s2"]),
        event("e3", "2024-09-20", Some("12"), false, &[]),
        // forrige sesong
        event("e0", "2023-08-01", Some("1"), true, &["s1"]),
    ]
}

fn squad() -> Vec<Athlete> {
    vec![
        Athlete::new("a", "Ola")
            .with_mass(70.0)
            .with_role(Role::Climber)
            .with_profile(
                FatigueState::Fresh,
                PowerProfile::new().with(Duration::Cp, 300.0).with(Duration::Min20, 320.0),
            )
            .with_profile(
                FatigueState::Low,
                PowerProfile::new().with(Duration::Cp, 285.0).with(Duration::Min20, 304.0),
            ),
        Athlete::new("b", "Kari")
            .with_mass(60.0)
            .with_role(Role::Sprinter)
            .with_profile(FatigueState::Fresh, PowerProfile::new().with(Duration::Cp, 260.0)),
        Athlete::new("c", "Per"),
    ]
}

fn ratings() -> Vec<RatingRecord> {
    vec![
        rating("a", "e1", "s1", RaterKind::Staff, "2024-04-02", 8.0),
        rating("a", "e2", "p1", RaterKind::Peer, "2024-06-16", 6.0),
        rating("b", "e0", "s1", RaterKind::Staff, "2023-08-02", 9.0),
    ]
}

#[test]
fn history_is_limited_to_the_season() {
    let archive = build_archive(&squad(), &ratings(), &events(), 2024);
    let t = &archive.team;
    assert_eq!(t.event_count, 3);
    assert_eq!(t.ranked_events, 2);
    assert_eq!(t.mean_ranking, Some(7.5));
    assert_eq!(t.best_ranking, Some(3));
    assert_eq!(t.worst_ranking, Some(12));
    assert_eq!(t.debrief_rate, Some(0.333));
}

#[test]
fn staff_quality_from_events_and_ratings() {
    let archive = build_archive(&squad(), &ratings(), &events(), 2024);
    let s1 = archive.staff.iter().find(|s| s.staff_id == "s1").unwrap();
    assert_eq!(s1.events_covered, 2);
    assert_eq!(s1.debriefs_completed, 1);
    assert_eq!(s1.debrief_rate, Some(0.5));
    // 2023-vurderingen teller ikke
    assert_eq!(s1.ratings_given, 1);
    assert_eq!(s1.mean_rating_given, Some(8.0));

    let s2 = archive.staff.iter().find(|s| s.staff_id == "s2").unwrap();
    assert_eq!(s2.events_covered, 1);
    assert_eq!(s2.debrief_rate, Some(0.0));
    // peer-vurderinger gir ingen stab-rad
    assert!(archive.staff.iter().all(|s| s.staff_id != "p1"));
}

#[test]
fn athletes_without_ratings_or_characteristics_are_omitted() {
    let archive = build_archive(&squad(), &ratings(), &events(), 2024);
    let ids: Vec<&str> = archive.athletes.iter().map(|q| q.athlete_id.as_str()).collect();
    assert!(ids.contains(&"a"));
    // b har ingen vurdering i 2024 og sprint-varighetene er ikke målt
    assert!(!ids.contains(&"b"));
    assert!(!ids.contains(&"c"));

    let a = &archive.athletes[0];
    assert_eq!(a.rated_events, 2);
    assert_eq!(a.rating_average, Some(7.0));
    assert!(a.performance_score.is_some());
    // 300→285 og 320→304: 5 % tap i snitt
    assert_eq!(a.fatigue_resistance_score, Some(95.0));
}

#[test]
fn archive_is_created_once_per_season() {
    let mut archiver = SeasonArchiver::new();
    let (athletes, ratings, events) = (squad(), ratings(), events());
    let inputs = ArchiveInputs {
        athletes: &athletes,
        ratings: &ratings,
        events: &events,
    };

    let first = archiver.archive_season(2024, date("2025-02-01"), &inputs).unwrap();
    assert_eq!(first, ArchiveOutcome::Created);
    let snapshot = archiver.get(2024).unwrap().clone();
    assert_eq!(snapshot.created_on, Some(date("2025-02-01")));

    // nye data endrer ikke et eksisterende arkiv
    let more_events = vec![event("e9", "2024-10-01", Some("1"), true, &["s3"])];
    let changed = ArchiveInputs {
        athletes: &athletes,
        ratings: &ratings,
        events: &more_events,
    };
    let second = archiver.archive_season(2024, date("2025-03-01"), &changed).unwrap();
    assert_eq!(second, ArchiveOutcome::AlreadyArchived);
    assert_eq!(archiver.get(2024), Some(&snapshot));
    assert_eq!(archiver.seasons().collect::<Vec<_>>(), vec![2024]);

    // eksplisitt ny beregning erstatter
    let recomputed = archiver.recompute(2024, date("2025-03-01"), &changed).unwrap();
    assert_eq!(recomputed.team.event_count, 1);
}

#[test]
fn default_policy_waits_thirty_days() {
    let mut archiver = SeasonArchiver::new();
    let empty = ArchiveInputs {
        athletes: &[],
        ratings: &[],
        events: &[],
    };
    match archiver.archive_season(2024, date("2025-01-15"), &empty) {
        Err(EngineError::ArchiveRefused { season, .. }) => assert_eq!(season, 2024),
        other => panic!("expected refusal, got {other:?}"),
    }
    assert!(!archiver.is_archived(2024));

    let ok = archiver.archive_season(2024, date("2025-01-30"), &empty).unwrap();
    assert_eq!(ok, ArchiveOutcome::Created);
    assert!(archiver.is_archived(2024));
}

#[test]
fn policy_can_be_injected() {
    let mut archiver = SeasonArchiver::with_policy(|_season: i32, _today: NaiveDate| true);
    let empty = ArchiveInputs {
        athletes: &[],
        ratings: &[],
        events: &[],
    };
    let out = archiver.archive_season(2030, date("2030-06-01"), &empty).unwrap();
    assert_eq!(out, ArchiveOutcome::Created);
}

#[test]
fn restoring_a_duplicate_season_fails() {
    let archive = build_archive(&[], &[], &[], 2023);
    let mut archiver = SeasonArchiver::new();
    archiver.restore(archive.clone()).unwrap();
    assert!(matches!(archiver.restore(archive), Err(EngineError::AlreadyArchived(2023))));
}

#[test]
fn rankings_parse_positive_integers_only() {
    assert_eq!(parse_ranking(" 4 "), Some(4));
    assert_eq!(parse_ranking("DNF"), None);
    assert_eq!(parse_ranking(""), None);
    assert_eq!(parse_ranking("0"), None);
    assert_eq!(parse_ranking("-2"), None);
}

#[test]
fn fatigue_resistance_score_ignores_invalid_mass() {
    let athletes = vec![Athlete::new("z", "Zero")
        .with_mass(0.0)
        .with_profile(FatigueState::Fresh, PowerProfile::new().with(Duration::Cp, 300.0))
        .with_profile(FatigueState::Low, PowerProfile::new().with(Duration::Cp, 270.0))];
    let ratings = vec![rating("z", "e1", "s1", RaterKind::Staff, "2024-04-02", 6.0)];
    let archive = build_archive(&athletes, &ratings, &events(), 2024);
    let z = archive.athletes.iter().find(|q| q.athlete_id == "z").unwrap();
    // 10 % tap → 90, selv uten brukbar vekt
    assert_eq!(z.fatigue_resistance_score, Some(90.0));
}
