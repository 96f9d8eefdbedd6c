use crate::baseline::BaselineSet;
use crate::config::EngineConfig;
use crate::insights::{Insight, InsightKind, Severity};
use crate::models::PowerSubject;
use crate::power::{power_value, RoundTo};
use crate::types::{Duration, FatigueState, PowerMode, Role};

/// Varighetene en rolle "skal" være sterk på.
pub fn signature_durations(role: Role) -> &'static [Duration] {
    match role {
        Role::Sprinter => &[Duration::S1, Duration::S5, Duration::S30],
        Role::Climber => &[Duration::Min5, Duration::Min12, Duration::Min20, Duration::Cp],
        Role::AllRounder => &[Duration::Min1, Duration::Min5, Duration::Min20],
        Role::Puncher => &[Duration::S30, Duration::Min1, Duration::Min3],
        Role::ClassicsSpecialist => &[Duration::Min1, Duration::Min3, Duration::Min5],
        Role::BreakawaySpecialist => &[Duration::Min12, Duration::Min20, Duration::Cp],
        Role::Complete => &[Duration::S5, Duration::Min1, Duration::Min5, Duration::Min20],
        Role::Other => &[],
    }
}

/// Sjekker at oppgitt rolle synes i profilen, relativt til egen CP.
///
/// For hver signaturvarighet: subjektets verdi/CP mot lagets snitt/snitt-CP.
/// Ligger subjektet mer enn terskelen under lagets forhold → `ProfileMismatch`.
pub fn detect_profile_mismatch(
    subject: &dyn PowerSubject,
    baselines: &BaselineSet,
    mode: PowerMode,
    state: FatigueState,
    cfg: &EngineConfig,
) -> Vec<Insight> {
    let mut out = Vec::new();
    let Some(role) = subject.role() else {
        return out;
    };
    let Some(cp) = power_value(subject, Duration::Cp, mode, state) else {
        return out;
    };
    let Some(group) = baselines.get(state, mode) else {
        return out;
    };
    let Some(team_cp) = group.team_value(Duration::Cp) else {
        return out;
    };

    for &d in signature_durations(role) {
        let Some(value) = power_value(subject, d, mode, state) else {
            continue;
        };
        let Some(team) = group.team_value(d) else {
            continue;
        };
        let ratio = value / cp;
        let team_ratio = team / team_cp;
        if ratio < team_ratio * (1.0 - cfg.profile_mismatch_threshold) {
            let pct = (((ratio - team_ratio) / team_ratio) * 100.0).round() as i64;
            out.push(
                Insight::new(subject, InsightKind::ProfileMismatch, Severity::Warning, mode)
                    .at(d, state)
                    .values(ratio.round_to(3), Some(team_ratio.round_to(3)))
                    .unit("x_cp")
                    .percent(pct)
                    .describe(format!(
                        "{}: listed as {:?} but {} is {:.2}× CP vs team {:.2}× ({}%)",
                        subject.name(),
                        role,
                        d.label(),
                        ratio,
                        team_ratio,
                        pct
                    )),
            );
        }
    }
    out
}
