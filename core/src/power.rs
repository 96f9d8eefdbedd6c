// core/src/power.rs
use crate::models::PowerSubject;
use crate::types::{Duration, FatigueState, PowerMode};

/// Nominell kroppsvekt når verten ikke har registrert vekt (kg).
pub const DEFAULT_MASS_KG: f64 = 70.0;

// --- RoundTo trait (offentlig, brukt i beskrivelser og arkiv) ---
pub trait RoundTo {
    fn round_to(self, dp: u32) -> f64;
}

impl RoundTo for f64 {
    #[inline]
    fn round_to(self, dp: u32) -> f64 {
        if dp == 0 { return self.round(); }
        let factor = 10_f64.powi(dp as i32);
        (self * factor).round() / factor
    }
}

/// Vekt brukt i W/kg: registrert vekt, ellers nominell default.
/// Registrert vekt ≤ 0 (eller ikke-endelig) gir `None`.
#[inline]
pub fn effective_mass(subject: &dyn PowerSubject) -> Option<f64> {
    let kg = subject.mass_kg().unwrap_or(DEFAULT_MASS_KG);
    if kg.is_finite() && kg > 0.0 { Some(kg) } else { None }
}

/// Effekt ved varighet/tretthet, i watt eller W/kg.
///
/// 0.0 betyr "ingen data" – aldri en målt null. Kallere må vakte på `> 0`.
pub fn get_power(
    subject: &dyn PowerSubject,
    duration: Duration,
    mode: PowerMode,
    state: FatigueState,
) -> f64 {
    let Some(watts) = subject.profile(state).and_then(|p| p.get(duration)) else {
        return 0.0;
    };
    match mode {
        PowerMode::Absolute => watts,
        PowerMode::PerKg => match effective_mass(subject) {
            Some(kg) => watts / kg,
            None => 0.0,
        },
    }
}

/// Som `get_power`, men `None` når verdien ikke kan brukes i sammenligninger.
#[inline]
pub fn power_value(
    subject: &dyn PowerSubject,
    duration: Duration,
    mode: PowerMode,
    state: FatigueState,
) -> Option<f64> {
    let v = get_power(subject, duration, mode, state);
    if v.is_finite() && v > 0.0 { Some(v) } else { None }
}

/// Minst én positiv verdi for tilstanden (i valgt modus).
pub fn has_meaningful_profile(
    subject: &dyn PowerSubject,
    mode: PowerMode,
    state: FatigueState,
) -> bool {
    Duration::ALL
        .iter()
        .any(|d| power_value(subject, *d, mode, state).is_some())
}

/// Toleranse på relative terskler. W/kg-deling gir noen ulp støy,
/// så en eksakt 8 % kan ellers havne rett under terskelen.
pub const THRESHOLD_EPS: f64 = 1e-9;

/// (verdi − referanse) / referanse.
#[inline]
pub fn relative_diff(value: f64, reference: f64) -> f64 {
    (value - reference) / reference
}

/// Minst `threshold` over referansen (inklusiv).
#[inline]
pub fn reaches_above(value: f64, reference: f64, threshold: f64) -> bool {
    relative_diff(value, reference) >= threshold - THRESHOLD_EPS
}

/// Minst `threshold` under referansen (inklusiv).
#[inline]
pub fn reaches_below(value: f64, reference: f64, threshold: f64) -> bool {
    relative_diff(value, reference) <= -threshold + THRESHOLD_EPS
}

/// Relativ endring i prosent mot referansen (nevneren), avrundet.
#[inline]
pub fn percent_vs(value: f64, reference: f64) -> i64 {
    (relative_diff(value, reference) * 100.0).round() as i64
}
