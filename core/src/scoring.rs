/// Vektet snitt av delscorer (0–100). Manglende deler re-vektes bort.
///
/// `None` når ingen del har verdi eller summen av vekter er 0.
pub fn combine_scores(parts: &[(Option<f64>, f64)]) -> Option<f64> {
    let mut sum = 0.0f64;
    let mut wsum = 0.0f64;
    for (score, w) in parts {
        if let Some(s) = score {
            if s.is_finite() && *w > 0.0 {
                sum += s * w;
                wsum += w;
            }
        }
    }
    if wsum > 0.0 {
        Some((sum / wsum).clamp(0.0, 100.0))
    } else {
        None
    }
}

/// Karakteristikk-score: 50 = lagsnitt, 100 = dobbelt lagsnitt.
pub fn characteristic_score(value: f64, team: f64) -> f64 {
    if value <= 0.0 || team <= 0.0 {
        return 0.0;
    }
    (50.0 * value / team).clamp(0.0, 100.0)
}

/// Vurdering 0–10 → 0–100.
pub fn rating_to_score(rating: f64) -> f64 {
    (rating * 10.0).clamp(0.0, 100.0)
}
