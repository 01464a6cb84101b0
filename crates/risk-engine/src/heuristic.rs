//! Weather-only heuristic risk.

/// Clamp to the unit interval.
pub fn clamp01(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 1.0)
}

/// Fire risk from temperature (°C), relative humidity (%) and wind (m/s).
///
/// Temperature is normalised over 10-35 °C, humidity inversely over 0-100 %
/// and wind over 0-12 m/s, weighted 0.5 / 0.3 / 0.2.
pub fn heuristic_risk(temp_c: f64, rh: f64, wind_ms: f64) -> f64 {
    let t = clamp01((temp_c - 10.0) / 25.0);
    let h = clamp01(1.0 - rh / 100.0);
    let w = clamp01(wind_ms / 12.0);
    clamp01(0.5 * t + 0.3 * h + 0.2 * w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_value() {
        // 0.5 * 0.8 + 0.3 * 0.8 + 0.2 * (10 / 12)
        let risk = heuristic_risk(30.0, 20.0, 10.0);
        assert!((risk - 0.806_666_666).abs() < 1e-6);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(heuristic_risk(-40.0, 100.0, 0.0), 0.0);
        assert_eq!(heuristic_risk(50.0, 0.0, 40.0), 1.0);
    }

    #[test]
    fn test_bounded_over_input_sweep() {
        for t in (-30..=55).step_by(5) {
            for rh in (0..=120).step_by(10) {
                for w in [0.0, 3.0, 12.0, 30.0, -1.0] {
                    let r = heuristic_risk(t as f64, rh as f64, w);
                    assert!((0.0..=1.0).contains(&r), "t={t} rh={rh} w={w} r={r}");
                }
            }
        }
        let r = heuristic_risk(f64::NAN, 20.0, 3.0);
        assert!((0.0..=1.0).contains(&r));
    }
}
