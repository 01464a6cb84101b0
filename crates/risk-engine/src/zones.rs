//! Quadrant summaries of a scored grid.

use nowcast_common::{round_to, BoundingBox, RiskPoint};
use serde::Serialize;

/// Quadrant of a bounding box relative to its centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Zone {
    NE,
    NW,
    SE,
    SW,
}

impl Zone {
    /// Reporting order.
    pub const ALL: [Zone; 4] = [Zone::NE, Zone::NW, Zone::SE, Zone::SW];

    /// Points on the centre lines count as north / east.
    pub fn classify(lon: f64, lat: f64, center: (f64, f64)) -> Zone {
        let north = lat >= center.1;
        let east = lon >= center.0;
        match (north, east) {
            (true, true) => Zone::NE,
            (true, false) => Zone::NW,
            (false, true) => Zone::SE,
            (false, false) => Zone::SW,
        }
    }
}

/// Mean risk for one quadrant; `mean_risk` is `None` when it has no points.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSummary {
    pub zone: Zone,
    pub mean_risk: Option<f64>,
    pub n: usize,
}

/// Mean of a running sum, rounded for reporting.
pub(crate) fn mean(sum: f64, n: usize) -> Option<f64> {
    (n > 0).then(|| round_to(sum / n as f64, 3))
}

/// Summarise points into the four quadrants of `bbox`, always in NE, NW, SE, SW order.
pub fn aggregate_zones(points: &[RiskPoint], bbox: &BoundingBox) -> Vec<ZoneSummary> {
    let center = bbox.center();
    let mut sums = [(0.0f64, 0usize); 4];

    for point in points {
        let zone = Zone::classify(point.lon(), point.lat(), center);
        let slot = &mut sums[zone as usize];
        slot.0 += point.risk();
        slot.1 += 1;
    }

    Zone::ALL
        .iter()
        .map(|&zone| {
            let (sum, n) = sums[zone as usize];
            ZoneSummary {
                zone,
                mean_risk: mean(sum, n),
                n,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nowcast_common::RiskProperties;

    fn point(lon: f64, lat: f64, risk: f64) -> RiskPoint {
        RiskPoint::new(
            lon,
            lat,
            RiskProperties {
                risk,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_classify_centre_lines() {
        let c = (1.0, 1.0);
        assert_eq!(Zone::classify(1.0, 1.0, c), Zone::NE);
        assert_eq!(Zone::classify(0.5, 1.0, c), Zone::NW);
        assert_eq!(Zone::classify(1.0, 0.5, c), Zone::SE);
        assert_eq!(Zone::classify(0.5, 0.5, c), Zone::SW);
    }

    #[test]
    fn test_aggregate_with_empty_quadrants() {
        let bbox = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        let points = vec![
            point(1.5, 1.5, 0.8),
            point(1.8, 1.2, 0.4),
            point(0.2, 0.3, 0.1),
        ];

        let zones = aggregate_zones(&points, &bbox);
        assert_eq!(
            zones.iter().map(|z| z.zone).collect::<Vec<_>>(),
            Zone::ALL.to_vec()
        );
        assert_eq!(zones[0].mean_risk, Some(0.6));
        assert_eq!(zones[0].n, 2);
        assert_eq!(zones[1].mean_risk, None);
        assert_eq!(zones[1].n, 0);
        assert_eq!(zones[2].mean_risk, None);
        assert_eq!(zones[3].mean_risk, Some(0.1));
    }

    #[test]
    fn test_zone_json_shape() {
        let bbox = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        let zones = aggregate_zones(&[], &bbox);
        let json = serde_json::to_value(&zones).unwrap();
        assert_eq!(json[0]["zone"], "NE");
        assert!(json[0]["meanRisk"].is_null());
        assert_eq!(json[3]["n"], 0);
    }
}
