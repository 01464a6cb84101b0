//! District polygons and per-district risk summaries.
//!
//! The dataset is a GeoJSON FeatureCollection whose features carry `city`,
//! `district` and optional `region` properties with Polygon or MultiPolygon
//! geometry. It is loaded once at startup and never modified.

use nowcast_common::{BoundingBox, Geometry, NowcastError, RiskPoint};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

use crate::zones::mean;

/// Districts reported per city summary.
pub const DEFAULT_DISTRICT_LIMIT: usize = 10;

/// One administrative district.
#[derive(Debug, Clone, PartialEq)]
pub struct District {
    pub city: String,
    pub district: String,
    pub region: Option<String>,
    pub geometry: Geometry,
    bounds: BoundingBox,
}

impl District {
    pub fn new(
        city: impl Into<String>,
        district: impl Into<String>,
        region: Option<String>,
        geometry: Geometry,
    ) -> Result<Self, NowcastError> {
        let bounds = geometry.bounds()?;
        Ok(Self {
            city: city.into(),
            district: district.into(),
            region,
            geometry,
            bounds,
        })
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.bounds.contains_point(lon, lat) && self.geometry.contains(lon, lat)
    }

    /// "City / District" display label.
    pub fn label(&self) -> String {
        format!("{} / {}", self.city, self.district)
    }

    fn in_city(&self, city: &str) -> bool {
        self.city.to_lowercase() == city.trim().to_lowercase()
    }
}

/// Read-only set of districts.
#[derive(Debug, Clone, Default)]
pub struct DistrictIndex {
    districts: Vec<District>,
}

impl DistrictIndex {
    pub fn new(districts: Vec<District>) -> Self {
        Self { districts }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Load from a GeoJSON file. A missing file yields an empty index.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NowcastError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "District dataset not found, district summaries disabled");
            return Ok(Self::empty());
        }

        let raw = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&raw)?;
        let index = Self::from_geojson(&value)?;
        info!(path = %path.display(), districts = index.len(), "Loaded district dataset");
        Ok(index)
    }

    /// Build from a parsed FeatureCollection, skipping unusable features.
    pub fn from_geojson(value: &Value) -> Result<Self, NowcastError> {
        let features = value
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| NowcastError::Dataset("expected a FeatureCollection".to_string()))?;

        let mut districts = Vec::with_capacity(features.len());
        for (idx, feature) in features.iter().enumerate() {
            let props = feature.get("properties");
            let prop = |key: &str| {
                props
                    .and_then(|p| p.get(key))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            };

            let (Some(city), Some(name)) = (prop("city"), prop("district")) else {
                warn!(feature = idx, "District feature missing city/district, skipping");
                continue;
            };

            let parsed = feature
                .get("geometry")
                .ok_or_else(|| NowcastError::InvalidGeometry("missing geometry".to_string()))
                .and_then(Geometry::from_geojson)
                .and_then(|g| District::new(city, name, prop("region"), g));

            match parsed {
                Ok(district) => districts.push(district),
                Err(e) => warn!(feature = idx, error = %e, "Invalid district geometry, skipping"),
            }
        }

        Ok(Self::new(districts))
    }

    pub fn len(&self) -> usize {
        self.districts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }

    pub fn districts(&self) -> &[District] {
        &self.districts
    }

    /// First district containing the point.
    pub fn lookup(&self, lon: f64, lat: f64) -> Option<&District> {
        self.districts.iter().find(|d| d.contains(lon, lat))
    }

    /// Districts of a city, matched case-insensitively.
    pub fn for_city<'a>(&'a self, city: &'a str) -> impl Iterator<Item = &'a District> + 'a {
        self.districts.iter().filter(move |d| d.in_city(city))
    }
}

/// Mean risk over one district's contained points.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictSummary {
    pub city: String,
    pub district: String,
    pub mean_risk: f64,
    pub n: usize,
}

/// Rank a city's districts by mean risk of the points they contain.
///
/// Districts without points are dropped; at most `limit` are returned,
/// highest mean first.
pub fn aggregate_districts(
    points: &[RiskPoint],
    index: &DistrictIndex,
    city: &str,
    limit: usize,
) -> Vec<DistrictSummary> {
    let mut summaries: Vec<DistrictSummary> = index
        .for_city(city)
        .filter_map(|district| {
            let (sum, n) = points
                .iter()
                .filter(|p| district.contains(p.lon(), p.lat()))
                .fold((0.0, 0usize), |(s, n), p| (s + p.risk(), n + 1));

            mean(sum, n).map(|mean_risk| DistrictSummary {
                city: district.city.clone(),
                district: district.district.clone(),
                mean_risk,
                n,
            })
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.mean_risk
            .total_cmp(&a.mean_risk)
            .then_with(|| a.district.cmp(&b.district))
    });
    summaries.truncate(limit);
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(x0: f64, y0: f64, size: f64) -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[x0, y0], [x0 + size, y0], [x0 + size, y0 + size], [x0, y0 + size], [x0, y0]]]
        })
    }

    #[test]
    fn test_from_geojson_skips_bad_features() {
        let fc = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"city": "Izmir", "district": "Bornova", "region": "Aegean"},
                 "geometry": square(27.1, 38.4, 0.2)},
                {"type": "Feature", "properties": {"city": "Izmir", "district": "Broken"},
                 "geometry": {"type": "Point", "coordinates": [27.0, 38.0]}},
                {"type": "Feature", "properties": {"district": "NoCity"},
                 "geometry": square(0.0, 0.0, 1.0)}
            ]
        });

        let index = DistrictIndex::from_geojson(&fc).unwrap();
        assert_eq!(index.len(), 1);
        let d = index.lookup(27.2, 38.5).unwrap();
        assert_eq!(d.label(), "Izmir / Bornova");
        assert_eq!(d.region.as_deref(), Some("Aegean"));
        assert!(index.lookup(26.0, 38.5).is_none());
    }

    #[test]
    fn test_not_a_feature_collection() {
        let err = DistrictIndex::from_geojson(&json!({"type": "Feature"})).unwrap_err();
        assert_eq!(err.error_code(), "DatasetError");
    }

    #[test]
    fn test_city_match_is_case_insensitive() {
        let fc = json!({"features": [
            {"properties": {"city": "Antalya", "district": "Kemer"}, "geometry": square(30.5, 36.5, 0.1)}
        ]});
        let index = DistrictIndex::from_geojson(&fc).unwrap();
        assert_eq!(index.for_city("ANTALYA").count(), 1);
        assert_eq!(index.for_city(" antalya ").count(), 1);
        assert_eq!(index.for_city("Mugla").count(), 0);
    }
}
