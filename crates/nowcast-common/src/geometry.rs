//! Polygon geometry and point-in-polygon tests.
//!
//! Geometries use GeoJSON axis order: positions are `[lon, lat]`, the first
//! ring of a polygon is its exterior and any further rings are holes.

use serde::Deserialize;

use crate::bbox::BoundingBox;
use crate::error::NowcastError;

/// Added to the edge slope denominator so horizontal edges never divide by zero.
const EDGE_EPSILON: f64 = 1e-12;

/// A polygon made of an exterior ring followed by zero or more holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub rings: Vec<Vec<[f64; 2]>>,
}

/// Area geometries accepted by the grid generator and district index.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

/// Ray-casting test against a single closed ring.
///
/// A horizontal ray cast from the point toward +x toggles `inside` each time it
/// crosses an edge. Horizontal edges never satisfy `(yi > y) != (yj > y)` and so
/// contribute no crossings.
pub fn ring_contains(ring: &[[f64; 2]], lon: f64, lat: f64) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];

        if ((yi > lat) != (yj > lat))
            && (lon < (xj - xi) * (lat - yi) / (yj - yi + EDGE_EPSILON) + xi)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Test whether a (lon, lat) point falls inside an area geometry.
pub fn point_in_polygon(point: (f64, f64), geometry: &Geometry) -> bool {
    geometry.contains(point.0, point.1)
}

impl Polygon {
    /// Build a polygon from rings of positions.
    pub fn new(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Self { rings }
    }

    /// Exterior ring (empty slice for a polygon without rings).
    pub fn exterior(&self) -> &[[f64; 2]] {
        self.rings.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Interior rings.
    pub fn holes(&self) -> &[Vec<[f64; 2]>] {
        self.rings.get(1..).unwrap_or(&[])
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        if !ring_contains(self.exterior(), lon, lat) {
            return false;
        }
        !self.holes().iter().any(|hole| ring_contains(hole, lon, lat))
    }

    fn validate(&self) -> Result<(), NowcastError> {
        if self.rings.is_empty() {
            return Err(NowcastError::InvalidGeometry(
                "polygon has no rings".to_string(),
            ));
        }
        for (idx, ring) in self.rings.iter().enumerate() {
            if ring.len() < 4 {
                return Err(NowcastError::InvalidGeometry(format!(
                    "ring {} has {} positions, need at least 4",
                    idx,
                    ring.len()
                )));
            }
            if ring.iter().flatten().any(|v| !v.is_finite()) {
                return Err(NowcastError::InvalidGeometry(format!(
                    "ring {} has a non-finite coordinate",
                    idx
                )));
            }
        }
        Ok(())
    }

    /// Signed area and area-weighted centroid sums of the polygon, holes subtracted.
    fn area_moments(&self) -> (f64, f64, f64) {
        let mut area = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;

        for (idx, ring) in self.rings.iter().enumerate() {
            let (a, x, y) = ring_moments(ring);
            // Orientation is not guaranteed, so weight by magnitude.
            let sign = if idx == 0 { 1.0 } else { -1.0 };
            let scale = if a == 0.0 { 0.0 } else { sign * a.abs() / a };
            area += a * scale;
            cx += x * scale;
            cy += y * scale;
        }

        (area, cx, cy)
    }
}

/// Shoelace terms for one ring: (signed area, Σ cx, Σ cy) with the usual 1/6 factor applied.
fn ring_moments(ring: &[[f64; 2]]) -> (f64, f64, f64) {
    let n = ring.len();
    if n < 3 {
        return (0.0, 0.0, 0.0);
    }

    let mut a = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    let mut j = n - 1;
    for i in 0..n {
        let [x0, y0] = ring[j];
        let [x1, y1] = ring[i];
        let cross = x0 * y1 - x1 * y0;
        a += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
        j = i;
    }

    (a / 2.0, cx / 6.0, cy / 6.0)
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
}

fn to_rings(rings: Vec<Vec<Vec<f64>>>) -> Result<Polygon, NowcastError> {
    let rings = rings
        .into_iter()
        .map(|ring| {
            ring.into_iter()
                .map(|pos| match pos.as_slice() {
                    [lon, lat, ..] => Ok([*lon, *lat]),
                    _ => Err(NowcastError::InvalidGeometry(format!(
                        "position needs at least 2 values, got {}",
                        pos.len()
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(rings))
}

impl Geometry {
    /// Parse a GeoJSON `Polygon` or `MultiPolygon` geometry object.
    pub fn from_geojson(value: &serde_json::Value) -> Result<Self, NowcastError> {
        let raw: RawGeometry = serde_json::from_value(value.clone())
            .map_err(|e| NowcastError::InvalidGeometry(e.to_string()))?;

        let geometry = match raw {
            RawGeometry::Polygon { coordinates } => Geometry::Polygon(to_rings(coordinates)?),
            RawGeometry::MultiPolygon { coordinates } => Geometry::MultiPolygon(
                coordinates
                    .into_iter()
                    .map(to_rings)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };

        geometry.validate()?;
        Ok(geometry)
    }

    fn validate(&self) -> Result<(), NowcastError> {
        match self {
            Geometry::Polygon(p) => p.validate(),
            Geometry::MultiPolygon(parts) => {
                if parts.is_empty() {
                    return Err(NowcastError::InvalidGeometry(
                        "multipolygon has no polygons".to_string(),
                    ));
                }
                parts.iter().try_for_each(Polygon::validate)
            }
        }
    }

    fn polygons(&self) -> &[Polygon] {
        match self {
            Geometry::Polygon(p) => std::slice::from_ref(p),
            Geometry::MultiPolygon(parts) => parts,
        }
    }

    /// A point is inside a multipolygon if any member polygon contains it.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.polygons().iter().any(|p| p.contains(lon, lat))
    }

    /// Bounds of all exterior rings.
    pub fn bounds(&self) -> Result<BoundingBox, NowcastError> {
        let mut positions = self
            .polygons()
            .iter()
            .flat_map(|p| p.exterior().iter());

        let [lon0, lat0] = *positions
            .next()
            .ok_or_else(|| NowcastError::InvalidGeometry("geometry has no positions".to_string()))?;

        let mut bbox = BoundingBox::new(lon0, lat0, lon0, lat0);
        for [lon, lat] in positions {
            bbox = bbox.union(&BoundingBox::new(*lon, *lat, *lon, *lat));
        }
        Ok(bbox)
    }

    /// Area-weighted centroid as (lon, lat).
    ///
    /// Degenerate (zero-area) geometries fall back to the mean exterior vertex.
    pub fn centroid(&self) -> Result<(f64, f64), NowcastError> {
        let (area, cx, cy) = self
            .polygons()
            .iter()
            .map(Polygon::area_moments)
            .fold((0.0, 0.0, 0.0), |acc, m| (acc.0 + m.0, acc.1 + m.1, acc.2 + m.2));

        if area.abs() > f64::EPSILON {
            return Ok((cx / area, cy / area));
        }

        let vertices: Vec<&[f64; 2]> = self
            .polygons()
            .iter()
            .flat_map(|p| p.exterior().iter())
            .collect();
        if vertices.is_empty() {
            return Err(NowcastError::InvalidGeometry(
                "geometry has no positions".to_string(),
            ));
        }
        let n = vertices.len() as f64;
        Ok((
            vertices.iter().map(|v| v[0]).sum::<f64>() / n,
            vertices.iter().map(|v| v[1]).sum::<f64>() / n,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unit_square() -> Vec<[f64; 2]> {
        vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]
    }

    #[test]
    fn test_unit_square_contains() {
        let geometry = Geometry::Polygon(Polygon::new(vec![unit_square()]));
        assert!(point_in_polygon((0.5, 0.5), &geometry));
        assert!(!point_in_polygon((2.0, 2.0), &geometry));
    }

    #[test]
    fn test_hole_excludes_interior() {
        let hole = vec![
            [0.25, 0.25],
            [0.75, 0.25],
            [0.75, 0.75],
            [0.25, 0.75],
            [0.25, 0.25],
        ];
        let geometry = Geometry::Polygon(Polygon::new(vec![unit_square(), hole]));
        assert!(!point_in_polygon((0.5, 0.5), &geometry));
        assert!(point_in_polygon((0.1, 0.1), &geometry));
    }

    #[test]
    fn test_horizontal_edge_on_ray() {
        // Rays at y == 1.0 run along the top edge.
        let geometry = Geometry::Polygon(Polygon::new(vec![unit_square()]));
        assert!(!point_in_polygon((2.0, 1.0), &geometry));
        assert!(!point_in_polygon((-1.0, 1.0), &geometry));
        assert!(point_in_polygon((0.5, 0.999), &geometry));
    }

    #[test]
    fn test_parse_multipolygon_and_centroid() {
        let value = json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]],
                [[[2.0, 0.0], [3.0, 0.0], [3.0, 1.0], [2.0, 1.0], [2.0, 0.0]]]
            ]
        });
        let geometry = Geometry::from_geojson(&value).unwrap();
        assert!(geometry.contains(2.5, 0.5));
        assert!(!geometry.contains(1.5, 0.5));

        let (cx, cy) = geometry.centroid().unwrap();
        assert!((cx - 1.5).abs() < 1e-9);
        assert!((cy - 0.5).abs() < 1e-9);

        let bounds = geometry.bounds().unwrap();
        assert_eq!(bounds, BoundingBox::new(0.0, 0.0, 3.0, 1.0));
    }

    #[test]
    fn test_parse_rejects_point() {
        let value = json!({"type": "Point", "coordinates": [0.0, 0.0]});
        assert!(matches!(
            Geometry::from_geojson(&value),
            Err(NowcastError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_parse_rejects_short_ring() {
        let value = json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]]});
        assert!(Geometry::from_geojson(&value).is_err());
    }
}
