//! Regular lon/lat grids over a bounding box or polygon.

use nowcast_common::{BoundingBox, Geometry, NowcastError};

/// Default cap on points per axis.
pub const DEFAULT_MAX_AXIS_POINTS: usize = 200;

/// `n` evenly spaced values from `a` to `b` inclusive.
///
/// `n <= 1` yields `[a]`.
pub fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![a];
    }
    let step = (b - a) / (n - 1) as f64;
    (0..n)
        .map(|i| if i == n - 1 { b } else { a + step * i as f64 })
        .collect()
}

/// A grid of `nx` longitudes by `ny` latitudes over a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub bbox: BoundingBox,
    pub nx: usize,
    pub ny: usize,
}

impl GridSpec {
    /// Validate the box and the axis sizes against `max_axis_points`.
    pub fn new(
        bbox: BoundingBox,
        nx: usize,
        ny: usize,
        max_axis_points: usize,
    ) -> Result<Self, NowcastError> {
        bbox.validate()?;
        for (param, n) in [("nx", nx), ("ny", ny)] {
            if n == 0 || n > max_axis_points {
                return Err(NowcastError::invalid_parameter(
                    param,
                    format!("must be between 1 and {}, got {}", max_axis_points, n),
                ));
            }
        }
        Ok(Self { bbox, nx, ny })
    }

    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grid points as `(lon, lat)`, longitude in the outer loop.
    pub fn points(&self) -> Vec<(f64, f64)> {
        let lons = linspace(self.bbox.min_lon, self.bbox.max_lon, self.nx);
        let lats = linspace(self.bbox.min_lat, self.bbox.max_lat, self.ny);

        let mut points = Vec::with_capacity(lons.len() * lats.len());
        for &lon in &lons {
            for &lat in &lats {
                points.push((lon, lat));
            }
        }
        points
    }

    /// Grid points over the box that fall inside `geometry`.
    pub fn points_within(&self, geometry: &Geometry) -> Vec<(f64, f64)> {
        self.points()
            .into_iter()
            .filter(|&(lon, lat)| geometry.contains(lon, lat))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nowcast_common::Polygon;

    #[test]
    fn test_linspace_endpoints() {
        assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
        assert_eq!(linspace(26.0, 45.0, 2), vec![26.0, 45.0]);
        let v = linspace(0.1, 0.7, 7);
        assert_eq!(v.len(), 7);
        assert_eq!(*v.last().unwrap(), 0.7);
    }

    #[test]
    fn test_linspace_degenerate() {
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
        assert_eq!(linspace(3.0, 9.0, 0), vec![3.0]);
    }

    #[test]
    fn test_points_lon_major() {
        let grid = GridSpec::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 2, 2, 200).unwrap();
        assert_eq!(
            grid.points(),
            vec![(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)]
        );
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn test_rejects_oversized_grid() {
        let bbox = BoundingBox::new(26.0, 36.0, 45.0, 42.0);
        let err = GridSpec::new(bbox, 201, 10, 200).unwrap_err();
        assert_eq!(err.error_code(), "InvalidParameterValue");
        assert!(GridSpec::new(bbox, 10, 0, 200).is_err());
    }

    #[test]
    fn test_rejects_inverted_bbox() {
        let bbox = BoundingBox::new(30.0, 36.0, 26.0, 42.0);
        assert!(GridSpec::new(bbox, 10, 10, 200).is_err());
    }

    #[test]
    fn test_points_within_triangle() {
        let triangle = Geometry::Polygon(Polygon::new(vec![vec![
            [0.0, 0.0],
            [2.0, 0.0],
            [0.0, 2.0],
            [0.0, 0.0],
        ]]));
        let grid = GridSpec::new(triangle.bounds().unwrap(), 5, 5, 200).unwrap();
        let inside = grid.points_within(&triangle);

        assert!(inside.contains(&(0.5, 0.5)));
        assert!(!inside.contains(&(1.5, 1.5)));
        assert!(inside.len() < grid.len());
    }
}
