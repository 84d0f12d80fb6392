//! Geographic primitives shared across the workspace.
//!
//! Positions are degrees in GeoJSON axis order (longitude first). Nothing
//! here wraps the antimeridian; the datasets we consume never cross it.

/// A geographic position in degrees, longitude first.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }
}

/// Axis-aligned geographic bounds as south-west and north-east corners.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LngLatBounds {
    pub sw: LngLat,
    pub ne: LngLat,
}

impl LngLatBounds {
    pub fn new(sw: LngLat, ne: LngLat) -> Self {
        Self { sw, ne }
    }

    pub fn from_point(point: LngLat) -> Self {
        Self {
            sw: point,
            ne: point,
        }
    }

    /// Grows the bounds to include `point`.
    pub fn extend(&mut self, point: LngLat) {
        self.sw.lng = self.sw.lng.min(point.lng);
        self.sw.lat = self.sw.lat.min(point.lat);
        self.ne.lng = self.ne.lng.max(point.lng);
        self.ne.lat = self.ne.lat.max(point.lat);
    }

    /// Bounds covering every finite position in `points`, or `None` when
    /// nothing finite remains. Non-finite positions are skipped rather than
    /// poisoning the whole extent.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LngLat>,
    {
        let mut bounds: Option<Self> = None;
        for point in points {
            if !point.is_finite() {
                continue;
            }
            match bounds.as_mut() {
                Some(b) => b.extend(point),
                None => bounds = Some(Self::from_point(point)),
            }
        }
        bounds
    }

    pub fn contains(&self, point: LngLat) -> bool {
        point.lng >= self.sw.lng
            && point.lng <= self.ne.lng
            && point.lat >= self.sw.lat
            && point.lat <= self.ne.lat
    }

    /// `[west, south, east, north]`, the order map cameras expect.
    pub fn to_array(&self) -> [f64; 4] {
        [self.sw.lng, self.sw.lat, self.ne.lng, self.ne.lat]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_grows_in_every_direction() {
        let mut bounds = LngLatBounds::from_point(LngLat::new(2.0, 48.0));
        bounds.extend(LngLat::new(-1.5, 47.0));
        bounds.extend(LngLat::new(7.0, 49.0));
        assert_eq!(bounds.to_array(), [-1.5, 47.0, 7.0, 49.0]);
    }

    #[test]
    fn from_points_skips_non_finite_positions() {
        let bounds = LngLatBounds::from_points(vec![
            LngLat::new(f64::NAN, 0.0),
            LngLat::new(10.0, 20.0),
            LngLat::new(f64::INFINITY, 5.0),
            LngLat::new(12.0, 18.0),
        ])
        .unwrap();
        assert_eq!(bounds.to_array(), [10.0, 18.0, 12.0, 20.0]);
    }

    #[test]
    fn from_points_is_none_when_empty() {
        assert_eq!(LngLatBounds::from_points(Vec::new()), None);
        let only_bad = vec![LngLat::new(f64::NAN, f64::NAN)];
        assert_eq!(LngLatBounds::from_points(only_bad), None);
    }

    #[test]
    fn contains_is_inclusive_on_edges() {
        let bounds = LngLatBounds::new(LngLat::new(0.0, 0.0), LngLat::new(10.0, 10.0));
        assert!(bounds.contains(LngLat::new(0.0, 10.0)));
        assert!(bounds.contains(LngLat::new(5.0, 5.0)));
        assert!(!bounds.contains(LngLat::new(10.1, 5.0)));
    }
}
