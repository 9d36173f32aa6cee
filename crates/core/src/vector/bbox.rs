//! Axis-aligned bounding boxes

use geo::{BoundingRect, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in map units (`x` = longitude, `y` = latitude
/// for geographic coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Bounding box of a multipolygon, `None` when it has no coordinates
    pub fn of(geometry: &MultiPolygon<f64>) -> Option<Self> {
        geometry.bounding_rect().map(|rect| Self {
            min_x: rect.min().x,
            min_y: rect.min().y,
            max_x: rect.max().x,
            max_y: rect.max().y,
        })
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    /// Whether every coordinate is finite and the box is not inverted
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Grow the box by `margin` on every side
    pub fn expand(&self, margin: f64) -> Self {
        Self::new(
            self.min_x - margin,
            self.min_y - margin,
            self.max_x + margin,
            self.max_y + margin,
        )
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (self.min_x, self.min_y),
                (self.max_x, self.min_y),
                (self.max_x, self.max_y),
                (self.min_x, self.max_y),
                (self.min_x, self.min_y),
            ]),
            vec![],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_multipolygon() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0).to_polygon();
        let b = BoundingBox::new(3.0, -2.0, 4.0, 0.5).to_polygon();
        let bbox = BoundingBox::of(&MultiPolygon::new(vec![a, b])).unwrap();
        assert_eq!(bbox, BoundingBox::new(0.0, -2.0, 4.0, 1.0));
        assert_eq!(bbox.center(), (2.0, -0.5));
    }

    #[test]
    fn test_empty_multipolygon_has_no_bbox() {
        assert!(BoundingBox::of(&MultiPolygon::<f64>::new(vec![])).is_none());
    }

    #[test]
    fn test_intersects_and_expand() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = BoundingBox::new(1.5, 0.0, 2.0, 1.0);
        assert!(!a.intersects(&b));
        assert!(a.expand(0.5).intersects(&b));
        assert!(!BoundingBox::new(1.0, 0.0, 0.0, 1.0).is_valid());
    }
}
