//! Adaptateur de géométrie
//!
//! Enveloppe une géométrie GeoJSON brute dans une forme exploitable
//! (emprise, centroïde, intersection, distance). Une géométrie absente ou
//! illisible devient [`Shape::Empty`] au lieu de remonter une erreur : une
//! parcelle corrompue dégrade l'ensemble candidat sans faire échouer la requête.

use geo::{
    BoundingRect, Centroid, Coord, CoordsIter, EuclideanDistance, Geometry, Intersects,
    MultiPolygon, Point, Polygon,
};
use serde_json::Value;

use crate::{BoundingBox, ParcelleError};

/// Géométrie normalisée
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Géométrie absente ou invalide
    Empty,
    /// Point
    Point(Point<f64>),
    /// Polygone ou multipolygone
    Area(MultiPolygon<f64>),
}

impl Shape {
    /// Construit depuis une géométrie GeoJSON brute, `Empty` en cas d'échec
    pub fn from_geojson(payload: Option<&Value>) -> Shape {
        let Some(payload) = payload else {
            return Shape::Empty;
        };

        match Self::try_from_geojson(payload) {
            Ok(shape) => shape,
            Err(e) => {
                tracing::debug!(error = %e, "Dropping malformed geometry");
                Shape::Empty
            }
        }
    }

    /// Construit depuis une géométrie GeoJSON brute
    pub fn try_from_geojson(payload: &Value) -> Result<Shape, ParcelleError> {
        let kind = payload
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        let geometry = geojson::Geometry::from_json_value(payload.clone())
            .map_err(|e| ParcelleError::invalid_geometry(&kind, e.to_string()))?;
        let geometry = Geometry::<f64>::try_from(geometry.value)
            .map_err(|e| ParcelleError::invalid_geometry(&kind, e.to_string()))?;

        Self::from_geo(geometry).ok_or_else(|| {
            ParcelleError::invalid_geometry(kind, "unsupported or degenerate geometry")
        })
    }

    /// Convertit une géométrie `geo`, `None` si non supportée ou dégénérée
    pub fn from_geo(geometry: Geometry<f64>) -> Option<Shape> {
        let shape = match geometry {
            Geometry::Point(p) => Shape::Point(p),
            Geometry::Polygon(p) => Shape::Area(MultiPolygon::new(vec![p])),
            Geometry::MultiPolygon(mp) => Shape::Area(mp),
            Geometry::Rect(r) => Shape::Area(MultiPolygon::new(vec![r.to_polygon()])),
            Geometry::Triangle(t) => Shape::Area(MultiPolygon::new(vec![t.to_polygon()])),
            _ => return None,
        };

        shape.is_valid().then_some(shape)
    }

    /// Enveloppe un polygone
    pub fn from_polygon(polygon: Polygon<f64>) -> Shape {
        Self::from_geo(Geometry::Polygon(polygon)).unwrap_or(Shape::Empty)
    }

    fn is_valid(&self) -> bool {
        match self {
            Shape::Empty => false,
            Shape::Point(p) => p.x().is_finite() && p.y().is_finite(),
            Shape::Area(mp) => {
                !mp.0.is_empty()
                    && mp.0.iter().all(|p| p.exterior().0.len() >= 3)
                    && mp.coords_iter().all(|c| c.x.is_finite() && c.y.is_finite())
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Shape::Empty)
    }

    /// Vrai pour un polygone ou multipolygone
    pub fn is_area(&self) -> bool {
        matches!(self, Shape::Area(_))
    }

    /// Emprise (min/max lon/lat)
    pub fn bounds(&self) -> Option<BoundingBox> {
        match self {
            Shape::Empty => None,
            Shape::Point(p) => Some(BoundingBox::new(p.y(), p.x(), p.y(), p.x())),
            Shape::Area(mp) => mp.bounding_rect().map(|rect| {
                let Coord { x: west, y: south } = rect.min();
                let Coord { x: east, y: north } = rect.max();
                BoundingBox::new(south, west, north, east)
            }),
        }
    }

    /// Centroïde
    pub fn centroid(&self) -> Option<Point<f64>> {
        match self {
            Shape::Empty => None,
            Shape::Point(p) => Some(*p),
            Shape::Area(mp) => mp.centroid(),
        }
    }

    /// Vrai si les formes partagent au moins un point (bords inclus)
    pub fn intersects(&self, other: &Shape) -> bool {
        match (self, other) {
            (Shape::Empty, _) | (_, Shape::Empty) => false,
            (Shape::Point(a), Shape::Point(b)) => a == b,
            (Shape::Point(pt), Shape::Area(mp)) | (Shape::Area(mp), Shape::Point(pt)) => {
                mp.0.iter().any(|poly| pt.intersects(poly))
            }
            (Shape::Area(a), Shape::Area(b)) => a
                .0
                .iter()
                .any(|pa| b.0.iter().any(|pb| pa.intersects(pb))),
        }
    }

    /// Vrai si la forme touche le polygone donné
    pub fn intersects_polygon(&self, polygon: &Polygon<f64>) -> bool {
        match self {
            Shape::Empty => false,
            Shape::Point(pt) => pt.intersects(polygon),
            Shape::Area(mp) => mp.0.iter().any(|p| p.intersects(polygon)),
        }
    }

    /// Distance euclidienne (en degrés) du centroïde au point.
    ///
    /// Valable uniquement pour comparer des distances entre elles.
    pub fn distance_to(&self, point: &Point<f64>) -> f64 {
        self.centroid()
            .map(|c| c.euclidean_distance(point))
            .unwrap_or(f64::INFINITY)
    }
}
