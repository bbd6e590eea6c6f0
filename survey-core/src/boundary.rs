use crate::coordinates::Vector2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum BoundarySpec {
    Circle { center: Vector2, radius: f64 },
    Rectangle { vertices: [Vector2; 4] },
}

impl BoundarySpec {
    pub fn circle(center: Vector2, radius: f64) -> Self {
        Self::Circle { center, radius }
    }

    pub fn rectangle(vertices: [Vector2; 4]) -> Self {
        Self::Rectangle { vertices }
    }

    pub fn bounding_box(&self) -> (Vector2, Vector2) {
        match self {
            Self::Circle { center, radius } => (
                Vector2::new(center.x - radius, center.y - radius),
                Vector2::new(center.x + radius, center.y + radius),
            ),
            Self::Rectangle { vertices } => {
                let mut min = vertices[0];
                let mut max = vertices[0];
                for vertex in &vertices[1..] {
                    min.x = min.x.min(vertex.x);
                    min.y = min.y.min(vertex.y);
                    max.x = max.x.max(vertex.x);
                    max.y = max.y.max(vertex.y);
                }
                (min, max)
            }
        }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        match self {
            Self::Circle { center, radius } => {
                if !center.is_finite() {
                    return Err("circle center must be finite");
                }
                if !radius.is_finite() || *radius <= 0.0 {
                    return Err("circle radius must be a positive number");
                }
            }
            Self::Rectangle { vertices } => {
                if vertices.iter().any(|vertex| !vertex.is_finite()) {
                    return Err("rectangle vertices must be finite");
                }
                let (min, max) = self.bounding_box();
                if min.x == max.x || min.y == max.y {
                    return Err("rectangle vertices must span a non-empty area");
                }
            }
        }
        Ok(())
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Circle { center, radius } => format!(
                "circle with radius of {} meters and center at ({}, {})",
                radius, center.x, center.y
            ),
            Self::Rectangle { vertices } => {
                let corners: Vec<String> = vertices
                    .iter()
                    .map(|vertex| format!("({}, {})", vertex.x, vertex.y))
                    .collect();
                format!("rectangle with vertices at {}", corners.join(", "))
            }
        }
    }
}

impl Default for BoundarySpec {
    fn default() -> Self {
        Self::circle(Vector2::new(100.0, 0.0), 130.0)
    }
}
