//! Pure routing types.

use flowchain_route::{PathDescription, Point, RouteKind};
use serde::{Deserialize, Serialize};

/// `POST /route`
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRequest {
    pub start: Point,
    pub end: Point,
    #[serde(default)]
    pub is_terminal: bool,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub curvature: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    pub kind: RouteKind,
    pub path: PathDescription,
    pub svg: String,
}
