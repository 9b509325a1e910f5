//! Connector geometry for flowchain diagrams.
//!
//! [`Router::route`] turns two anchor points into a [`PathDescription`]:
//! a straight line for terminal links, a single quadratic bulge when the
//! endpoints are aligned, and an S-shaped cubic otherwise. The result renders
//! to SVG path data through `Display`.
//!
//! Everything here is pure. Coordinates are not validated; NaN in gives NaN
//! out.

pub mod error;
pub mod path;
pub mod point;
pub mod router;

pub use error::RouteError;
pub use path::PathDescription;
pub use point::Point;
pub use router::{classify, route, RouteKind, Router, RouterConfig};
