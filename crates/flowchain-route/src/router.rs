//! Endpoint classification and curve construction.

use serde::{Deserialize, Serialize};

use crate::error::RouteError;
use crate::path::PathDescription;
use crate::point::Point;

/// Default alignment threshold in diagram units.
pub const DEFAULT_ALIGNMENT_THRESHOLD: f64 = 20.0;

/// Default fraction of the horizontal delta used for cubic control offsets.
pub const DEFAULT_CURVATURE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Offsets strictly below this count as aligned.
    pub alignment_threshold: f64,
    pub curvature: f64,
}

impl RouterConfig {
    pub fn new(alignment_threshold: f64, curvature: f64) -> Result<Self, RouteError> {
        if !alignment_threshold.is_finite() || alignment_threshold < 0.0 {
            return Err(RouteError::InvalidThreshold(alignment_threshold));
        }
        if !curvature.is_finite() {
            return Err(RouteError::InvalidCurvature(curvature));
        }
        Ok(RouterConfig {
            alignment_threshold,
            curvature,
        })
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            alignment_threshold: DEFAULT_ALIGNMENT_THRESHOLD,
            curvature: DEFAULT_CURVATURE,
        }
    }
}

/// Which curve a pair of endpoints gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Terminal link.
    Straight,
    /// `|dy|` below the threshold. Wins over `Vertical` when both hold.
    Horizontal,
    /// `|dx|` below the threshold.
    Vertical,
    Diagonal,
}

/// Classifies a non-terminal or terminal pair of endpoints.
pub fn classify(start: Point, end: Point, is_terminal: bool, threshold: f64) -> RouteKind {
    if is_terminal {
        return RouteKind::Straight;
    }
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    if dy.abs() < threshold {
        RouteKind::Horizontal
    } else if dx.abs() < threshold {
        RouteKind::Vertical
    } else {
        RouteKind::Diagonal
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Router {
    config: RouterConfig,
}

impl Router {
    pub fn new(config: RouterConfig) -> Self {
        Router { config }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn route(&self, start: Point, end: Point, is_terminal: bool) -> PathDescription {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        match classify(start, end, is_terminal, self.config.alignment_threshold) {
            RouteKind::Straight => PathDescription::Line { start, end },
            // Side by side: bulge downward by half the horizontal distance.
            RouteKind::Horizontal => PathDescription::Quadratic {
                start,
                control: Point::new((start.x + end.x) / 2.0, start.y + dx.abs() / 2.0),
                end,
            },
            // Stacked: bulge rightward by half the vertical distance.
            RouteKind::Vertical => PathDescription::Quadratic {
                start,
                control: Point::new(start.x + dy.abs() / 2.0, (start.y + end.y) / 2.0),
                end,
            },
            RouteKind::Diagonal => {
                let offset = dx * self.config.curvature;
                PathDescription::Cubic {
                    start,
                    control1: start.offset(offset, 0.0),
                    control2: end.offset(-offset, 0.0),
                    end,
                }
            }
        }
    }
}

/// Routes with the default configuration.
pub fn route(start: Point, end: Point, is_terminal: bool) -> PathDescription {
    Router::default().route(start, end, is_terminal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svg(sx: f64, sy: f64, ex: f64, ey: f64, terminal: bool) -> String {
        route(Point::new(sx, sy), Point::new(ex, ey), terminal).to_string()
    }

    #[test]
    fn horizontal_bulges_down() {
        insta::assert_snapshot!(svg(0.0, 0.0, 100.0, 0.0, false), @"M 0 0 Q 50 50, 100 0");
        insta::assert_snapshot!(svg(100.0, 0.0, 0.0, 5.0, false), @"M 100 0 Q 50 50, 0 5");
    }

    #[test]
    fn vertical_bulges_right() {
        insta::assert_snapshot!(svg(0.0, 0.0, 10.0, 100.0, false), @"M 0 0 Q 50 50, 10 100");
        insta::assert_snapshot!(svg(0.0, 100.0, 0.0, 0.0, false), @"M 0 100 Q 50 50, 0 0");
    }

    #[test]
    fn diagonal_is_s_shaped() {
        insta::assert_snapshot!(
            svg(0.0, 0.0, 200.0, 100.0, false),
            @"M 0 0 C 100 0, 100 100, 200 100"
        );
        insta::assert_snapshot!(
            svg(200.0, 0.0, 0.0, 100.0, false),
            @"M 200 0 C 100 0, 100 100, 0 100"
        );
    }

    #[test]
    fn terminal_is_always_straight() {
        insta::assert_snapshot!(svg(0.0, 0.0, 0.0, 0.0, true), @"M 0 0 L 0 0");
        insta::assert_snapshot!(svg(0.0, 0.0, 200.0, 100.0, true), @"M 0 0 L 200 100");
    }

    #[test]
    fn horizontal_wins_when_both_aligned() {
        assert_eq!(
            classify(Point::new(0.0, 0.0), Point::new(5.0, 5.0), false, 20.0),
            RouteKind::Horizontal
        );
        insta::assert_snapshot!(svg(0.0, 0.0, 5.0, 5.0, false), @"M 0 0 Q 2.5 2.5, 5 5");
    }

    #[test]
    fn threshold_is_exclusive() {
        let start = Point::new(0.0, 0.0);
        assert_eq!(classify(start, Point::new(100.0, 20.0), false, 20.0), RouteKind::Diagonal);
        assert_eq!(classify(start, Point::new(100.0, 19.9), false, 20.0), RouteKind::Horizontal);
        assert_eq!(classify(start, Point::new(20.0, 100.0), false, 20.0), RouteKind::Diagonal);
    }

    #[test]
    fn custom_config() {
        let router = Router::new(RouterConfig::new(0.0, 0.25).unwrap());
        let path = router.route(Point::new(0.0, 0.0), Point::new(100.0, 10.0), false);
        insta::assert_snapshot!(path, @"M 0 0 C 25 0, 75 10, 100 10");
    }

    #[test]
    fn rejects_bad_config() {
        assert_eq!(
            RouterConfig::new(-1.0, 0.5).unwrap_err(),
            RouteError::InvalidThreshold(-1.0)
        );
        assert!(RouterConfig::new(f64::NAN, 0.5).is_err());
        assert!(RouterConfig::new(20.0, f64::INFINITY).is_err());
    }
}
