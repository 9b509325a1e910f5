//! Drawable connector descriptions and their SVG path data.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// One connector curve.
///
/// `Display` renders SVG path data:
///
/// | Variant | Path data |
/// |---|---|
/// | `Line` | `M sx sy L ex ey` |
/// | `Quadratic` | `M sx sy Q cx cy, ex ey` |
/// | `Cubic` | `M sx sy C c1x c1y, c2x c2y, ex ey` |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathDescription {
    Line {
        start: Point,
        end: Point,
    },
    Quadratic {
        start: Point,
        control: Point,
        end: Point,
    },
    Cubic {
        start: Point,
        control1: Point,
        control2: Point,
        end: Point,
    },
}

impl PathDescription {
    pub fn start(&self) -> Point {
        match *self {
            PathDescription::Line { start, .. }
            | PathDescription::Quadratic { start, .. }
            | PathDescription::Cubic { start, .. } => start,
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            PathDescription::Line { end, .. }
            | PathDescription::Quadratic { end, .. }
            | PathDescription::Cubic { end, .. } => end,
        }
    }

    /// SVG path data, same as `to_string()`.
    pub fn svg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PathDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathDescription::Line { start, end } => write!(f, "M {} L {}", start, end),
            PathDescription::Quadratic {
                start,
                control,
                end,
            } => write!(f, "M {} Q {}, {}", start, control, end),
            PathDescription::Cubic {
                start,
                control1,
                control2,
                end,
            } => write!(f, "M {} C {}, {}, {}", start, control1, control2, end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_shape() {
        let line = PathDescription::Line {
            start: Point::new(1.0, 2.0),
            end: Point::new(3.0, 4.0),
        };
        insta::assert_snapshot!(line, @"M 1 2 L 3 4");

        let quad = PathDescription::Quadratic {
            start: Point::new(0.0, 0.0),
            control: Point::new(12.5, 7.25),
            end: Point::new(25.0, 0.0),
        };
        insta::assert_snapshot!(quad, @"M 0 0 Q 12.5 7.25, 25 0");

        let cubic = PathDescription::Cubic {
            start: Point::new(0.0, 0.0),
            control1: Point::new(100.0, 0.0),
            control2: Point::new(100.0, 100.0),
            end: Point::new(200.0, 100.0),
        };
        insta::assert_snapshot!(cubic, @"M 0 0 C 100 0, 100 100, 200 100");
    }

    #[test]
    fn endpoints() {
        let cubic = PathDescription::Cubic {
            start: Point::new(1.0, 1.0),
            control1: Point::new(2.0, 1.0),
            control2: Point::new(3.0, 4.0),
            end: Point::new(4.0, 4.0),
        };
        assert_eq!(cubic.start(), Point::new(1.0, 1.0));
        assert_eq!(cubic.end(), Point::new(4.0, 4.0));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let line = PathDescription::Line {
            start: Point::new(0.0, 0.0),
            end: Point::new(1.0, 0.0),
        };
        let json = serde_json::to_value(line).unwrap();
        assert_eq!(json["kind"], "line");
        assert_eq!(json["end"]["x"], 1.0);
    }
}
