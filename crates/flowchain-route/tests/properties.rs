//! The router is a pure function of its inputs.

use proptest::prelude::*;

use flowchain_route::{route, PathDescription, Point};

fn point() -> impl Strategy<Value = Point> {
    (-2000.0f64..2000.0, -2000.0f64..2000.0).prop_map(|(x, y)| Point::new(x, y))
}

proptest! {
    #[test]
    fn endpoints_are_preserved(start in point(), end in point(), terminal in any::<bool>()) {
        let path = route(start, end, terminal);
        prop_assert_eq!(path.start(), start);
        prop_assert_eq!(path.end(), end);
    }

    #[test]
    fn identical_inputs_give_identical_paths(start in point(), end in point(), terminal in any::<bool>()) {
        prop_assert_eq!(route(start, end, terminal).to_string(), route(start, end, terminal).to_string());
    }

    #[test]
    fn terminal_links_are_lines(start in point(), end in point()) {
        let is_line = matches!(route(start, end, true), PathDescription::Line { .. });
        prop_assert!(is_line);
    }

    #[test]
    fn cubic_controls_keep_endpoint_heights(start in point(), end in point()) {
        if let PathDescription::Cubic { control1, control2, .. } = route(start, end, false) {
            prop_assert_eq!(control1.y, start.y);
            prop_assert_eq!(control2.y, end.y);
        }
    }
}
