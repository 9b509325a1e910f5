//! Logical box positions and anchor lookup.
//!
//! The layout stands in for DOM measurement: every box (initial value,
//! function nodes, final output) is a rectangle in one shared coordinate
//! space, and anchors sit at the vertical centre of its left (input) and
//! right (output) edges. A box missing from the layout has no anchors, and
//! any connector touching it is skipped for the frame.

use flowchain_core::{NodeId, Port};
use flowchain_route::Point;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const FUNCTION_BOX_WIDTH: f64 = 250.0;
pub const FUNCTION_BOX_HEIGHT: f64 = 220.0;
pub const TERMINAL_BOX_WIDTH: f64 = 120.0;
pub const TERMINAL_BOX_HEIGHT: f64 = 60.0;
pub const BOX_GAP: f64 = 160.0;

/// One of the boxes on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxRef {
    /// The initial value box. Output anchor only.
    Initial,
    Node(NodeId),
    /// The final output box. Input anchor only.
    Final,
}

/// An anchor dot on a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorRef {
    pub owner: BoxRef,
    pub port: Port,
}

impl AnchorRef {
    pub const fn new(owner: BoxRef, port: Port) -> Self {
        AnchorRef { owner, port }
    }

    pub const fn input(owner: BoxRef) -> Self {
        AnchorRef::new(owner, Port::Input)
    }

    pub const fn output(owner: BoxRef) -> Self {
        AnchorRef::new(owner, Port::Output)
    }

    /// The initial box has no input and the final box no output.
    pub fn exists(&self) -> bool {
        !matches!(
            (self.owner, self.port),
            (BoxRef::Initial, Port::Input) | (BoxRef::Final, Port::Output)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.owner, BoxRef::Initial | BoxRef::Final)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn input_anchor(&self) -> Point {
        Point::new(self.x, self.y + self.height / 2.0)
    }

    pub fn output_anchor(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub initial: Option<Rect>,
    pub nodes: IndexMap<NodeId, Rect>,
    pub final_output: Option<Rect>,
}

impl Layout {
    /// A single left-to-right row: initial value, the nodes in the given
    /// order, final output. Terminal boxes are centred on the row.
    pub fn row<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        let terminal_y = (FUNCTION_BOX_HEIGHT - TERMINAL_BOX_HEIGHT) / 2.0;
        let initial = Rect::new(0.0, terminal_y, TERMINAL_BOX_WIDTH, TERMINAL_BOX_HEIGHT);

        let mut x = TERMINAL_BOX_WIDTH + BOX_GAP;
        let mut placed = IndexMap::new();
        for id in nodes {
            placed.insert(id, Rect::new(x, 0.0, FUNCTION_BOX_WIDTH, FUNCTION_BOX_HEIGHT));
            x += FUNCTION_BOX_WIDTH + BOX_GAP;
        }

        Layout {
            initial: Some(initial),
            nodes: placed,
            final_output: Some(Rect::new(x, terminal_y, TERMINAL_BOX_WIDTH, TERMINAL_BOX_HEIGHT)),
        }
    }

    pub fn rect(&self, owner: BoxRef) -> Option<&Rect> {
        match owner {
            BoxRef::Initial => self.initial.as_ref(),
            BoxRef::Node(id) => self.nodes.get(&id),
            BoxRef::Final => self.final_output.as_ref(),
        }
    }

    /// Current position of an anchor, or `None` if its box is not placed or
    /// the anchor does not exist.
    pub fn locate_anchor(&self, anchor: AnchorRef) -> Option<Point> {
        if !anchor.exists() {
            return None;
        }
        let rect = self.rect(anchor.owner)?;
        Some(match anchor.port {
            Port::Input => rect.input_anchor(),
            Port::Output => rect.output_anchor(),
        })
    }

    /// Moves a box so its top-left corner sits at `to`. Returns `false` if the
    /// box is not placed.
    pub fn move_box(&mut self, owner: BoxRef, to: Point) -> bool {
        let rect = match owner {
            BoxRef::Initial => self.initial.as_mut(),
            BoxRef::Node(id) => self.nodes.get_mut(&id),
            BoxRef::Final => self.final_output.as_mut(),
        };
        match rect {
            Some(rect) => {
                rect.x = to.x;
                rect.y = to.y;
                true
            }
            None => false,
        }
    }

    /// Removes a box. Its connectors disappear from later frames.
    #[cfg(test)]
    pub(crate) fn remove(&mut self, owner: BoxRef) -> Option<Rect> {
        match owner {
            BoxRef::Initial => self.initial.take(),
            BoxRef::Node(id) => self.nodes.shift_remove(&id),
            BoxRef::Final => self.final_output.take(),
        }
    }
}
