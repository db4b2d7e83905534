use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One finger on the surface, in overlay coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: i32,
    pub position: Point,
}

impl TouchPoint {
    pub fn new(id: i32, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

/// A browser-style touch event.
///
/// `touches` lists the fingers still down after the event; `changed` lists
/// the fingers this event is about (for `End`, the lifted ones).
#[derive(Debug, Clone, PartialEq)]
pub struct TouchInput {
    pub phase: TouchPhase,
    pub touches: Vec<TouchPoint>,
    pub changed: Vec<TouchPoint>,
}

impl TouchInput {
    /// A single finger going down
    pub fn start(x: f64, y: f64) -> Self {
        let point = TouchPoint::new(0, x, y);
        Self {
            phase: TouchPhase::Start,
            touches: vec![point],
            changed: vec![point],
        }
    }

    /// A single finger moving
    pub fn moved(x: f64, y: f64) -> Self {
        let point = TouchPoint::new(0, x, y);
        Self {
            phase: TouchPhase::Move,
            touches: vec![point],
            changed: vec![point],
        }
    }

    /// The last finger lifting at (x, y)
    pub fn end(x: f64, y: f64) -> Self {
        Self {
            phase: TouchPhase::End,
            touches: Vec::new(),
            changed: vec![TouchPoint::new(0, x, y)],
        }
    }

    /// Two fingers down (or moving) at once
    pub fn pair(phase: TouchPhase, a: (f64, f64), b: (f64, f64)) -> Self {
        let touches = vec![TouchPoint::new(0, a.0, a.1), TouchPoint::new(1, b.0, b.1)];
        Self {
            phase,
            changed: touches.clone(),
            touches,
        }
    }
}
