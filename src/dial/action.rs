use std::fmt;
use std::str::FromStr;

/// What the action dial can do to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialAction {
    Delete,
    ToggleLock,
    BringToFront,
    SendToBack,
}

impl DialAction {
    /// Name used by dial buttons
    pub fn as_str(&self) -> &'static str {
        match self {
            DialAction::Delete => "delete",
            DialAction::ToggleLock => "lock-toggle",
            DialAction::BringToFront => "front",
            DialAction::SendToBack => "back",
        }
    }
}

impl fmt::Display for DialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delete" => Ok(DialAction::Delete),
            "lock-toggle" => Ok(DialAction::ToggleLock),
            "front" => Ok(DialAction::BringToFront),
            "back" => Ok(DialAction::SendToBack),
            other => Err(format!("unknown dial action '{}'", other)),
        }
    }
}

/// Pick an action from a flick offset measured from the press origin.
///
/// Below `threshold` nothing is chosen. Otherwise the dominant axis decides:
/// right deletes, left toggles the lock, up brings to front, down sends back.
pub fn classify_flick(dx: f64, dy: f64, threshold: f64) -> Option<DialAction> {
    if dx.hypot(dy) < threshold {
        return None;
    }
    let action = if dx.abs() > dy.abs() {
        if dx > 0.0 {
            DialAction::Delete
        } else {
            DialAction::ToggleLock
        }
    } else if dy < 0.0 {
        DialAction::BringToFront
    } else {
        DialAction::SendToBack
    };
    Some(action)
}
