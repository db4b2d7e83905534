use super::action::{classify_flick, DialAction};
use crate::config::DialConfig;
use crate::geometry::Point;
use crate::overlay::StickerId;
use std::time::Duration;

/// Identifies one long-press timer so stale expirations can be ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DialState {
    Idle,
    /// Finger down on a sticker, waiting for the long-press timer
    Pressing {
        target: StickerId,
        origin: Point,
        timer: TimerId,
    },
    /// Menu shown for a frozen target
    DialOpen { target: StickerId, origin: Point },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DialInput {
    TouchStart {
        fingers: usize,
        origin: Point,
        /// Sticker under the finger, or the current selection
        target: Option<StickerId>,
        /// Long-press suppressed (sticker sheet open)
        blocked: bool,
    },
    TouchMove { fingers: usize, point: Point },
    /// Last lifted finger position, if known
    TouchEnd { point: Option<Point> },
    TimerFired(TimerId),
    ButtonTap(DialAction),
    /// Close without acting
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DialEffect {
    StartTimer { timer: TimerId, after: Duration },
    CancelTimer(TimerId),
    Select(StickerId),
    Freeze(StickerId),
    OpenMenu { at: Point, target: StickerId },
    Perform { action: DialAction, target: StickerId },
    Unfreeze(StickerId),
    CloseMenu,
}

/// Dial timing and distance thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialThresholds {
    pub long_press: Duration,
    pub jitter: f64,
    pub flick: f64,
}

impl From<&DialConfig> for DialThresholds {
    fn from(config: &DialConfig) -> Self {
        Self {
            long_press: Duration::from_millis(config.long_press_ms),
            jitter: config.jitter_threshold,
            flick: config.flick_threshold,
        }
    }
}

fn close(target: StickerId, action: Option<DialAction>) -> (DialState, Vec<DialEffect>) {
    let mut effects = Vec::with_capacity(3);
    if let Some(action) = action {
        effects.push(DialEffect::Perform { action, target });
    }
    effects.push(DialEffect::Unfreeze(target));
    effects.push(DialEffect::CloseMenu);
    (DialState::Idle, effects)
}

fn press(
    fingers: usize,
    origin: Point,
    target: Option<StickerId>,
    blocked: bool,
    thresholds: &DialThresholds,
    next_timer: TimerId,
) -> (DialState, Vec<DialEffect>) {
    match target {
        Some(target) if fingers == 1 && !blocked => (
            DialState::Pressing {
                target,
                origin,
                timer: next_timer,
            },
            vec![DialEffect::StartTimer {
                timer: next_timer,
                after: thresholds.long_press,
            }],
        ),
        _ => (DialState::Idle, Vec::new()),
    }
}

/// Advance the dial for one input.
///
/// `next_timer` is the id a newly started long-press timer should use.
pub fn transition(
    state: DialState,
    input: DialInput,
    thresholds: &DialThresholds,
    next_timer: TimerId,
) -> (DialState, Vec<DialEffect>) {
    match (state, input) {
        (
            DialState::Idle,
            DialInput::TouchStart {
                fingers,
                origin,
                target,
                blocked,
            },
        ) => press(fingers, origin, target, blocked, thresholds, next_timer),

        (
            DialState::Pressing { timer, .. },
            DialInput::TouchStart {
                fingers,
                origin,
                target,
                blocked,
            },
        ) => {
            let (next, mut effects) = press(fingers, origin, target, blocked, thresholds, next_timer);
            effects.insert(0, DialEffect::CancelTimer(timer));
            (next, effects)
        }

        (DialState::Pressing { origin, timer, .. }, DialInput::TouchMove { fingers, point }) => {
            if fingers != 1 || origin.distance_to(point) > thresholds.jitter {
                (DialState::Idle, vec![DialEffect::CancelTimer(timer)])
            } else {
                (state, Vec::new())
            }
        }

        (DialState::Pressing { timer, .. }, DialInput::TouchEnd { .. })
        | (DialState::Pressing { timer, .. }, DialInput::Dismiss) => {
            (DialState::Idle, vec![DialEffect::CancelTimer(timer)])
        }

        (
            DialState::Pressing {
                target,
                origin,
                timer,
            },
            DialInput::TimerFired(fired),
        ) if fired == timer => (
            DialState::DialOpen { target, origin },
            vec![
                DialEffect::Select(target),
                DialEffect::Freeze(target),
                DialEffect::OpenMenu { at: origin, target },
            ],
        ),

        (DialState::DialOpen { target, origin }, DialInput::TouchEnd { point }) => {
            let action = point.and_then(|p| {
                let (dx, dy) = origin.delta_to(p);
                classify_flick(dx, dy, thresholds.flick)
            });
            close(target, action)
        }

        (DialState::DialOpen { target, .. }, DialInput::ButtonTap(action)) => {
            close(target, Some(action))
        }

        (DialState::DialOpen { target, .. }, DialInput::Dismiss) => close(target, None),

        (state, _) => (state, Vec::new()),
    }
}

/// Holds the dial state and hands out timer ids
#[derive(Debug)]
pub struct DialMachine {
    state: DialState,
    thresholds: DialThresholds,
    next_timer: u64,
}

impl DialMachine {
    pub fn new(thresholds: DialThresholds) -> Self {
        Self {
            state: DialState::Idle,
            thresholds,
            next_timer: 1,
        }
    }

    pub fn state(&self) -> DialState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, DialState::DialOpen { .. })
    }

    pub fn thresholds(&self) -> &DialThresholds {
        &self.thresholds
    }

    pub fn handle(&mut self, input: DialInput) -> Vec<DialEffect> {
        let (next, effects) = transition(self.state, input, &self.thresholds, TimerId(self.next_timer));
        if effects
            .iter()
            .any(|e| matches!(e, DialEffect::StartTimer { .. }))
        {
            self.next_timer += 1;
        }
        self.state = next;
        effects
    }
}
