use super::types::{TouchInput, TouchPhase, TouchPoint};
use std::collections::BTreeMap;
use tracing::trace;

/// A decoded multitouch (protocol B) event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEvent {
    Slot(i32),
    /// Negative ids release the current slot
    TrackingId(i32),
    PositionX(i32),
    PositionY(i32),
    Sync,
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    tracking_id: Option<i32>,
    x: i32,
    y: i32,
}

#[derive(Debug, Default)]
struct Pending {
    started: Vec<i32>,
    moved: Vec<i32>,
    ended: Vec<TouchPoint>,
}

/// Folds slot updates into browser-style touch events, scaling raw device
/// coordinates into overlay coordinates.
#[derive(Debug)]
pub struct MultitouchTracker {
    raw_range: (i32, i32),
    surface: (f64, f64),
    current: i32,
    slots: BTreeMap<i32, Slot>,
    pending: Pending,
}

impl MultitouchTracker {
    pub fn new(raw_range: (i32, i32), surface: (f64, f64)) -> Self {
        Self {
            raw_range: (raw_range.0.max(1), raw_range.1.max(1)),
            surface,
            current: 0,
            slots: BTreeMap::new(),
            pending: Pending::default(),
        }
    }

    pub fn set_surface(&mut self, surface: (f64, f64)) {
        self.surface = surface;
    }

    pub fn active_count(&self) -> usize {
        self.slots.values().filter(|s| s.tracking_id.is_some()).count()
    }

    fn to_point(&self, slot: &Slot) -> TouchPoint {
        let x = slot.x as f64 * self.surface.0 / self.raw_range.0 as f64;
        let y = slot.y as f64 * self.surface.1 / self.raw_range.1 as f64;
        TouchPoint::new(slot.tracking_id.unwrap_or(-1), x, y)
    }

    fn active(&self) -> Vec<TouchPoint> {
        self.slots
            .values()
            .filter(|s| s.tracking_id.is_some())
            .map(|s| self.to_point(s))
            .collect()
    }

    fn points_for(&self, slots: &[i32]) -> Vec<TouchPoint> {
        slots
            .iter()
            .filter_map(|index| self.slots.get(index))
            .filter(|s| s.tracking_id.is_some())
            .map(|s| self.to_point(s))
            .collect()
    }

    fn mark(list: &mut Vec<i32>, slot: i32) {
        if !list.contains(&slot) {
            list.push(slot);
        }
    }

    /// Feed one event. A `Sync` yields the touch events of the finished frame
    /// in end, start, move order.
    pub fn process(&mut self, event: ContactEvent) -> Vec<TouchInput> {
        match event {
            ContactEvent::Slot(slot) => {
                self.current = slot;
            }
            ContactEvent::TrackingId(id) => {
                let current = self.current;
                if id < 0 {
                    if let Some(slot) = self.slots.get(&current).copied() {
                        if slot.tracking_id.is_some() {
                            let point = self.to_point(&slot);
                            self.pending.ended.push(point);
                        }
                    }
                    self.slots.remove(&current);
                    self.pending.started.retain(|s| *s != current);
                    self.pending.moved.retain(|s| *s != current);
                } else {
                    let slot = self.slots.entry(current).or_default();
                    slot.tracking_id = Some(id);
                    Self::mark(&mut self.pending.started, current);
                }
            }
            ContactEvent::PositionX(x) => {
                self.slots.entry(self.current).or_default().x = x;
                Self::mark(&mut self.pending.moved, self.current);
            }
            ContactEvent::PositionY(y) => {
                self.slots.entry(self.current).or_default().y = y;
                Self::mark(&mut self.pending.moved, self.current);
            }
            ContactEvent::Sync => return self.flush(),
        }
        Vec::new()
    }

    fn flush(&mut self) -> Vec<TouchInput> {
        let pending = std::mem::take(&mut self.pending);
        let mut inputs = Vec::new();

        if !pending.ended.is_empty() {
            inputs.push(TouchInput {
                phase: TouchPhase::End,
                touches: self.active(),
                changed: pending.ended,
            });
        }

        let started = self.points_for(&pending.started);
        if !started.is_empty() {
            inputs.push(TouchInput {
                phase: TouchPhase::Start,
                touches: self.active(),
                changed: started,
            });
        }

        let moved: Vec<i32> = pending
            .moved
            .into_iter()
            .filter(|s| !pending.started.contains(s))
            .collect();
        let moved = self.points_for(&moved);
        if !moved.is_empty() {
            inputs.push(TouchInput {
                phase: TouchPhase::Move,
                touches: self.active(),
                changed: moved,
            });
        }

        for input in &inputs {
            trace!("Touch {:?} with {} active", input.phase, input.touches.len());
        }
        inputs
    }

    /// Release every finger, e.g. when the device goes away
    pub fn cancel_all(&mut self) -> Option<TouchInput> {
        let active = self.active();
        self.slots.clear();
        self.pending = Pending::default();
        if active.is_empty() {
            None
        } else {
            Some(TouchInput {
                phase: TouchPhase::Cancel,
                touches: Vec::new(),
                changed: active,
            })
        }
    }
}
