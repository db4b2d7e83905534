use super::action::DialAction;
use super::machine::{DialEffect, DialInput, DialMachine, DialState, DialThresholds, TimerId};
use super::timer::LongPressTimer;
use crate::config::DialConfig;
use crate::geometry::Point;
use crate::overlay::{DragSession, PinchSession, Scene, StickerId};
use crate::touch::{TouchInput, TouchPhase};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// What the dial overlay shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionDialView {
    pub open: bool,
    pub anchor: Option<Point>,
    pub target: Option<StickerId>,
    /// Whether the lock button offers to unlock
    pub target_locked: bool,
}

impl ActionDialView {
    fn closed() -> Self {
        Self {
            open: false,
            anchor: None,
            target: None,
            target_locked: false,
        }
    }

    pub fn lock_label(&self) -> &'static str {
        if self.target_locked {
            "Unlock"
        } else {
            "Lock"
        }
    }
}

/// Scene changes caused by a gesture, for the application to announce
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    Selected(StickerId),
    Deselected,
    DialOpened { target: StickerId, at: Point },
    DialClosed,
    Removed(StickerId),
    LockChanged { target: StickerId, locked: bool },
    Reordered { target: StickerId, action: DialAction },
}

/// Routes touch input to sticker drags, pinches and the action dial.
///
/// Pinch and the long-press dial share the same touch stream: a second
/// finger cancels any pending long-press, and a pinch only starts when a
/// sticker is selected and the dial is closed.
pub struct GestureController {
    machine: DialMachine,
    timer: Option<LongPressTimer>,
    fired_tx: mpsc::UnboundedSender<TimerId>,
    fired_rx: mpsc::UnboundedReceiver<TimerId>,
    drag: Option<DragSession>,
    pinch: Option<PinchSession>,
    view: ActionDialView,
}

impl GestureController {
    pub fn new(config: &DialConfig) -> Self {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        Self {
            machine: DialMachine::new(DialThresholds::from(config)),
            timer: None,
            fired_tx,
            fired_rx,
            drag: None,
            pinch: None,
            view: ActionDialView::closed(),
        }
    }

    pub fn dial_state(&self) -> DialState {
        self.machine.state()
    }

    pub fn dial_view(&self) -> ActionDialView {
        self.view
    }

    pub fn is_dial_open(&self) -> bool {
        self.machine.is_open()
    }

    pub fn is_long_press_pending(&self) -> bool {
        matches!(self.machine.state(), DialState::Pressing { .. })
    }

    pub fn pinch_session(&self) -> Option<&PinchSession> {
        self.pinch.as_ref()
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Process one touch event against the scene
    pub fn handle_touch(
        &mut self,
        scene: &mut Scene,
        input: &TouchInput,
        sheet_open: bool,
    ) -> Vec<GestureOutcome> {
        let mut outcomes = Vec::new();
        let fingers = input.touches.len();

        match input.phase {
            TouchPhase::Start => {
                if fingers >= 2 {
                    self.drag = None;
                    self.begin_pinch(scene, input);
                    let origin = input.touches[0].position;
                    self.dispatch(
                        scene,
                        DialInput::TouchStart {
                            fingers,
                            origin,
                            target: None,
                            blocked: sheet_open,
                        },
                        &mut outcomes,
                    );
                } else if let Some(touch) = input.touches.first() {
                    let point = touch.position;
                    let found = scene.find_target(point);

                    if !self.machine.is_open() {
                        match found {
                            Some(id) => {
                                if scene.selected() != Some(id) && scene.select(id).is_ok() {
                                    outcomes.push(GestureOutcome::Selected(id));
                                }
                                self.drag = Some(DragSession::new(id, point));
                            }
                            None => {
                                if scene.selected().is_some() {
                                    scene.deselect();
                                    outcomes.push(GestureOutcome::Deselected);
                                }
                                self.drag = None;
                            }
                        }
                    }

                    let target = found.or_else(|| scene.selected());
                    self.dispatch(
                        scene,
                        DialInput::TouchStart {
                            fingers,
                            origin: point,
                            target,
                            blocked: sheet_open,
                        },
                        &mut outcomes,
                    );
                }
            }
            TouchPhase::Move => {
                if fingers >= 2 {
                    if let Some(pinch) = self.pinch {
                        let a = input.touches[0].position;
                        let b = input.touches[1].position;
                        let config = scene.config();
                        let transform = pinch.update(a, b, config.min_scale, config.max_scale);
                        if let Err(e) = scene.transform_by_gesture(pinch.target, transform) {
                            debug!("Pinch target vanished: {}", e);
                            self.pinch = None;
                        }
                    }
                } else if let (Some(drag), Some(touch)) = (self.drag.as_mut(), input.touches.first()) {
                    let target = drag.target;
                    let transform = drag.update(touch.position);
                    if let Err(e) = scene.transform_by_gesture(target, transform) {
                        debug!("Drag target vanished: {}", e);
                        self.drag = None;
                    }
                }

                if let Some(touch) = input.touches.first() {
                    self.dispatch(
                        scene,
                        DialInput::TouchMove {
                            fingers,
                            point: touch.position,
                        },
                        &mut outcomes,
                    );
                }
            }
            TouchPhase::End | TouchPhase::Cancel => {
                if fingers < 2 {
                    self.pinch = None;
                }
                if fingers == 0 {
                    self.drag = None;
                }
                let point = match input.phase {
                    TouchPhase::End => input.changed.first().map(|t| t.position),
                    _ => None,
                };
                self.dispatch(scene, DialInput::TouchEnd { point }, &mut outcomes);
            }
        }

        outcomes
    }

    fn begin_pinch(&mut self, scene: &Scene, input: &TouchInput) {
        if self.machine.is_open() {
            return;
        }
        let Some(sticker) = scene.selected().and_then(|id| scene.get(id)) else {
            return;
        };
        let a = input.touches[0].position;
        let b = input.touches[1].position;
        self.pinch = Some(PinchSession::begin(sticker, a, b));
        debug!("Pinch started on sticker {}", sticker.id());
    }

    /// Feed an expired long-press timer
    pub fn handle_timer(&mut self, scene: &mut Scene, timer: TimerId) -> Vec<GestureOutcome> {
        let mut outcomes = Vec::new();
        self.dispatch(scene, DialInput::TimerFired(timer), &mut outcomes);
        outcomes
    }

    /// Handle any timers that already fired
    pub fn poll_timers(&mut self, scene: &mut Scene) -> Vec<GestureOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(timer) = self.fired_rx.try_recv() {
            self.dispatch(scene, DialInput::TimerFired(timer), &mut outcomes);
        }
        outcomes
    }

    /// Wait for the next long-press expiry
    pub async fn next_timer(&mut self) -> Option<TimerId> {
        self.fired_rx.recv().await
    }

    /// A dial button was tapped
    pub fn tap_button(&mut self, scene: &mut Scene, action: DialAction) -> Vec<GestureOutcome> {
        let mut outcomes = Vec::new();
        self.dispatch(scene, DialInput::ButtonTap(action), &mut outcomes);
        outcomes
    }

    /// Close the dial (or abandon a pending long-press) without acting
    pub fn dismiss(&mut self, scene: &mut Scene) -> Vec<GestureOutcome> {
        let mut outcomes = Vec::new();
        self.dispatch(scene, DialInput::Dismiss, &mut outcomes);
        outcomes
    }

    fn dispatch(&mut self, scene: &mut Scene, input: DialInput, outcomes: &mut Vec<GestureOutcome>) {
        for effect in self.machine.handle(input) {
            self.apply(scene, effect, outcomes);
        }
    }

    fn apply(&mut self, scene: &mut Scene, effect: DialEffect, outcomes: &mut Vec<GestureOutcome>) {
        match effect {
            DialEffect::StartTimer { timer, after } => {
                // replacing the handle cancels the previous timer on drop
                self.timer = Some(LongPressTimer::spawn(timer, after, self.fired_tx.clone()));
            }
            DialEffect::CancelTimer(timer) => {
                if let Some(pending) = self.timer.take() {
                    if pending.id() != timer {
                        debug!("Cancelling timer {:?} while {:?} was expected", pending.id(), timer);
                    }
                    pending.cancel();
                }
            }
            DialEffect::Select(target) => {
                if scene.select(target).is_ok() {
                    outcomes.push(GestureOutcome::Selected(target));
                }
            }
            DialEffect::Freeze(target) => {
                self.timer = None;
                self.drag = None;
                if let Err(e) = scene.freeze(target) {
                    warn!("Cannot freeze sticker: {}", e);
                }
                scene.set_target_find(false);
                scene.set_multi_select(false);
            }
            DialEffect::OpenMenu { at, target } => {
                let target_locked = scene.get(target).map(|s| s.is_locked()).unwrap_or(false);
                self.view = ActionDialView {
                    open: true,
                    anchor: Some(at),
                    target: Some(target),
                    target_locked,
                };
                info!("Action dial opened for sticker {} at ({:.0}, {:.0})", target, at.x, at.y);
                outcomes.push(GestureOutcome::DialOpened { target, at });
            }
            DialEffect::Perform { action, target } => self.perform(scene, action, target, outcomes),
            DialEffect::Unfreeze(target) => {
                scene.unfreeze(target);
            }
            DialEffect::CloseMenu => {
                self.view = ActionDialView::closed();
                scene.set_target_find(true);
                scene.set_multi_select(true);
                debug!("Action dial closed");
                outcomes.push(GestureOutcome::DialClosed);
            }
        }
    }

    fn perform(
        &mut self,
        scene: &mut Scene,
        action: DialAction,
        target: StickerId,
        outcomes: &mut Vec<GestureOutcome>,
    ) {
        info!("Dial action {} on sticker {}", action, target);
        let result = match action {
            DialAction::Delete => scene
                .remove(target)
                .map(|_| GestureOutcome::Removed(target)),
            DialAction::ToggleLock => scene
                .toggle_lock(target)
                .map(|locked| GestureOutcome::LockChanged { target, locked }),
            DialAction::BringToFront => scene
                .bring_to_front(target)
                .map(|_| GestureOutcome::Reordered { target, action }),
            DialAction::SendToBack => scene
                .send_to_back(target)
                .map(|_| GestureOutcome::Reordered { target, action }),
        };

        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => warn!("Dial action {} failed: {}", action, e),
        }
    }
}
